//! Business logic services for storefront.
//!
//! - `assistant` - Gemini-backed shopping assistant
//! - `auth` - Email and password accounts
//! - `cart` - Per-request cart store and its persistence backends
//! - `catalog` - Cached product catalog
//! - `checkout` - Order submission

pub mod assistant;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;

pub use assistant::{AssistantClient, AssistantError};
pub use auth::{AuthError, AuthService};
pub use cart::{CartPersistence, CartPersistenceError, CartStore, SessionCartStorage};
pub use catalog::CatalogService;
pub use checkout::{OrderWriter, SubmitOrderError, submit_order};
