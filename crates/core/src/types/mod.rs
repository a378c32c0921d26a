//! Core value types for Souq.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod price;
pub mod status;

pub use contact::{ContactFieldError, Email, EmailError, PhoneNumber, ShippingAddress};
pub use id::*;
pub use price::{Price, PriceError};
pub use status::*;
