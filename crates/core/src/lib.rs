//! Souq Core - Shared domain library.
//!
//! This crate provides the domain model used across all Souq components:
//! - `storefront` - Public-facing shop (catalog, cart, checkout, orders)
//! - `cli` - Command-line tools for migrations, seeding and order review
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. Cart transitions, catalog filtering and checkout
//! validation all live here so they can be tested without a server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, contact fields and statuses
//! - [`cart`] - Cart state and reducer
//! - [`catalog`] - Product records and listing queries
//! - [`order`] - Orders and checkout validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod types;

pub use cart::{CartAction, CartLineItem, CartState, NewLineItem, StockShortfall};
pub use types::*;
