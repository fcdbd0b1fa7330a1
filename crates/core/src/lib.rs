//! shoecart core - shared types library.
//!
//! This crate provides the types shared by every shoecart component:
//! - `shoecart` - Cart store, inventory client, storage and notifications
//! - `shoecart-cli` - Command-line front end for a local cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe product IDs, products, stock levels, line items and carts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
