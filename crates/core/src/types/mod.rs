//! Core types for shoecart.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod product;

pub use cart::{Cart, CartInvariantError, LineItem};
pub use id::*;
pub use product::{Product, Stock};
