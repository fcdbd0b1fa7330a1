//! shoecart - client-side shopping cart state.
//!
//! Holds the shopper's cart, checks every quantity change against the
//! inventory service and writes the cart to local storage after each
//! successful change.
//!
//! # Architecture
//!
//! - [`store::CartStore`] owns the cart and applies add/remove/update
//! - [`context::CartContext`] is the UI-facing surface; it reports failures
//!   through a [`notify::NotificationSink`] instead of returning them
//! - [`inventory`], [`storage`] and [`notify`] define the external
//!   collaborators as traits, each with a production and an in-memory
//!   implementation
//!
//! # Example
//!
//! ```rust,ignore
//! use shoecart::config::CartConfig;
//! use shoecart::context::CartContext;
//! use shoecart::inventory::HttpInventoryClient;
//! use shoecart::notify::TracingNotifier;
//! use shoecart::storage::FileStorage;
//! use shoecart::store::CartStore;
//!
//! let config = CartConfig::from_env()?;
//! let inventory = HttpInventoryClient::new(&config.inventory)?;
//! let storage = FileStorage::new(&config.storage_path);
//! let store = CartStore::load(inventory, storage, &config.storage_key);
//! let mut cart = CartContext::new(store, TracingNotifier);
//!
//! cart.add_product(ProductId::new(1)).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod context;
pub mod error;
pub mod inventory;
pub mod notify;
pub mod storage;
pub mod store;

pub use context::CartContext;
pub use error::{CartError, CartOperation};
pub use store::{CartStore, UpdateProductAmount};
