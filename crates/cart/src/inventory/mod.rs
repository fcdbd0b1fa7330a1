//! Inventory service: read-only product and stock lookups.
//!
//! # Architecture
//!
//! - [`InventoryService`] is the seam the cart store depends on
//! - [`HttpInventoryClient`] talks to the REST inventory API with `reqwest`
//! - [`MemoryInventory`] keeps everything in process, for tests and demos
//!
//! # Example
//!
//! ```rust,ignore
//! use shoecart::inventory::{HttpInventoryClient, InventoryService};
//!
//! let client = HttpInventoryClient::new(&config.inventory)?;
//!
//! let stock = client.stock(ProductId::new(1)).await?;
//! let product = client.product(ProductId::new(1)).await?;
//! ```

mod http;
mod memory;

use std::future::Future;
use std::sync::Arc;

use shoecart_core::{Product, ProductId, Stock};
use thiserror::Error;

pub use http::HttpInventoryClient;
pub use memory::MemoryInventory;

/// Errors that can occur when talking to the inventory service.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The inventory has no record for the product.
    #[error("Not found: product {0}")]
    NotFound(ProductId),

    /// Rate limited by the inventory API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// API returned a non-success response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request URL could not be built from the configured base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Read-only lookup of product and stock data.
pub trait InventoryService: Send + Sync {
    /// Current stock level for a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, InventoryError>> + Send;

    /// Full product display data.
    fn product(&self, id: ProductId)
    -> impl Future<Output = Result<Product, InventoryError>> + Send;
}

impl<T: InventoryService> InventoryService for Arc<T> {
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, InventoryError>> + Send {
        (**self).stock(id)
    }

    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Product, InventoryError>> + Send {
        (**self).product(id)
    }
}
