//! In-process inventory backed by hash maps.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use shoecart_core::{Product, ProductId, Stock};

use super::{InventoryError, InventoryService};

/// Inventory held in memory.
///
/// Stock can be changed while a cart is using it, and the whole service can
/// be switched offline to exercise transport failures.
#[derive(Debug, Default)]
pub struct MemoryInventory {
    products: RwLock<HashMap<ProductId, Product>>,
    stock: RwLock<HashMap<ProductId, i64>>,
    offline: AtomicBool,
    product_requests: AtomicUsize,
}

impl MemoryInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a product and its stock level.
    pub fn insert(&self, product: Product, stock: i64) {
        let id = product.id;
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, product);
        self.set_stock(id, stock);
    }

    /// Change the stock level of a product.
    pub fn set_stock(&self, id: ProductId, amount: i64) {
        self.stock
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, amount);
    }

    /// Make every lookup fail as if the service were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of product lookups served so far.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.product_requests.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), InventoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(InventoryError::Api {
                status: 503,
                message: "inventory offline".to_string(),
            });
        }
        Ok(())
    }
}

impl InventoryService for MemoryInventory {
    async fn stock(&self, id: ProductId) -> Result<Stock, InventoryError> {
        self.check_online()?;
        let stock = self.stock.read().unwrap_or_else(PoisonError::into_inner);
        stock
            .get(&id)
            .map(|&amount| Stock { id, amount })
            .ok_or(InventoryError::NotFound(id))
    }

    async fn product(&self, id: ProductId) -> Result<Product, InventoryError> {
        self.check_online()?;
        self.product_requests.fetch_add(1, Ordering::SeqCst);
        let products = self.products.read().unwrap_or_else(PoisonError::into_inner);
        products
            .get(&id)
            .cloned()
            .ok_or(InventoryError::NotFound(id))
    }
}
