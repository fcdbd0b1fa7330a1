//! Cart store: the cart, its operations and their persistence.
//!
//! Every operation works on a copy of the committed cart. The copy is
//! written to storage and only then replaces the committed cart, so a failed
//! operation never leaves a partial change behind.

use serde::Deserialize;
use shoecart_core::{Cart, LineItem, ProductId};
use tracing::{debug, info, instrument, warn};

use crate::error::{CartError, Result};
use crate::inventory::{InventoryError, InventoryService};
use crate::storage::{CartStorage, StorageError};

/// Request to set the quantity of a product already in the cart.
///
/// Amounts of zero or below are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

/// Holds the cart and keeps it in sync with storage.
pub struct CartStore<I, S> {
    inventory: I,
    storage: S,
    storage_key: String,
    cart: Cart,
}

impl<I, S> CartStore<I, S>
where
    I: InventoryService,
    S: CartStorage,
{
    /// Create a store, reading the cart from `storage_key`.
    ///
    /// An absent, unreadable or unparsable slot yields an empty cart.
    pub fn load(inventory: I, storage: S, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let cart = read_cart(&storage, &storage_key);
        info!(items = cart.len(), key = %storage_key, "Cart loaded");

        Self {
            inventory,
            storage,
            storage_key,
            cart,
        }
    }

    /// The committed cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The inventory stock and products are looked up in.
    #[must_use]
    pub const fn inventory(&self) -> &I {
        &self.inventory
    }

    /// The storage the cart is saved to.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart has its quantity raised by one; a new
    /// product is fetched from the inventory and appended with quantity 1.
    ///
    /// # Errors
    ///
    /// - `StockExceeded` if the new quantity is above the stock level
    /// - `Inventory` if a stock or product lookup fails
    /// - `Storage` if the cart cannot be saved
    #[instrument(skip(self))]
    pub async fn add(&mut self, product_id: ProductId) -> Result<()> {
        let current = self.cart.amount_of(product_id);
        let desired = i64::from(current) + 1;

        let stock = self.inventory.stock(product_id).await?;
        if !stock.covers(desired) {
            return Err(CartError::StockExceeded {
                product_id,
                requested: desired,
                available: stock.amount,
            });
        }

        let mut candidate = self.cart.clone();
        if current > 0 {
            let amount = u32::try_from(desired).map_err(|_| CartError::StockExceeded {
                product_id,
                requested: desired,
                available: stock.amount,
            })?;
            candidate.set_amount(product_id, amount)?;
        } else {
            let product = self.inventory.product(product_id).await?;
            if product.id != product_id {
                return Err(InventoryError::Parse(format!(
                    "requested product {product_id}, inventory returned {}",
                    product.id
                ))
                .into());
            }
            candidate.push(LineItem::new(product))?;
        }

        self.commit(candidate)
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// - `ProductNotFound` if the product is not in the cart
    /// - `Storage` if the cart cannot be saved
    #[instrument(skip(self))]
    pub fn remove(&mut self, product_id: ProductId) -> Result<()> {
        let mut candidate = self.cart.clone();
        candidate
            .remove(product_id)
            .ok_or(CartError::ProductNotFound(product_id))?;

        self.commit(candidate)
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// Amounts of zero or below are ignored and return `Ok` without touching
    /// the inventory or the cart.
    ///
    /// # Errors
    ///
    /// - `StockExceeded` if `amount` is above the stock level
    /// - `Inventory` if the stock lookup fails
    /// - `ProductNotFound` if the product is not in the cart
    /// - `Storage` if the cart cannot be saved
    #[instrument(skip(self))]
    pub async fn update_amount(&mut self, update: UpdateProductAmount) -> Result<()> {
        let UpdateProductAmount { product_id, amount } = update;
        if amount <= 0 {
            debug!("Ignoring non-positive amount");
            return Ok(());
        }

        let stock = self.inventory.stock(product_id).await?;
        let exceeded = CartError::StockExceeded {
            product_id,
            requested: amount,
            available: stock.amount,
        };
        if !stock.covers(amount) {
            return Err(exceeded);
        }
        let amount = u32::try_from(amount).map_err(|_| exceeded)?;

        let mut candidate = self.cart.clone();
        candidate.set_amount(product_id, amount)?;

        self.commit(candidate)
    }

    /// Persist `candidate`, then make it the committed cart.
    fn commit(&mut self, candidate: Cart) -> Result<()> {
        let serialized = serde_json::to_string(&candidate).map_err(StorageError::from)?;
        self.storage.set_item(&self.storage_key, &serialized)?;

        self.cart = candidate;
        debug!(
            items = self.cart.len(),
            quantity = self.cart.total_quantity(),
            "Cart saved"
        );
        Ok(())
    }
}

/// Read the stored cart, falling back to an empty one.
fn read_cart(storage: &impl CartStorage, key: &str) -> Cart {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read stored cart, starting empty");
            return Cart::new();
        }
    };

    let items: Vec<LineItem> = match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Discarding unparsable stored cart");
            return Cart::new();
        }
    };

    let (cart, dropped) = Cart::from_items_lossy(items);
    for violation in dropped {
        warn!(error = %violation, "Dropped invalid line from stored cart");
    }
    cart
}
