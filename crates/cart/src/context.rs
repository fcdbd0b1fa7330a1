//! Cart context: the surface the UI talks to.
//!
//! The context is created once by the composition root and handed to the
//! components that render or change the cart. Failures are reported through
//! the notification sink and never propagate past the call.

use shoecart_core::{Cart, ProductId};

use crate::error::{CartError, CartOperation, add_breadcrumb};
use crate::inventory::InventoryService;
use crate::notify::NotificationSink;
use crate::storage::CartStorage;
use crate::store::{CartStore, UpdateProductAmount};

/// Cart store paired with the channel that tells the shopper what went wrong.
pub struct CartContext<I, S, N> {
    store: CartStore<I, S>,
    notifier: N,
}

impl<I, S, N> CartContext<I, S, N>
where
    I: InventoryService,
    S: CartStorage,
    N: NotificationSink,
{
    #[must_use]
    pub const fn new(store: CartStore<I, S>, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Current cart, read-only.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.store.cart()
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &CartStore<I, S> {
        &self.store
    }

    /// Where failure messages are sent.
    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Add one unit of a product. Returns `false` if a failure was reported.
    pub async fn add_product(&mut self, product_id: ProductId) -> bool {
        breadcrumb("Add product", product_id);
        let result = self.store.add(product_id).await;
        self.settle(CartOperation::Add, result)
    }

    /// Remove a product. Returns `false` if a failure was reported.
    pub fn remove_product(&mut self, product_id: ProductId) -> bool {
        breadcrumb("Remove product", product_id);
        let result = self.store.remove(product_id);
        self.settle(CartOperation::Remove, result)
    }

    /// Set a product's quantity. Returns `false` if a failure was reported.
    pub async fn update_product_amount(&mut self, update: UpdateProductAmount) -> bool {
        breadcrumb("Update product amount", update.product_id);
        let result = self.store.update_amount(update).await;
        self.settle(CartOperation::UpdateAmount, result)
    }

    fn settle(&self, operation: CartOperation, result: Result<(), CartError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                e.track(operation);
                self.notifier.report_error(e.notification(operation));
                false
            }
        }
    }
}

fn breadcrumb(message: &str, product_id: ProductId) {
    let id = product_id.to_string();
    add_breadcrumb("cart", message, Some(&[("product_id", id.as_str())]));
}
