//! Cart error handling with Sentry integration.
//!
//! Store operations return [`CartError`]. The cart context turns each error
//! into a user-facing message with [`CartError::notification`] and captures
//! infrastructure failures to Sentry before reporting them.

use shoecart_core::{CartInvariantError, ProductId};
use thiserror::Error;

use crate::inventory::InventoryError;
use crate::storage::StorageError;

/// Message shown when a requested quantity exceeds the available stock.
pub const STOCK_EXCEEDED_MESSAGE: &str = "Requested quantity is out of stock";

/// Cart operations, used to pick the failure message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

impl CartOperation {
    /// Generic failure message for the operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Add => "Failed to add product",
            Self::Remove => "Failed to remove product",
            Self::UpdateAmount => "Failed to update product quantity",
        }
    }
}

/// Errors returned by cart operations. The cart is unchanged whenever one is
/// returned.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity is larger than the stock on hand.
    #[error("Requested {requested} of product {product_id}, only {available} in stock")]
    StockExceeded {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// The product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    ProductNotFound(ProductId),

    /// Inventory lookup failed.
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Writing the cart to storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The change would break a cart invariant.
    #[error("Invalid cart change: {0}")]
    Invariant(CartInvariantError),
}

impl From<CartInvariantError> for CartError {
    fn from(err: CartInvariantError) -> Self {
        match err {
            CartInvariantError::MissingProduct(id) => Self::ProductNotFound(id),
            other => Self::Invariant(other),
        }
    }
}

impl CartError {
    /// User-facing message for this error when raised by `operation`.
    #[must_use]
    pub const fn notification(&self, operation: CartOperation) -> &'static str {
        match self {
            Self::StockExceeded { .. } => STOCK_EXCEEDED_MESSAGE,
            Self::ProductNotFound(_)
            | Self::Inventory(_)
            | Self::Storage(_)
            | Self::Invariant(_) => operation.failure_message(),
        }
    }

    /// Whether the error comes from infrastructure rather than the user's
    /// request, and so should be tracked.
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Inventory(_) | Self::Storage(_))
    }

    /// Capture infrastructure errors to Sentry and log them.
    ///
    /// Request errors (stock exceeded, product not in cart) are only logged
    /// at debug level.
    pub fn track(&self, operation: CartOperation) {
        if self.is_infrastructure() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                operation = ?operation,
                sentry_event_id = %event_id,
                "Cart operation failed"
            );
        } else {
            tracing::debug!(error = %self, operation = ?operation, "Cart operation rejected");
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

/// Add a breadcrumb for cart actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// actions leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::StockExceeded {
            product_id: ProductId::new(1),
            requested: 6,
            available: 5,
        };
        assert_eq!(err.to_string(), "Requested 6 of product 1, only 5 in stock");

        let err = CartError::ProductNotFound(ProductId::new(4));
        assert_eq!(err.to_string(), "Product 4 is not in the cart");
    }

    #[test]
    fn test_stock_exceeded_message_is_shared() {
        let err = CartError::StockExceeded {
            product_id: ProductId::new(1),
            requested: 2,
            available: 1,
        };
        assert_eq!(err.notification(CartOperation::Add), STOCK_EXCEEDED_MESSAGE);
        assert_eq!(
            err.notification(CartOperation::UpdateAmount),
            STOCK_EXCEEDED_MESSAGE
        );
    }

    #[test]
    fn test_failure_messages_follow_operation() {
        let not_found = CartError::ProductNotFound(ProductId::new(1));
        assert_eq!(not_found.notification(CartOperation::Remove), "Failed to remove product");
        assert_eq!(
            not_found.notification(CartOperation::UpdateAmount),
            "Failed to update product quantity"
        );

        let transport = CartError::Inventory(InventoryError::RateLimited(3));
        assert_eq!(transport.notification(CartOperation::Add), "Failed to add product");
    }

    #[test]
    fn test_missing_product_maps_to_not_found() {
        let err = CartError::from(CartInvariantError::MissingProduct(ProductId::new(2)));
        assert!(matches!(err, CartError::ProductNotFound(id) if id == ProductId::new(2)));

        let err = CartError::from(CartInvariantError::ZeroAmount(ProductId::new(2)));
        assert!(matches!(err, CartError::Invariant(_)));
    }

    #[test]
    fn test_is_infrastructure() {
        assert!(CartError::Inventory(InventoryError::NotFound(ProductId::new(1))).is_infrastructure());
        assert!(!CartError::ProductNotFound(ProductId::new(1)).is_infrastructure());
    }
}
