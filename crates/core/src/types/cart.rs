//! Cart and line item types.
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s with at most one line per
//! product. Serialized, it is a bare JSON array of flat objects:
//!
//! ```json
//! [{"id": 1, "title": "Running shoe", "price": 179.9, "amount": 2}]
//! ```
//!
//! A line's own `id` and `amount` always win over product display fields of
//! the same name.

use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use super::{Product, ProductId};

/// Violations of the cart's structural rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartInvariantError {
    /// A second line for a product already in the cart.
    #[error("product {0} is already in the cart")]
    DuplicateProduct(ProductId),

    /// A line with a quantity of zero.
    #[error("product {0} has a quantity of zero")]
    ZeroAmount(ProductId),

    /// The product has no line in the cart.
    #[error("product {0} is not in the cart")]
    MissingProduct(ProductId),
}

/// One product in the cart with its requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LineItem {
    /// Product display data copied from the inventory at insertion time.
    #[serde(flatten)]
    pub product: Product,
    /// Requested quantity, always at least 1.
    pub amount: u32,
}

impl LineItem {
    /// Create a line for `product` with a quantity of 1.
    ///
    /// A display field named `amount` is dropped; the line's quantity
    /// replaces it.
    #[must_use]
    pub fn new(product: Product) -> Self {
        Self {
            product: product.without_field("amount"),
            amount: 1,
        }
    }

    /// The product this line refers to.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times quantity, when the product has a numeric price.
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        self.product
            .price()
            .map(|price| price * Decimal::from(self.amount))
    }
}

impl Serialize for LineItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.product.id)?;
        for (key, value) in self.product.fields().filter(|(key, _)| *key != "amount") {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("amount", &self.amount)?;
        map.end()
    }
}

/// Ordered collection of line items, unique by product ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart, rejecting duplicate products and zero quantities.
    ///
    /// # Errors
    ///
    /// Returns the first invariant violation found, in list order.
    pub fn try_from_items(items: Vec<LineItem>) -> Result<Self, CartInvariantError> {
        let mut cart = Self::new();
        for item in items {
            cart.push(item)?;
        }
        Ok(cart)
    }

    /// Build a cart, dropping lines that break an invariant.
    ///
    /// The first line for a product wins. Every dropped line is reported
    /// back so the caller can log it.
    #[must_use]
    pub fn from_items_lossy(items: Vec<LineItem>) -> (Self, Vec<CartInvariantError>) {
        let mut cart = Self::new();
        let mut dropped = Vec::new();
        for item in items {
            if let Err(e) = cart.push(item) {
                dropped.push(e);
            }
        }
        (cart, dropped)
    }

    /// The line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over the line items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether the product has a line in the cart.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Current quantity of a product, 0 if absent.
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |item| item.amount)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities (the number shown on a cart badge).
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of line subtotals. Lines without a numeric price count as zero.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().filter_map(LineItem::subtotal).sum()
    }

    /// Append a line at the end of the cart.
    ///
    /// # Errors
    ///
    /// Fails if the product is already present or the quantity is zero.
    pub fn push(&mut self, item: LineItem) -> Result<(), CartInvariantError> {
        if item.amount == 0 {
            return Err(CartInvariantError::ZeroAmount(item.id()));
        }
        if self.contains(item.id()) {
            return Err(CartInvariantError::DuplicateProduct(item.id()));
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove the line for a product, keeping the order of the rest.
    pub fn remove(&mut self, id: ProductId) -> Option<LineItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Set the quantity of an existing line in place.
    ///
    /// # Errors
    ///
    /// Fails if `amount` is zero or the product is not in the cart.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> Result<(), CartInvariantError> {
        if amount == 0 {
            return Err(CartInvariantError::ZeroAmount(id));
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(CartInvariantError::MissingProduct(id))?;
        item.amount = amount;
        Ok(())
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CartInvariantError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        Self::try_from_items(items)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    fn item(id: i32, amount: u32) -> LineItem {
        LineItem {
            product: Product::new(ProductId::new(id))
                .with_field("title", format!("Shoe {id}"))
                .with_field("price", "99.90"),
            amount,
        }
    }

    fn ids(cart: &Cart) -> Vec<i32> {
        cart.iter().map(|i| i.id().as_i32()).collect()
    }

    #[test]
    fn test_push_rejects_duplicates_and_zero() {
        let mut cart = Cart::new();
        cart.push(item(1, 1)).unwrap();

        assert_eq!(
            cart.push(item(1, 2)),
            Err(CartInvariantError::DuplicateProduct(ProductId::new(1)))
        );
        assert_eq!(
            cart.push(item(2, 0)),
            Err(CartInvariantError::ZeroAmount(ProductId::new(2)))
        );
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut cart = Cart::try_from_items(vec![item(1, 1), item(2, 1), item(3, 1)]).unwrap();

        let removed = cart.remove(ProductId::new(2)).unwrap();
        assert_eq!(removed.id(), ProductId::new(2));
        assert_eq!(ids(&cart), vec![1, 3]);

        assert!(cart.remove(ProductId::new(2)).is_none());
    }

    #[test]
    fn test_set_amount_updates_in_place() {
        let mut cart = Cart::try_from_items(vec![item(1, 1), item(2, 1)]).unwrap();

        cart.set_amount(ProductId::new(1), 4).unwrap();
        assert_eq!(ids(&cart), vec![1, 2]);
        assert_eq!(cart.amount_of(ProductId::new(1)), 4);
        assert_eq!(cart.total_quantity(), 5);

        assert_eq!(
            cart.set_amount(ProductId::new(9), 1),
            Err(CartInvariantError::MissingProduct(ProductId::new(9)))
        );
        assert_eq!(
            cart.set_amount(ProductId::new(1), 0),
            Err(CartInvariantError::ZeroAmount(ProductId::new(1)))
        );
    }

    #[test]
    fn test_from_items_lossy_keeps_first_occurrence() {
        let (cart, dropped) = Cart::from_items_lossy(vec![item(1, 2), item(2, 0), item(1, 5)]);

        assert_eq!(ids(&cart), vec![1]);
        assert_eq!(cart.amount_of(ProductId::new(1)), 2);
        assert_eq!(dropped.len(), 2);
    }

    #[test]
    fn test_serializes_as_flat_array() {
        let cart = Cart::try_from_items(vec![item(1, 2)]).unwrap();
        let json = serde_json::to_value(&cart).unwrap();

        let line = &json.as_array().unwrap()[0];
        assert_eq!(line["id"], 1);
        assert_eq!(line["amount"], 2);
        assert_eq!(line["title"], "Shoe 1");
    }

    #[test]
    fn test_json_round_trip_keeps_display_fields() {
        let stored = r#"[
            {"id": 2, "title": "Trail shoe", "price": 139.9, "image": "a.jpg", "color": "red", "amount": 3},
            {"id": 1, "title": "Road shoe", "price": "99.90", "amount": 1}
        ]"#;

        let cart: Cart = serde_json::from_str(stored).unwrap();
        assert_eq!(ids(&cart), vec![2, 1]);
        assert_eq!(cart.items()[0].product.field("color"), Some(&json!("red")));

        let reloaded: Cart = serde_json::from_str(&serde_json::to_string(&cart).unwrap()).unwrap();
        assert_eq!(reloaded, cart);
    }

    #[test]
    fn test_line_amount_replaces_product_amount_field() {
        let product = Product::new(ProductId::new(1))
            .with_field("title", "Shoe")
            .with_field("amount", 7);

        let line = LineItem::new(product.clone());
        assert_eq!(line.product.field("amount"), None);

        let cart = Cart::try_from_items(vec![line]).unwrap();
        let raw = serde_json::to_string(&cart).unwrap();
        assert_eq!(raw.matches("\"amount\"").count(), 1);

        let reloaded: Cart = serde_json::from_str(&raw).unwrap();
        assert_eq!(reloaded, cart);
        assert_eq!(reloaded.amount_of(ProductId::new(1)), 1);

        // A line built directly still serializes one `amount`
        let direct = LineItem { product, amount: 3 };
        let value = serde_json::to_value(Cart::try_from_items(vec![direct]).unwrap()).unwrap();
        assert_eq!(value[0]["amount"], 3);
    }

    #[test]
    fn test_total_skips_unpriced_lines() {
        let unpriced = LineItem {
            product: Product::new(ProductId::new(3)).with_field("name", "Sock"),
            amount: 4,
        };
        let cart = Cart::try_from_items(vec![item(1, 2), item(2, 1), unpriced]).unwrap();

        assert_eq!(cart.items()[2].subtotal(), None);
        assert_eq!(cart.total(), Decimal::new(29970, 2));
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let stored = r#"[
            {"id": 1, "title": "a", "price": 1, "amount": 1},
            {"id": 1, "title": "a", "price": 1, "amount": 1}
        ]"#;
        assert!(serde_json::from_str::<Cart>(stored).is_err());
    }
}
