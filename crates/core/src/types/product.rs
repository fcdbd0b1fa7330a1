//! Product and stock records as served by the inventory API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ProductId;

/// Product display data returned by the inventory API.
///
/// Only `id` is required. Every other field is display data and is kept as
/// the raw JSON value the API sent, so it is stored exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(flatten)]
    display: Map<String, Value>,
}

impl Product {
    /// Create a product with no display fields.
    #[must_use]
    pub fn new(id: ProductId) -> Self {
        Self {
            id,
            display: Map::new(),
        }
    }

    /// Set a display field. A key of `id` is ignored.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != "id" {
            self.display.insert(key, value.into());
        }
        self
    }

    /// Drop a display field.
    #[must_use]
    pub fn without_field(mut self, key: &str) -> Self {
        self.display.remove(key);
        self
    }

    /// A display field as sent by the inventory.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.display.get(key)
    }

    /// All display fields, in key order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.display.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The `title` field, if it is a string.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.field("title").and_then(Value::as_str)
    }

    /// The `image` field, if it is a string.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.field("image").and_then(Value::as_str)
    }

    /// The `price` field as a decimal.
    ///
    /// Accepts a JSON number or a numeric string. `None` when the field is
    /// missing or not a number.
    #[must_use]
    pub fn price(&self) -> Option<Decimal> {
        match self.field("price")? {
            Value::Number(n) => parse_decimal(&n.to_string()),
            Value::String(s) => parse_decimal(s.trim()),
            _ => None,
        }
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    raw.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Available stock for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    /// Units on hand. May be zero; negative values are treated as no stock.
    pub amount: i64,
}

impl Stock {
    /// Whether `requested` units fit within the available stock.
    #[must_use]
    pub const fn covers(&self, requested: i64) -> bool {
        requested <= self.amount
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_keeps_display_fields_as_sent() {
        let json = r#"{
            "id": 1,
            "title": "Running shoe",
            "price": 179.9,
            "image": "https://cdn.example.com/shoe.jpg",
            "brand": "Acme"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.title(), Some("Running shoe"));
        assert_eq!(product.price(), Some(Decimal::new(1799, 1)));
        assert_eq!(product.image(), Some("https://cdn.example.com/shoe.jpg"));
        assert_eq!(product.field("brand"), Some(&Value::from("Acme")));

        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["price"], 179.9);
    }

    #[test]
    fn test_product_with_only_id_and_name() {
        let product: Product = serde_json::from_str(r#"{"id": 4, "name": "Sandal"}"#).unwrap();

        assert_eq!(product.id, ProductId::new(4));
        assert_eq!(product.title(), None);
        assert_eq!(product.price(), None);
        assert_eq!(product.field("name"), Some(&Value::from("Sandal")));
    }

    #[test]
    fn test_price_accessor_tolerates_any_shape() {
        let product = |price: Value| Product::new(ProductId::new(1)).with_field("price", price);

        assert_eq!(product(Value::from("139.90")).price(), Some(Decimal::new(13990, 2)));
        assert_eq!(product(Value::from(25)).price(), Some(Decimal::new(25, 0)));
        assert_eq!(product(Value::from("R$ 139,90")).price(), None);
        assert_eq!(product(Value::Null).price(), None);
    }

    #[test]
    fn test_with_field_ignores_id() {
        let product = Product::new(ProductId::new(1)).with_field("id", 2);
        assert_eq!(product.field("id"), None);
        assert_eq!(serde_json::to_value(&product).unwrap()["id"], 1);
    }

    #[test]
    fn test_stock_covers() {
        let stock = Stock {
            id: ProductId::new(1),
            amount: 3,
        };
        assert!(stock.covers(3));
        assert!(!stock.covers(4));

        let empty = Stock {
            id: ProductId::new(2),
            amount: 0,
        };
        assert!(!empty.covers(1));
    }
}
