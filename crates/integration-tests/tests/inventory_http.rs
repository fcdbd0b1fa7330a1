//! Integration tests for the HTTP inventory client.
//!
//! These run the real `reqwest` client against the fake inventory API.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use shoecart::config::InventoryConfig;
use shoecart::inventory::{HttpInventoryClient, InventoryError, InventoryService};
use shoecart_core::ProductId;
use shoecart_integration_tests::{FakeInventory, Mode};

fn client(server: &FakeInventory) -> HttpInventoryClient {
    HttpInventoryClient::new(&InventoryConfig::new(server.base_url())).unwrap()
}

// =============================================================================
// Lookups
// =============================================================================

#[tokio::test]
async fn test_fetches_stock() {
    let server = FakeInventory::start().await.unwrap();
    server.add_product(1, "Running shoe", 179.9, 5);

    let stock = client(&server).stock(ProductId::new(1)).await.unwrap();
    assert_eq!(stock.id, ProductId::new(1));
    assert_eq!(stock.amount, 5);
}

#[tokio::test]
async fn test_fetches_product_with_extra_fields() {
    let server = FakeInventory::start().await.unwrap();
    server.add_product_json(
        2,
        json!({ "id": 2, "title": "Trail shoe", "price": "139.90", "brand": "Acme" }),
        3,
    );

    let product = client(&server).product(ProductId::new(2)).await.unwrap();
    assert_eq!(product.title(), Some("Trail shoe"));
    assert_eq!(product.price().unwrap().to_string(), "139.90");
    assert!(product.image().is_none());
    assert_eq!(product.field("brand"), Some(&json!("Acme")));
}

#[tokio::test]
async fn test_product_lookups_are_cached() {
    let server = FakeInventory::start().await.unwrap();
    server.add_product(1, "Running shoe", 179.9, 5);
    let client = client(&server);

    client.product(ProductId::new(1)).await.unwrap();
    client.product(ProductId::new(1)).await.unwrap();

    assert_eq!(server.product_hits(), 1);
}

#[tokio::test]
async fn test_cache_can_be_disabled() {
    let server = FakeInventory::start().await.unwrap();
    server.add_product(1, "Running shoe", 179.9, 5);

    let mut config = InventoryConfig::new(server.base_url());
    config.product_cache_ttl = Duration::ZERO;
    let client = HttpInventoryClient::new(&config).unwrap();

    client.product(ProductId::new(1)).await.unwrap();
    client.product(ProductId::new(1)).await.unwrap();

    assert_eq!(server.product_hits(), 2);
}

#[tokio::test]
async fn test_stock_is_never_cached() {
    let server = FakeInventory::start().await.unwrap();
    server.add_product(1, "Running shoe", 179.9, 5);
    let client = client(&server);

    assert_eq!(client.stock(ProductId::new(1)).await.unwrap().amount, 5);
    server.set_stock(1, 2);
    assert_eq!(client.stock(ProductId::new(1)).await.unwrap().amount, 2);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let server = FakeInventory::start().await.unwrap();
    let client = client(&server);

    let err = client.stock(ProductId::new(42)).await.unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(id) if id == ProductId::new(42)));

    let err = client.product(ProductId::new(42)).await.unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(_)));
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let server = FakeInventory::start().await.unwrap();
    server.add_product(1, "Running shoe", 179.9, 5);
    server.set_mode(Mode::ServerError);

    let err = client(&server).stock(ProductId::new(1)).await.unwrap_err();
    assert!(matches!(err, InventoryError::Api { status: 500, .. }));
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let server = FakeInventory::start().await.unwrap();
    server.set_mode(Mode::RateLimited(7));

    let err = client(&server).stock(ProductId::new(1)).await.unwrap_err();
    assert!(matches!(err, InventoryError::RateLimited(7)));
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let server = FakeInventory::start().await.unwrap();
    server.set_mode(Mode::Garbage);

    let err = client(&server).product(ProductId::new(1)).await.unwrap_err();
    assert!(matches!(err, InventoryError::Parse(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
    let server = FakeInventory::start().await.unwrap();
    let base_url = server.base_url();
    drop(server);
    // Give the aborted server task a moment to release the port
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut config = InventoryConfig::new(base_url);
    config.request_timeout = Duration::from_secs(2);
    let client = HttpInventoryClient::new(&config).unwrap();

    let err = client.stock(ProductId::new(1)).await.unwrap_err();
    assert!(matches!(err, InventoryError::Http(_)));
}
