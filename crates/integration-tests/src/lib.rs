//! Integration tests for shoecart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shoecart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `inventory_http` - HTTP inventory client against a fake inventory API
//! - `cart_flow` - Cart context end to end: HTTP inventory, file storage
//!
//! Tests need no external services. [`FakeInventory`] serves the inventory
//! API from an `axum` router on an ephemeral local port.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

/// How the fake server answers requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Serve the registered products and stock.
    Normal,
    /// Answer every request with 500.
    ServerError,
    /// Answer every request with 429 and the given `Retry-After`.
    RateLimited(u64),
    /// Answer every request with 200 and a body that is not JSON.
    Garbage,
}

#[derive(Debug)]
struct FakeState {
    products: RwLock<HashMap<i32, Value>>,
    stock: RwLock<HashMap<i32, i64>>,
    mode: RwLock<Mode>,
    product_hits: AtomicUsize,
}

/// Fake inventory API on `127.0.0.1`.
///
/// Serves `GET /stock/{id}` and `GET /products/{id}`. The server is aborted
/// when the value is dropped.
pub struct FakeInventory {
    state: Arc<FakeState>,
    base_url: Url,
    handle: JoinHandle<()>,
}

impl FakeInventory {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot be bound.
    pub async fn start() -> io::Result<Self> {
        let state = Arc::new(FakeState {
            products: RwLock::new(HashMap::new()),
            stock: RwLock::new(HashMap::new()),
            mode: RwLock::new(Mode::Normal),
            product_hits: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/stock/{id}", get(get_stock))
            .route("/products/{id}", get(get_product))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let base_url = Url::parse(&format!("http://{addr}/"))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            state,
            base_url,
            handle,
        })
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// Register a product with a title and price, and its stock level.
    pub fn add_product(&self, id: i32, title: &str, price: f64, stock: i64) {
        self.add_product_json(
            id,
            json!({
                "id": id,
                "title": title,
                "price": price,
                "image": format!("https://cdn.example.com/{id}.jpg"),
            }),
            stock,
        );
    }

    /// Register a product with an arbitrary JSON body.
    pub fn add_product_json(&self, id: i32, body: Value, stock: i64) {
        self.state
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, body);
        self.set_stock(id, stock);
    }

    /// Change a product's stock level.
    pub fn set_stock(&self, id: i32, amount: i64) {
        self.state
            .stock
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, amount);
    }

    /// Switch how requests are answered.
    pub fn set_mode(&self, mode: Mode) {
        *self.state.mode.write().unwrap_or_else(PoisonError::into_inner) = mode;
    }

    /// Number of `/products/{id}` requests served.
    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.state.product_hits.load(Ordering::SeqCst)
    }
}

impl Drop for FakeInventory {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Storage file path in a fresh per-test directory.
#[must_use]
pub fn temp_storage_path(test_name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "shoecart-it-{}-{test_name}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("storage.json")
}

fn override_response(state: &FakeState) -> Option<Response> {
    match *state.mode.read().unwrap_or_else(PoisonError::into_inner) {
        Mode::Normal => None,
        Mode::ServerError => {
            Some((StatusCode::INTERNAL_SERVER_ERROR, "inventory exploded").into_response())
        }
        Mode::RateLimited(secs) => Some(
            (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", secs.to_string())],
                "slow down",
            )
                .into_response(),
        ),
        Mode::Garbage => Some((StatusCode::OK, "<html>not json</html>").into_response()),
    }
}

async fn get_stock(State(state): State<Arc<FakeState>>, Path(id): Path<i32>) -> Response {
    if let Some(response) = override_response(&state) {
        return response;
    }
    let amount = state
        .stock
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .copied();
    match amount {
        Some(amount) => Json(json!({ "id": id, "amount": amount })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_product(State(state): State<Arc<FakeState>>, Path(id): Path<i32>) -> Response {
    if let Some(response) = override_response(&state) {
        return response;
    }
    state.product_hits.fetch_add(1, Ordering::SeqCst);
    let product = state
        .products
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .cloned();
    match product {
        Some(body) => Json(body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
