//! REST inventory client.
//!
//! Uses `reqwest` for HTTP. Product display data is cached with `moka`;
//! stock levels are always fetched fresh.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use shoecart_core::{Product, ProductId, Stock};
use tracing::{debug, instrument};
use url::Url;

use super::{InventoryError, InventoryService};
use crate::config::InventoryConfig;

/// Maximum number of cached products.
const PRODUCT_CACHE_CAPACITY: u64 = 1000;

/// Client for the inventory REST API.
///
/// Serves `GET {base}/stock/{id}` and `GET {base}/products/{id}`.
/// Cheap to clone; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct HttpInventoryClient {
    inner: Arc<HttpInventoryClientInner>,
}

struct HttpInventoryClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Option<Cache<ProductId, Product>>,
}

impl HttpInventoryClient {
    /// Create a new inventory client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &InventoryConfig) -> Result<Self, InventoryError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| InventoryError::Parse(format!("Invalid token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        let products = (!config.product_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(PRODUCT_CACHE_CAPACITY)
                .time_to_live(config.product_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(HttpInventoryClientInner {
                client,
                base_url: with_trailing_slash(config.base_url.clone()),
                products,
            }),
        })
    }

    /// Build the URL for `{resource}/{id}` under the base URL.
    fn endpoint(&self, resource: &str, id: ProductId) -> Result<Url, InventoryError> {
        Ok(self.inner.base_url.join(&format!("{resource}/{id}"))?)
    }

    /// Execute a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        id: ProductId,
    ) -> Result<T, InventoryError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound(id));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(InventoryError::RateLimited(retry_after));
        }

        // Read as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Inventory API returned non-success status"
            );
            return Err(InventoryError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse inventory response"
            );
            InventoryError::Parse(e.to_string())
        })
    }
}

impl InventoryService for HttpInventoryClient {
    #[instrument(skip(self))]
    async fn stock(&self, id: ProductId) -> Result<Stock, InventoryError> {
        let url = self.endpoint("stock", id)?;
        self.get_json(url, id).await
    }

    #[instrument(skip(self))]
    async fn product(&self, id: ProductId) -> Result<Product, InventoryError> {
        if let Some(cache) = &self.inner.products
            && let Some(product) = cache.get(&id).await
        {
            debug!("product cache hit");
            return Ok(product);
        }

        let url = self.endpoint("products", id)?;
        let product: Product = self.get_json(url, id).await?;

        if let Some(cache) = &self.inner.products {
            cache.insert(id, product.clone()).await;
        }

        Ok(product)
    }
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
