//! Remote product catalog client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`: `GET /products` and `GET /products/{id}`
//! - The catalog is the source of truth; nothing is written back
//! - In-memory caching via `moka` (TTL and capacity from [`CatalogConfig`])
//!
//! Screens never see catalog errors: [`CatalogClient::products_or_empty`] and
//! [`CatalogClient::product_or_none`] log the failure and degrade to an empty
//! list or no product.
//!
//! # Example
//!
//! ```rust,ignore
//! use pocketstore_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config.catalog)?;
//!
//! let products = client.products_or_empty().await;
//! let detail = client.product_or_none(products[0].id).await;
//! ```

mod cache;
pub mod listing;

use std::sync::Arc;

use moka::future::Cache;
use pocketstore_core::{Product, ProductId};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::CatalogConfig;

use cache::{CacheKey, CacheValue};

pub use listing::{ALL_CATEGORIES, CategoryFilter, ProductListing};

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the catalog.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the remote catalog API.
///
/// Cheap to clone; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    config: CatalogConfig,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.config.base_url.as_str())
            .field("cached_entries", &self.inner.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("pocketstore/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                config: config.clone(),
                cache,
            }),
        })
    }

    /// GET a path below the API root and decode the JSON body.
    ///
    /// Returns `Ok(None)` when the catalog reports the resource as missing.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, CatalogError> {
        let url = self.inner.config.endpoint(path)?;
        let response = self
            .inner
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if is_not_found(status, &body) {
            debug!(%status, "Catalog resource not found");
            return Ok(None);
        }

        if !status.is_success() {
            warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse catalog response"
                );
                Err(CatalogError::Parse(e))
            }
        }
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json("products").await?.unwrap_or_default();

        for product in &products {
            self.inner
                .cache
                .insert(
                    CacheKey::Product(product.id),
                    CacheValue::Product(Box::new(product.clone())),
                )
                .await;
        }
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        debug!(count = products.len(), "Fetched product list");
        Ok(products)
    }

    /// Get a product by id. Returns `Ok(None)` if the catalog has no such product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let product: Option<Product> = self.get_json(&format!("products/{id}")).await?;

        if let Some(product) = &product {
            self.inner
                .cache
                .insert(key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }

        Ok(product)
    }

    /// List products, or an empty list if the catalog cannot be reached.
    pub async fn products_or_empty(&self) -> Vec<Product> {
        self.list_products().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to fetch products");
            Vec::new()
        })
    }

    /// Get a product, or `None` if it is missing or the catalog cannot be reached.
    pub async fn product_or_none(&self, id: ProductId) -> Option<Product> {
        self.get_product(id).await.unwrap_or_else(|e| {
            warn!(error = %e, product_id = %id, "Failed to fetch product details");
            None
        })
    }

    /// Drop cached responses and fetch the product list again (pull-to-refresh).
    pub async fn refresh(&self) -> Vec<Product> {
        self.invalidate();
        self.products_or_empty().await
    }

    /// Drop every cached response.
    pub fn invalidate(&self) {
        self.inner.cache.invalidate_all();
    }
}

/// Whether a response means "no such resource".
///
/// The catalog answers unknown ids with `400` and an `EntityNotFoundError`
/// body rather than `404`.
fn is_not_found(status: StatusCode, body: &str) -> bool {
    status == StatusCode::NOT_FOUND
        || (status == StatusCode::BAD_REQUEST && body.contains("EntityNotFound"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");

        let err = CatalogError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");
    }

    #[test]
    fn test_is_not_found() {
        assert!(is_not_found(StatusCode::NOT_FOUND, ""));
        assert!(is_not_found(
            StatusCode::BAD_REQUEST,
            r#"{"name":"EntityNotFoundError","message":"Could not find any entity"}"#
        ));
        assert!(!is_not_found(StatusCode::BAD_REQUEST, r#"{"message":"id must be a number"}"#));
        assert!(!is_not_found(StatusCode::INTERNAL_SERVER_ERROR, "EntityNotFound"));
    }

    #[tokio::test]
    async fn test_unreachable_catalog_degrades() {
        let mut config = CatalogConfig::with_base_url("http://127.0.0.1:9/").unwrap_or_default();
        config.timeout = std::time::Duration::from_millis(500);
        let client = CatalogClient::new(&config).unwrap_or_else(|e| panic!("client: {e}"));

        assert!(client.products_or_empty().await.is_empty());
        assert!(client.product_or_none(ProductId::new(1)).await.is_none());
    }
}
