//! Integration tests for Pocketstore.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pocketstore-integration-tests
//! ```
//!
//! No external services are needed: catalog tests run against
//! [`MockCatalog`], an in-process HTTP server that mimics the catalog API,
//! and persistence tests use temporary directories.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

/// Canned behavior for the mock catalog.
#[derive(Debug, Clone)]
pub enum CatalogFixture {
    /// Serve these products.
    Products(Vec<Value>),
    /// Answer every request with this status and body.
    Failing(StatusCode, String),
}

#[derive(Debug)]
struct MockState {
    fixture: CatalogFixture,
    hits: AtomicUsize,
}

/// In-process catalog API listening on a random local port.
#[derive(Debug)]
pub struct MockCatalog {
    addr: SocketAddr,
    state: Arc<MockState>,
    server: tokio::task::JoinHandle<()>,
}

impl MockCatalog {
    /// Start a server for `fixture`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(fixture: CatalogFixture) -> Self {
        let state = Arc::new(MockState {
            fixture,
            hits: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/api/v1/products", get(list_products))
            .route("/api/v1/products/{id}", get(get_product))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock catalog");
        let addr = listener.local_addr().expect("Failed to read local address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Root URL to put in `CATALOG_BASE_URL`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    /// Requests served so far.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

impl Drop for MockCatalog {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn list_products(State(state): State<Arc<MockState>>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    match &state.fixture {
        CatalogFixture::Products(products) => Json(products.clone()).into_response(),
        CatalogFixture::Failing(status, body) => (*status, body.clone()).into_response(),
    }
}

async fn get_product(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    match &state.fixture {
        CatalogFixture::Products(products) => {
            let found = id.parse::<i64>().ok().and_then(|id| {
                products
                    .iter()
                    .find(|p| p.get("id").and_then(Value::as_i64) == Some(id))
            });
            match found {
                Some(product) => Json(product.clone()).into_response(),
                // The real API reports unknown ids this way
                None => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "path": format!("/api/v1/products/{id}"),
                        "message": "Could not find any entity of type \"Product\"",
                        "name": "EntityNotFoundError",
                    })),
                )
                    .into_response(),
            }
        }
        CatalogFixture::Failing(status, body) => (*status, body.clone()).into_response(),
    }
}

/// A product payload shaped like the catalog API's.
#[must_use]
pub fn product_json(id: i64, title: &str, price: f64, category: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "slug": title.to_lowercase().replace(' ', "-"),
        "price": price,
        "description": format!("{title} description"),
        "category": {
            "id": id * 10,
            "name": category,
            "slug": category.to_lowercase(),
            "image": format!("https://i.imgur.com/{id}.jpeg"),
        },
        "images": [format!("https://i.imgur.com/{id}a.jpeg")],
        "creationAt": "2024-06-01T12:00:00.000Z",
        "updatedAt": "2024-06-01T12:00:00.000Z",
    })
}
