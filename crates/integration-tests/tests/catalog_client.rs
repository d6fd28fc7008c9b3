//! Integration tests for the catalog client against a mock catalog API.
//!
//! Run with: cargo test -p pocketstore-integration-tests

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use pocketstore_core::ProductId;
use pocketstore_integration_tests::{CatalogFixture, MockCatalog, product_json};
use pocketstore_storefront::catalog::{CatalogClient, CatalogError, CategoryFilter, ProductListing};
use pocketstore_storefront::config::CatalogConfig;

fn fixture() -> CatalogFixture {
    CatalogFixture::Products(vec![
        product_json(1, "Classic Tee", 19.99, "Clothes"),
        product_json(2, "Runner", 89.5, "Shoes"),
        product_json(3, "Hoodie", 45.0, "Clothes"),
    ])
}

fn client_for(mock: &MockCatalog) -> CatalogClient {
    let config = CatalogConfig::with_base_url(&mock.base_url()).unwrap();
    CatalogClient::new(&config).unwrap()
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_products_decodes_payload() {
    let mock = MockCatalog::start(fixture()).await;
    let client = client_for(&mock);

    let products = client.list_products().await.unwrap();

    assert_eq!(products.len(), 3);
    assert_eq!(products[0].title, "Classic Tee");
    assert_eq!(products[0].price.display(), "$19.99");
    assert_eq!(products[1].category_name(), "Shoes");
    assert!(products[2].creation_at.is_some());
}

#[tokio::test]
async fn test_list_products_is_cached_until_refresh() {
    let mock = MockCatalog::start(fixture()).await;
    let client = client_for(&mock);

    client.list_products().await.unwrap();
    client.list_products().await.unwrap();
    // Detail for a listed product comes from the list response
    client.get_product(ProductId::new(2)).await.unwrap();
    assert_eq!(mock.hits(), 1);

    let refreshed = client.refresh().await;
    assert_eq!(refreshed.len(), 3);
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn test_listing_filters_fetched_products() {
    let mock = MockCatalog::start(fixture()).await;
    let client = client_for(&mock);

    let mut listing = ProductListing::new(client.products_or_empty().await);

    let labels: Vec<&str> = listing.categories().iter().map(CategoryFilter::label).collect();
    assert_eq!(labels, ["All", "Clothes", "Shoes"]);
    assert!(listing.select(&CategoryFilter::named("Clothes")));
    let titles: Vec<&str> = listing.visible().iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Classic Tee", "Hoodie"]);
}

// ============================================================================
// Detail
// ============================================================================

#[tokio::test]
async fn test_get_product_by_id() {
    let mock = MockCatalog::start(fixture()).await;
    let client = client_for(&mock);

    let product = client.get_product(ProductId::new(3)).await.unwrap().unwrap();

    assert_eq!(product.title, "Hoodie");
    assert_eq!(product.primary_image(), Some("https://i.imgur.com/3a.jpeg"));
}

#[tokio::test]
async fn test_unknown_product_is_none() {
    let mock = MockCatalog::start(fixture()).await;
    let client = client_for(&mock);

    assert!(client.get_product(ProductId::new(404)).await.unwrap().is_none());
    assert!(client.product_or_none(ProductId::new(404)).await.is_none());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_server_error_surfaces_as_api_error() {
    let mock = MockCatalog::start(CatalogFixture::Failing(
        StatusCode::INTERNAL_SERVER_ERROR,
        "upstream exploded".to_string(),
    ))
    .await;
    let client = client_for(&mock);

    let err = client.list_products().await.unwrap_err();

    assert!(matches!(err, CatalogError::Api { status: 500, .. }));
    assert!(client.products_or_empty().await.is_empty());
    assert!(client.product_or_none(ProductId::new(1)).await.is_none());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mock = MockCatalog::start(CatalogFixture::Failing(
        StatusCode::OK,
        "<html>maintenance</html>".to_string(),
    ))
    .await;
    let client = client_for(&mock);

    let err = client.list_products().await.unwrap_err();

    assert!(matches!(err, CatalogError::Parse(_)));
}

#[tokio::test]
async fn test_rate_limit_is_reported() {
    let mock = MockCatalog::start(CatalogFixture::Failing(
        StatusCode::TOO_MANY_REQUESTS,
        String::new(),
    ))
    .await;
    let client = client_for(&mock);

    let err = client.list_products().await.unwrap_err();

    assert!(matches!(err, CatalogError::RateLimited(1)));
}
