//! Pocketstore storefront client state.
//!
//! Everything a storefront screen needs apart from rendering:
//!
//! - [`catalog`]: read-only product catalog over HTTP, with caching and
//!   category filtering
//! - [`cart`]: the shopping cart, persisted to device storage after every change
//! - [`theme`]: light/dark preference and color palettes, persisted the same way
//! - [`storage`]: the key-value store contract and its file and memory backends
//!
//! [`state::AppState`] wires one of each together.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = StorefrontConfig::from_env()?;
//! let _guard = telemetry::init(&config);
//!
//! let state = AppState::from_config(config)?;
//! state.hydrate().await;
//!
//! let products = state.catalog().products_or_empty().await;
//! state.cart().add(&products[0]);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod theme;

pub use state::AppState;
