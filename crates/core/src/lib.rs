//! Pocketstore Core - Shared types library.
//!
//! This crate provides the domain types used by the storefront client:
//! - products and categories as served by the remote catalog
//! - type-safe identifiers and non-negative prices
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs and prices, plus catalog records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
