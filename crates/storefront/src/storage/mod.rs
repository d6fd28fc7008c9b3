//! Durable key-value storage for state snapshots.
//!
//! # Architecture
//!
//! - [`KeyValueStore`] is the device storage contract: string keys, string
//!   values, async `get`/`set`/`remove`, last write wins per key, no transactions
//! - [`FileStore`] keeps one file per key under the data directory
//! - [`MemoryStore`] keeps everything in process (tests, previews)
//! - [`SnapshotWriter`] issues fire-and-forget writes for one key and returns a
//!   [`PersistTask`] that can be awaited to observe the outcome
//!
//! # Keys
//!
//! | key | value |
//! |-----|-------|
//! | `@cart_items` | JSON array of cart line items |
//! | `@app_theme` | JSON `true` (dark) or `false` (light) |

mod file;
mod memory;
mod writer;

use std::fmt::Debug;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use writer::{PersistOutcome, PersistTask, SnapshotWriter};

/// Storage keys used by the state managers.
pub mod keys {
    /// Serialized cart line items.
    pub const CART_ITEMS: &str = "@cart_items";
    /// Dark mode flag.
    pub const THEME: &str = "@app_theme";
}

/// Errors that can occur when reading or writing the device store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing store cannot be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The key cannot be mapped onto the backing store.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// A background write task panicked or was cancelled.
    #[error("write task failed: {0}")]
    Task(String),
}

/// Asynchronous string key-value store.
///
/// Implementations only promise last-write-wins per key. Callers that need
/// ordering across concurrent writers go through [`SnapshotWriter`].
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    /// Retrieve a value. Returns `Ok(None)` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Returns `Ok(())` even if the key did not exist.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode a JSON value.
///
/// # Errors
///
/// Returns `StorageError` if the read fails or the stored text is not valid
/// JSON for `T`.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_json_missing_key() {
        let store = MemoryStore::new();
        let value: Option<bool> = read_json(&store, keys::THEME).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_read_json_decodes() {
        let store = MemoryStore::new();
        store.set(keys::THEME, "true").await.unwrap();

        let value: Option<bool> = read_json(&store, keys::THEME).await.unwrap();
        assert_eq!(value, Some(true));
    }

    #[tokio::test]
    async fn test_read_json_corrupt_value() {
        let store = MemoryStore::new();
        store.set(keys::THEME, "{not json").await.unwrap();

        let err = read_json::<bool>(&store, keys::THEME).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Unavailable("offline".to_string());
        assert_eq!(err.to_string(), "storage unavailable: offline");

        let err = StorageError::InvalidKey(String::new());
        assert_eq!(err.to_string(), "invalid storage key: \"\"");
    }
}
