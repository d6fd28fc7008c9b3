//! Fire-and-forget snapshot writes.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info_span};

use super::{KeyValueStore, StorageError};

/// What happened to a snapshot write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The snapshot reached the store.
    Written,
    /// A newer snapshot for the same key was already attempted; this one was dropped.
    Superseded,
}

/// Handle to a background write.
///
/// Dropping the handle does not cancel the write. Awaiting it yields the
/// write's outcome; failures have already been logged by then.
#[derive(Debug)]
pub struct PersistTask {
    handle: JoinHandle<Result<PersistOutcome, StorageError>>,
}

impl PersistTask {
    /// A task that has already failed, for writes that could not be issued.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn failed(err: StorageError) -> Self {
        Self {
            handle: tokio::spawn(async move { Err(err) }),
        }
    }

    /// Wait for the write to finish.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or `StorageError::Task` if the task panicked.
    pub async fn finish(self) -> Result<PersistOutcome, StorageError> {
        self.handle
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
    }

    /// Whether the write has completed (successfully or not).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl IntoFuture for PersistTask {
    type Output = Result<PersistOutcome, StorageError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.finish())
    }
}

enum WriteOp {
    Set(String),
    Remove,
}

/// Issues ordered background writes for a single storage key.
///
/// Every write gets a sequence number when it is issued. Writes take turns on
/// the key and a write whose number is older than the last stored one is
/// skipped, so the store always ends up holding the most recently issued
/// snapshot regardless of task scheduling. If that write fails, older ones
/// are still skipped and the key keeps its previous value.
#[derive(Debug)]
pub struct SnapshotWriter {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    issued: AtomicU64,
    stored: Arc<Mutex<u64>>,
}

impl SnapshotWriter {
    /// Create a writer for `key`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            issued: AtomicU64::new(0),
            stored: Arc::new(Mutex::new(0)),
        }
    }

    /// The key this writer owns.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Store `value` in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn write(&self, value: String) -> PersistTask {
        self.spawn(WriteOp::Set(value))
    }

    /// Delete the key in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn remove(&self) -> PersistTask {
        self.spawn(WriteOp::Remove)
    }

    fn spawn(&self, op: WriteOp) -> PersistTask {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let store = Arc::clone(&self.store);
        let stored = Arc::clone(&self.stored);
        let key = self.key;

        let span = info_span!("persist_snapshot", key, seq);
        let handle = tokio::spawn(apply(store, stored, key, seq, op).instrument(span));

        PersistTask { handle }
    }
}

/// Run one write if nothing newer has been attempted for the key.
///
/// The gate advances on failure too, so an older snapshot never lands after a
/// newer one was tried; the key keeps whatever was stored before.
async fn apply(
    store: Arc<dyn KeyValueStore>,
    stored: Arc<Mutex<u64>>,
    key: &'static str,
    seq: u64,
    op: WriteOp,
) -> Result<PersistOutcome, StorageError> {
    let mut last = stored.lock().await;
    if *last > seq {
        debug!(last = *last, "Newer snapshot already attempted, skipping");
        return Ok(PersistOutcome::Superseded);
    }
    *last = seq;

    let result = match &op {
        WriteOp::Set(value) => store.set(key, value).await,
        WriteOp::Remove => store.remove(key).await,
    };

    match result {
        Ok(()) => {
            debug!("Snapshot persisted");
            Ok(PersistOutcome::Written)
        }
        Err(e) => {
            error!(error = %e, "Failed to persist snapshot");
            Err(e)
        }
    }
}
