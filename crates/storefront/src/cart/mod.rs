//! Persistent shopping cart.
//!
//! [`CartManager`] owns the cart for one application state. Every mutation
//! updates memory immediately, notifies subscribers and hands the new snapshot
//! to a background write. Callers get a [`PersistTask`] back and may ignore it.
//!
//! # Example
//!
//! ```rust,ignore
//! let cart = CartManager::new(store);
//! cart.load().await;
//!
//! cart.add(&product);
//! cart.decrease_quantity(product.id);
//!
//! // Tests can wait for the write instead of sleeping
//! cart.clear().await?;
//! ```

mod model;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pocketstore_core::{Product, ProductId};
use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::error::add_breadcrumb;
use crate::storage::{KeyValueStore, PersistTask, SnapshotWriter, keys, read_json};

pub use model::{Cart, CartItem};

#[cfg(test)]
pub(crate) use model::tests::product as test_product;

/// Cart state with write-through persistence.
#[derive(Debug)]
pub struct CartManager {
    cart: Mutex<Cart>,
    changes: watch::Sender<Cart>,
    writer: SnapshotWriter,
    loaded: AtomicBool,
    edits: AtomicU64,
}

impl CartManager {
    /// Create an empty, not yet loaded cart backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (changes, _) = watch::channel(Cart::new());
        Self {
            cart: Mutex::new(Cart::new()),
            changes,
            writer: SnapshotWriter::new(store, keys::CART_ITEMS),
            loaded: AtomicBool::new(false),
            edits: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a mutation, publish the result and persist it.
    ///
    /// The snapshot is handed to the writer while the lock is held, so write
    /// order always matches mutation order.
    fn mutate(&self, apply: impl FnOnce(&mut Cart) -> bool) -> PersistTask {
        let mut cart = self.lock();
        self.edits.fetch_add(1, Ordering::SeqCst);
        if apply(&mut cart) {
            self.changes.send_replace(cart.clone());
        }
        self.persist(&cart)
    }

    fn persist(&self, cart: &Cart) -> PersistTask {
        match serde_json::to_string(cart) {
            Ok(json) => self.writer.write(json),
            Err(e) => {
                warn!(error = %e, "Failed to encode cart snapshot");
                PersistTask::failed(e.into())
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `product`.
    pub fn add(&self, product: &Product) -> PersistTask {
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", product.id.to_string().as_str())]),
        );
        self.mutate(|cart| {
            cart.add(product);
            true
        })
    }

    /// Remove one unit of a product, or the whole line when `remove_all` is set.
    ///
    /// Absent products are ignored; the unchanged cart is still persisted.
    pub fn remove(&self, id: ProductId, remove_all: bool) -> PersistTask {
        add_breadcrumb(
            "cart",
            "Removed from cart",
            Some(&[
                ("product_id", id.to_string().as_str()),
                ("remove_all", if remove_all { "true" } else { "false" }),
            ]),
        );
        self.mutate(|cart| cart.remove(id, remove_all))
    }

    /// Add one unit to a line already in the cart.
    pub fn increase_quantity(&self, id: ProductId) -> PersistTask {
        add_breadcrumb(
            "cart",
            "Increased quantity",
            Some(&[("product_id", id.to_string().as_str())]),
        );
        self.mutate(|cart| cart.increase_quantity(id))
    }

    /// Remove one unit from a line; same as `remove(id, false)`.
    pub fn decrease_quantity(&self, id: ProductId) -> PersistTask {
        add_breadcrumb(
            "cart",
            "Decreased quantity",
            Some(&[("product_id", id.to_string().as_str())]),
        );
        self.mutate(|cart| cart.decrease_quantity(id))
    }

    /// Empty the cart and persist an empty snapshot.
    pub fn clear(&self) -> PersistTask {
        add_breadcrumb("cart", "Cleared cart", None);
        self.mutate(|cart| {
            let changed = !cart.is_empty();
            cart.clear();
            changed
        })
    }

    /// Empty the cart and delete its storage key altogether.
    pub fn purge(&self) -> PersistTask {
        let mut cart = self.lock();
        self.edits.fetch_add(1, Ordering::SeqCst);
        if !cart.is_empty() {
            cart.clear();
            self.changes.send_replace(Cart::new());
        }
        self.writer.remove()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Restore the saved cart, once.
    ///
    /// Does nothing if a previous load already completed. A missing, unreadable
    /// or corrupt snapshot leaves the in-memory cart as it is; the cart counts
    /// as loaded either way. If the cart is edited while the snapshot is being
    /// read, the edit has already been persisted over it, so the snapshot is
    /// discarded and memory stays as edited.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        if self.is_loaded() {
            debug!("Cart already loaded");
            return;
        }

        let edits_before = self.edits.load(Ordering::SeqCst);

        match read_json::<Cart>(self.writer.store().as_ref(), keys::CART_ITEMS).await {
            Ok(Some(saved)) => {
                let mut cart = self.lock();
                if self.edits.load(Ordering::SeqCst) == edits_before {
                    info!(lines = saved.len(), units = saved.count(), "Restored saved cart");
                    *cart = saved;
                    self.changes.send_replace(cart.clone());
                } else {
                    debug!("Cart edited during load, keeping in-memory cart");
                }
            }
            Ok(None) => debug!("No saved cart"),
            Err(e) => warn!(error = %e, "Failed to load cart from storage"),
        }

        self.loaded.store(true, Ordering::SeqCst);
    }

    /// Whether [`Self::load`] has completed.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    /// Current line items in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock().items().to_vec()
    }

    /// Receiver that observes every change to the cart.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.changes.subscribe()
    }

    /// Cart total with exactly two decimal places, e.g. `"25.50"`.
    #[must_use]
    pub fn total(&self) -> String {
        self.lock().total_display()
    }

    /// Cart total as a decimal.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.lock().total()
    }

    /// Units across all lines (the badge on the cart button).
    #[must_use]
    pub fn count(&self) -> u64 {
        self.lock().count()
    }

    /// Whether a product is in the cart.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.lock().contains(id)
    }

    /// Units of a product in the cart (0 if absent).
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.lock().get(id).map_or(0, CartItem::quantity)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
