//! Application state shared across screens.

use std::sync::Arc;

use crate::cart::CartManager;
use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::storage::{FileStore, KeyValueStore};
use crate::theme::ThemeManager;

/// Application state shared across all screens.
///
/// This struct is cheaply cloneable via `Arc`. The cart and theme managers
/// share one backing store and exist exactly once per state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    cart: CartManager,
    theme: ThemeManager,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("data_dir", &self.inner.config.data_dir)
            .field("catalog", &self.inner.catalog)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create state backed by a [`FileStore`] in `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog client cannot be built.
    pub fn from_config(config: StorefrontConfig) -> Result<Self> {
        let store = Arc::new(FileStore::new(config.data_dir.clone()));
        Self::with_store(config, store)
    }

    /// Create state backed by an arbitrary store.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog client cannot be built.
    pub fn with_store(config: StorefrontConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let catalog = CatalogClient::new(&config.catalog)?;
        let cart = CartManager::new(Arc::clone(&store));
        let theme = ThemeManager::new(store);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart,
                theme,
            }),
        })
    }

    /// Restore the saved cart and theme. Safe to call more than once.
    pub async fn hydrate(&self) {
        tokio::join!(self.inner.cart.load(), self.inner.theme.load());
        tracing::info!(
            cart_units = self.inner.cart.count(),
            theme = %self.inner.theme.mode(),
            "State hydrated"
        );
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog API client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    #[must_use]
    pub fn cart(&self) -> &CartManager {
        &self.inner.cart
    }

    #[must_use]
    pub fn theme(&self) -> &ThemeManager {
        &self.inner.theme
    }
}
