//! Unified error handling with Sentry integration.
//!
//! Component errors stay local to their modules ([`ConfigError`],
//! [`CatalogError`], [`StorageError`]); `AppError` wraps them for code that
//! deals with more than one component, such as application start-up.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog API operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Local storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    /// Report the error to Sentry and log it with the event id.
    pub fn capture(&self) -> sentry::types::Uuid {
        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Application error"
        );
        event_id
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error. Without an initialized client this is a no-op.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(StorageError::Unavailable("disk full".to_string()));
        assert_eq!(err.to_string(), "Storage error: storage unavailable: disk full");

        let err = AppError::from(CatalogError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        });
        assert_eq!(err.to_string(), "Catalog error: API error: 502 - bad gateway");
    }

    #[test]
    fn test_app_error_from_config() {
        let err: AppError =
            ConfigError::InvalidEnvVar("CATALOG_TIMEOUT_SECS".to_string(), "soon".to_string())
                .into();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_breadcrumb_without_client_is_noop() {
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "1")]));
        add_breadcrumb("cart", "Cleared cart", None);
    }
}
