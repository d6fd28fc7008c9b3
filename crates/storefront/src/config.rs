//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; a set but unparsable value is an error.
//!
//! - `CATALOG_BASE_URL` - Catalog API root (default: <https://api.escuelajs.co/api/v1>)
//! - `CATALOG_TIMEOUT_SECS` - HTTP request timeout (default: 10)
//! - `CATALOG_CACHE_TTL_SECS` - How long catalog responses stay cached (default: 300)
//! - `CATALOG_CACHE_CAPACITY` - Maximum cached catalog responses (default: 1000)
//! - `POCKETSTORE_DATA_DIR` - Directory for the on-device key-value store (default: .pocketstore)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_CATALOG_BASE_URL: &str = "https://api.escuelajs.co/api/v1";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote catalog configuration
    pub catalog: CatalogConfig,
    /// Directory backing the file key-value store
    pub data_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
}

/// Remote catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// API root, e.g. `https://api.escuelajs.co/api/v1`
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Cache time-to-live for product responses
    pub cache_ttl: Duration,
    /// Maximum number of cached responses
    pub cache_capacity: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: parse_base_url(DEFAULT_CATALOG_BASE_URL)
                .unwrap_or_else(|_| unreachable!("default catalog URL is valid")),
            timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 1000,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            catalog: CatalogConfig::from_env()?,
            data_dir: PathBuf::from(get_env_or_default("POCKETSTORE_DATA_DIR", ".pocketstore")),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for tests and embedding: default catalog, given data directory.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog: CatalogConfig::default(),
            data_dir: data_dir.into(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(&get_env_or_default(
            "CATALOG_BASE_URL",
            DEFAULT_CATALOG_BASE_URL,
        ))?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(get_parsed_env("CATALOG_TIMEOUT_SECS", 10)?),
            cache_ttl: Duration::from_secs(get_parsed_env("CATALOG_CACHE_TTL_SECS", 300)?),
            cache_capacity: get_parsed_env("CATALOG_CACHE_CAPACITY", 1000)?,
        })
    }

    /// Default settings pointed at another catalog root (staging, local mock).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `raw` is not an absolute URL.
    pub fn with_base_url(raw: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(raw)?,
            ..Self::default()
        })
    }

    /// Build the URL for a path below the API root (`products`, `products/4`).
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the joined path is not a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path.trim_start_matches('/'))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the catalog root, forcing a trailing slash so `Url::join` appends.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_BASE_URL".to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "CATALOG_BASE_URL".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get and parse an environment variable, falling back to `default` when unset.
fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
