//! Logging and error reporting setup.
//!
//! Call [`init`] once at start-up and keep the returned guard alive for the
//! lifetime of the process; dropping it flushes pending Sentry events.

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::StorefrontConfig;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "pocketstore_storefront=info";

/// Initialize Sentry error tracking and return guard that must be kept alive.
///
/// Returns `None` when no DSN is configured.
pub fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Map tracing levels to Sentry event types.
#[must_use]
pub fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install Sentry and the global tracing subscriber.
///
/// Sentry is initialized first so the tracing layer can forward to it. A
/// second call leaves the existing subscriber in place.
pub fn init(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let guard = init_sentry(config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .try_init();

    if let Err(e) = installed {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_dsn_skips_sentry() {
        let config = StorefrontConfig::with_data_dir("/tmp/pocketstore-test");
        assert!(init_sentry(&config).is_none());
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = StorefrontConfig::with_data_dir("/tmp/pocketstore-test");
        assert!(init(&config).is_none());
        assert!(init(&config).is_none());
    }
}
