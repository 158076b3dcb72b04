//! Logging bootstrap for the server process.
//!
//! The library logs through the `log` facade; those records are forwarded
//! into the `tracing` subscriber installed here.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use claimflow::config::LoggingConfig;

use crate::error::ServerError;

/// Builds the filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Call once, before anything logs.
pub fn init(config: &LoggingConfig) -> Result<(), ServerError> {
    let filter = env_filter(config);

    if config.json {
        let subscriber = Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true));
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| ServerError::Telemetry(e.to_string()))?;
    } else {
        let subscriber = Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(true));
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| ServerError::Telemetry(e.to_string()))?;
    }

    tracing_log::LogTracer::init().map_err(|e| ServerError::Telemetry(e.to_string()))?;

    Ok(())
}
