//! Logging setup.
//!
//! Installs a `tracing-subscriber` fmt layer behind an `EnvFilter`.
//!
//! # Configuration
//!
//! - `observability.logging.level`: default level for this crate's targets
//! - `observability.logging.format`: `json` (default) or `pretty`
//! - `RUST_LOG`: overrides the configured level when set
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_engine::telemetry::init_logging;
//!
//! let config = order_engine::config::load_config(None)?;
//! init_logging(&config.observability.logging)?;
//! ```

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Logging initialization errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level directive does not parse.
    #[error("Invalid log level '{level}': {message}")]
    InvalidLevel {
        /// Configured level.
        level: String,
        /// Parser message.
        message: String,
    },

    /// A global subscriber is already installed.
    #[error("Failed to install log subscriber: {0}")]
    Init(String),
}

/// Build the filter: `RUST_LOG` if set, else `order_engine=<level>`.
///
/// # Errors
///
/// Returns `InvalidLevel` if the configured level does not parse.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let directive = format!("order_engine={}", config.level.trim());
    EnvFilter::try_new(&directive).map_err(|e| TelemetryError::InvalidLevel {
        level: config.level.clone(),
        message: e.to_string(),
    })
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the level is invalid or a subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(config)?;

    let result = if config.format == "pretty" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(false);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    };

    result.map_err(|e| TelemetryError::Init(e.to_string()))
}
