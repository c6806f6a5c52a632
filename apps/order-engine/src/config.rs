//! Configuration module for the order engine.
//!
//! Loads a YAML file, interpolates environment variables and validates the
//! result. Every section has defaults, so an empty file (or no file at all)
//! yields a working configuration.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_engine::config::{Config, load_config};
//!
//! // Load from $ORDER_ENGINE_CONFIG, falling back to config.yaml
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("price scale: {}", config.engine.price_scale);
//! ```
//!
//! # Example
//!
//! ```yaml
//! engine:
//!   max_order_quantity: ${MAX_ORDER_QTY:-1000000}
//!   price_scale: 8
//! observability:
//!   logging:
//!     level: debug
//!     format: pretty
//! journal:
//!   path: /var/lib/order-engine/journal.jsonl
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::order_execution::DEFAULT_MAX_ORDER_QUANTITY;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "ORDER_ENGINE_CONFIG";

/// Config file used when neither an argument nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Largest scale a `Decimal` can carry.
const MAX_PRICE_SCALE: u32 = 28;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Engine limits and precision.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Journal configuration.
    #[serde(default)]
    pub journal: JournalConfig,
}

/// Engine limits and precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Largest quantity a single order may request.
    #[serde(default = "default_max_order_quantity")]
    pub max_order_quantity: Decimal,
    /// Decimal places kept on prices in API views.
    #[serde(default = "default_price_scale")]
    pub price_scale: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_order_quantity: default_max_order_quantity(),
            price_scale: default_price_scale(),
        }
    }
}

const fn default_max_order_quantity() -> Decimal {
    DEFAULT_MAX_ORDER_QUANTITY
}
const fn default_price_scale() -> u32 {
    8
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ObservabilityConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format, `json` or `pretty`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

/// Journal configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct JournalConfig {
    /// Journal replayed when none is given on the command line.
    #[serde(default)]
    pub path: Option<String>,
}

// ============================================
// Configuration Loading
// ============================================

/// Resolve the config file path: the argument, else `$ORDER_ENGINE_CONFIG`,
/// else `config.yaml`.
#[must_use]
pub fn config_path(path: Option<&str>) -> String {
    path.map(str::to_string)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.is_empty()))
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Load configuration from a YAML file with environment variable interpolation.
///
/// A file that does not exist yields the defaults.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. See [`config_path`].
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = config_path(path);

    if !Path::new(&path).exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    if interpolated.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.engine.max_order_quantity <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "engine.max_order_quantity must be positive".to_string(),
        ));
    }

    if config.engine.price_scale > MAX_PRICE_SCALE {
        return Err(ConfigError::ValidationError(format!(
            "engine.price_scale must be at most {MAX_PRICE_SCALE}"
        )));
    }

    let valid_formats = ["json", "pretty"];
    if !valid_formats.contains(&config.observability.logging.format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    if config.observability.logging.level.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "observability.logging.level cannot be empty".to_string(),
        ));
    }

    if config
        .journal
        .path
        .as_deref()
        .is_some_and(|p| p.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "journal.path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}
