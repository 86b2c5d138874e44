//! Structured logging setup.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};
use tribunal_error::{ConfigError, TribunalResult};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Log level filter used when `RUST_LOG` is unset (e.g. "info", "tribunal=debug")
    pub log_level: String,
    /// Enable JSON-formatted logs for production
    pub json_logs: bool,
    /// Service name stamped on the startup record
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            service_name: "tribunal".to_string(),
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Returns a configuration error if the level is not a valid filter or a
/// subscriber is already installed.
pub fn init_observability(config: &ObservabilityConfig) -> TribunalResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| {
            ConfigError::new(format!("Invalid log filter '{}': {}", config.log_level, e))
        })?;

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install subscriber: {}", e)))?;

    tracing::info!(
        service = %config.service_name,
        version = env!("CARGO_PKG_VERSION"),
        json = config.json_logs,
        "Observability initialized"
    );
    Ok(())
}
