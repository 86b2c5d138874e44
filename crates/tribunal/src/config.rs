//! Layered TOML configuration.
//!
//! Sources, later overriding earlier:
//! 1. Bundled defaults (`tribunal.toml` compiled into the crate)
//! 2. `~/.config/tribunal/tribunal.toml`
//! 3. `./tribunal.toml`
//! 4. `TRIBUNAL_<SECTION>__<KEY>` environment variables
//!
//! Missing files are skipped; missing keys keep their defaults.

use crate::ObservabilityConfig;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};
use tribunal_error::{ConfigError, TribunalResult};
use tribunal_moderation::LifecycleConfig;
use tribunal_security::RateLimit;

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../tribunal.toml");

/// Longest accepted sweep interval, in seconds.
const MAX_INTERVAL_SECS: u64 = 3600;

/// `[reconciler]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconcilerSettings {
    /// Seconds between expiry sweeps
    pub interval_secs: u64,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

/// `[rate_limit]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Commands allowed per window
    pub limit: u32,
    /// Window length in seconds
    pub period_secs: u64,
    /// Administrators are never limited
    pub bypass_administrators: bool,
    /// Direct-message commands are never limited
    pub bypass_private: bool,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            limit: 3,
            period_secs: 60,
            bypass_administrators: true,
            bypass_private: true,
        }
    }
}

/// `[appeal]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppealSettings {
    /// Longest accepted appeal message, in characters
    pub max_message_length: usize,
    /// Mutes must be longer than this many seconds (or permanent) to be appealable
    pub min_mute_duration_secs: u64,
}

impl Default for AppealSettings {
    fn default() -> Self {
        Self {
            max_message_length: 1000,
            min_mute_duration_secs: 24 * 60 * 60,
        }
    }
}

/// `[notifications]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Message receivers about actions taken against them
    pub direct_message_receivers: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            direct_message_receivers: true,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level Tribunal configuration.
///
/// # Example
///
/// ```no_run
/// use tribunal::TribunalConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TribunalConfig::load()?;
/// println!("Sweeping every {:?}", config.reconciler_interval());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TribunalConfig {
    /// Expiry sweep settings
    pub reconciler: ReconcilerSettings,
    /// Command rate limiting
    pub rate_limit: RateLimitSettings,
    /// Appeal acceptance
    pub appeal: AppealSettings,
    /// Receiver notifications
    pub notifications: NotificationSettings,
    /// Log output
    pub logging: LoggingSettings,
}

fn build(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> TribunalResult<TribunalConfig> {
    let config: TribunalConfig = builder
        .build()
        .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
        .try_deserialize()
        .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
    config.validate()?;
    Ok(config)
}

impl TribunalConfig {
    /// Load with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a present source cannot be parsed or
    /// the merged values fail [`validate`](Self::validate).
    #[instrument]
    pub fn load() -> TribunalResult<Self> {
        debug!("Loading configuration: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/tribunal/tribunal.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("tribunal").required(false))
            .add_source(
                Environment::with_prefix("TRIBUNAL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        build(builder)
    }

    /// Load bundled defaults overridden by a single file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file is missing, malformed or invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> TribunalResult<Self> {
        debug!("Loading configuration from file");
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()).required(true));
        build(builder)
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reconciler.interval_secs == 0 || self.reconciler.interval_secs > MAX_INTERVAL_SECS {
            return Err(ConfigError::new(format!(
                "reconciler.interval_secs must be between 1 and {}, got {}",
                MAX_INTERVAL_SECS, self.reconciler.interval_secs
            )));
        }
        if self.rate_limit.limit == 0 {
            return Err(ConfigError::new("rate_limit.limit must be at least 1"));
        }
        if self.rate_limit.period_secs == 0 {
            return Err(ConfigError::new("rate_limit.period_secs must be at least 1"));
        }
        if self.appeal.max_message_length == 0 {
            return Err(ConfigError::new("appeal.max_message_length must be at least 1"));
        }
        Ok(())
    }

    /// Time between expiry sweeps.
    pub fn reconciler_interval(&self) -> Duration {
        Duration::from_secs(self.reconciler.interval_secs)
    }

    /// Per-member command limit.
    pub fn rate_limit(&self) -> RateLimit {
        RateLimit::per_secs(self.rate_limit.limit, self.rate_limit.period_secs)
    }

    /// Lifecycle knobs derived from the appeal and notification sections.
    pub fn lifecycle(&self) -> LifecycleConfig {
        LifecycleConfig::default()
            .with_appeal_threshold(Duration::from_secs(self.appeal.min_mute_duration_secs))
            .with_max_appeal_length(self.appeal.max_message_length)
            .with_direct_message_receivers(self.notifications.direct_message_receivers)
    }

    /// Logging setup derived from the logging section.
    pub fn observability(&self) -> ObservabilityConfig {
        ObservabilityConfig {
            log_level: self.logging.level.clone(),
            json_logs: self.logging.json,
            ..ObservabilityConfig::default()
        }
    }
}
