//! Tribunal: a guild moderation engine.
//!
//! Tribunal decides who may invoke moderation commands, records infractions
//! (warnings, mutes, bans) and transient actions (softbans, kicks), escalates
//! repeated warnings, and revokes mutes when they lapse.
//!
//! # Crates
//!
//! - `tribunal_core` - identifiers, infractions, permission rules, events
//! - `tribunal_security` - permission resolution, rate limiting, command guards
//! - `tribunal_moderation` - infraction lifecycle, escalation, expiry sweep
//! - `tribunal_database` - PostgreSQL store (feature `database`)
//! - `tribunal_social` - Discord gateway (feature `discord`) and log-channel notifier
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tribunal::{InMemoryModerationStore, ModerationRuntime, TracingNotifier, TribunalConfig};
//!
//! let config = TribunalConfig::load()?;
//! let runtime = ModerationRuntime::new(
//!     config,
//!     Arc::new(InMemoryModerationStore::new()),
//!     gateway,
//!     Arc::new(TracingNotifier::new()),
//! );
//! runtime.authorize(&actor, &CommandRef::new("warn")).await?;
//! runtime.lifecycle().issue_warning(guild_id, receiver_id, actor_id, "spam").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod observability;
mod runtime;

pub use config::{
    AppealSettings, LoggingSettings, NotificationSettings, RateLimitSettings, ReconcilerSettings,
    TribunalConfig,
};
pub use observability::{ObservabilityConfig, init_observability};
pub use runtime::ModerationRuntime;

// Re-export error types
pub use tribunal_error::{
    ConfigError, GatewayError, GatewayErrorKind, GatewayResult, ModerationError,
    ModerationErrorKind, ModerationResult, TribunalError, TribunalErrorKind, TribunalResult,
};

#[cfg(feature = "database")]
pub use tribunal_error::{DatabaseError, DatabaseErrorKind};

// Re-export core types
pub use tribunal_core::*;

// Re-export collaborator traits
pub use tribunal_interface::{ChatGateway, ModerationNotifier, ModerationStore};

// Re-export policy
pub use tribunal_security::{
    CommandCheck, CommandGuard, CommandRegistry, Decision, Invocation, PermissionCheck,
    PermissionResolver, RateLimit, RateLimitCheck, RateLimiter, Resolution, Verdict,
};

// Re-export lifecycle
pub use tribunal_moderation::{
    EscalationEngine, EscalationOutcome, ExpiryReconciler, InMemoryModerationStore,
    InfractionLifecycle, LifecycleConfig, ModerationAdmin, PassReport, Punishment,
    ReconcilerHandle, TracingNotifier, WarningOutcome,
};

// Re-export integrations
pub use tribunal_social::LogChannelNotifier;

#[cfg(feature = "discord")]
pub use tribunal_social::SerenityGateway;

#[cfg(feature = "database")]
pub use tribunal_database::{PostgresModerationStore, run_migrations};
