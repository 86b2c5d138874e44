//! Infraction lifecycle engine for Tribunal.
//!
//! - [`InfractionLifecycle`] issues, appeals, revokes and expires infractions,
//!   serializing every mutation per `(guild, receiver)` through [`KeyedLocks`].
//! - [`EscalationEngine`] decides whether a new warning reaches a configured
//!   threshold; the lifecycle applies the punishment.
//! - [`ExpiryReconciler`] sweeps elapsed mutes on a timer.
//! - [`ModerationAdmin`] manages permission rules and guild settings.
//!
//! [`InMemoryModerationStore`] and [`TracingNotifier`] are ready-made
//! collaborators for tests and single-process setups.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod admin;
mod config;
mod escalation;
mod hierarchy;
mod lifecycle;
mod locks;
mod memory;
mod notifier;
mod reconciler;

pub use admin::ModerationAdmin;
pub use config::LifecycleConfig;
pub use escalation::EscalationEngine;
pub use lifecycle::{EscalationOutcome, InfractionLifecycle, Punishment, WarningOutcome};
pub use locks::{KeyedLocks, MemberKey};
pub use memory::InMemoryModerationStore;
pub use notifier::TracingNotifier;
pub use reconciler::{ExpiryReconciler, Housekeeping, PassReport, ReconcilerHandle};
