//! Collaborator traits consumed by the Tribunal moderation engine.
//!
//! The engine never talks to the chat platform or the database directly.
//! Everything outside the policy core is reached through three seams:
//!
//! - [`ChatGateway`] - platform side effects (bans, roles, messages) and member lookups
//! - [`ModerationStore`] - persistence for rules, infractions and guild settings
//! - [`ModerationNotifier`] - delivery of [`tribunal_core::ModerationEvent`]s to a log or
//!   alert sink
//!
//! All calls are fallible and may be slow; implementations are expected to
//! apply their own timeouts.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gateway;
mod notifier;
mod store;

pub use gateway::ChatGateway;
pub use notifier::ModerationNotifier;
pub use store::ModerationStore;
