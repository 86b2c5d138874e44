//! Core data types for the Tribunal moderation engine.
//!
//! This crate holds the vocabulary shared by every other Tribunal crate:
//! snowflake identifiers, member ranks, permission rules, the infraction
//! sum type, warning escalation rules and the events emitted when moderation
//! state changes. It performs no I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod actor;
mod escalation;
mod event;
mod ids;
mod infraction;
mod permission;
mod rank;
mod settings;

pub use actor::{ActorContext, ActorContextBuilder, CommandRef};
pub use escalation::{PunishmentType, WarningEscalationRule};
pub use event::{ModerationEvent, TransientAction, TransientKind};
pub use ids::{ChannelId, GuildId, InfractionId, RoleId, RuleId, UserId};
pub use infraction::{
    APPEALABLE_MUTE_THRESHOLD, Infraction, InfractionKind, InfractionType, NewInfraction, Revoker,
    validate_mute_duration,
};
pub use permission::{NewPermissionRule, PermissionRule, RuleEffect, RuleScope};
pub use rank::Rank;
pub use settings::GuildSettings;
