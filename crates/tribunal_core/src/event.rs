//! Events emitted when moderation state changes.

use crate::{GuildId, Infraction, InfractionId, InfractionKind, UserId, WarningEscalationRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actions that touch the platform but leave no persisted infraction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransientKind {
    /// Ban immediately followed by an unban
    Softban,
    /// Removal from the guild
    Kick,
}

impl From<TransientKind> for InfractionKind {
    fn from(kind: TransientKind) -> Self {
        match kind {
            TransientKind::Softban => InfractionKind::Softban,
            TransientKind::Kick => InfractionKind::Kick,
        }
    }
}

/// Record of a performed transient action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransientAction {
    /// Softban or kick
    pub kind: TransientKind,
    /// Guild the action was taken in
    pub guild_id: GuildId,
    /// Member the action targeted
    pub receiver_id: UserId,
    /// Moderator who took it
    pub issuer_id: UserId,
    /// Free-text reason
    pub reason: String,
    /// When it happened
    pub performed_at: DateTime<Utc>,
}

/// A moderation state change, delivered to the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ModerationEvent {
    /// A warning, mute or ban was persisted
    InfractionIssued {
        /// The new infraction
        infraction: Infraction,
    },
    /// A softban or kick was performed
    TransientActionTaken {
        /// The action
        action: TransientAction,
    },
    /// A receiver appealed an infraction
    InfractionAppealed {
        /// The infraction with appeal fields set
        infraction: Infraction,
    },
    /// An infraction was revoked by a moderator or the reconciler
    InfractionRevoked {
        /// The infraction with revoke fields set
        infraction: Infraction,
    },
    /// A warning reached an escalation threshold
    EscalationTriggered {
        /// Warning that reached the threshold
        warning_id: InfractionId,
        /// Rule that matched
        rule: WarningEscalationRule,
    },
}

impl ModerationEvent {
    /// Guild the event belongs to.
    pub fn guild_id(&self) -> GuildId {
        match self {
            ModerationEvent::InfractionIssued { infraction }
            | ModerationEvent::InfractionAppealed { infraction }
            | ModerationEvent::InfractionRevoked { infraction } => infraction.guild_id,
            ModerationEvent::TransientActionTaken { action } => action.guild_id,
            ModerationEvent::EscalationTriggered { rule, .. } => rule.guild_id,
        }
    }

    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            ModerationEvent::InfractionIssued { .. } => "infraction_issued",
            ModerationEvent::TransientActionTaken { .. } => "transient_action_taken",
            ModerationEvent::InfractionAppealed { .. } => "infraction_appealed",
            ModerationEvent::InfractionRevoked { .. } => "infraction_revoked",
            ModerationEvent::EscalationTriggered { .. } => "escalation_triggered",
        }
    }
}
