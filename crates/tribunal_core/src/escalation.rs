//! Warning-count escalation rules.

use crate::{GuildId, InfractionKind, validate_mute_duration};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tribunal_error::{ModerationError, ModerationErrorKind, ModerationResult};

/// Punishment applied when a warning threshold is reached.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PunishmentType {
    /// Mute the member
    Mute,
    /// Kick the member
    Kick,
    /// Softban the member
    Softban,
    /// Ban the member
    Ban,
}

/// Automatic punishment for members reaching an exact active-warning count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningEscalationRule {
    /// Guild the rule belongs to
    pub guild_id: GuildId,
    /// Active-warning count that triggers the rule
    pub warning_count: u32,
    /// Punishment to apply
    pub punishment: PunishmentType,
    /// Mute length for mute punishments; `None` means permanent
    #[serde(default)]
    pub mute_duration: Option<Duration>,
}

impl WarningEscalationRule {
    /// Create a rule.
    pub fn new(guild_id: GuildId, warning_count: u32, punishment: PunishmentType) -> Self {
        Self {
            guild_id,
            warning_count,
            punishment,
            mute_duration: None,
        }
    }

    /// Set the mute length.
    pub fn with_mute_duration(mut self, duration: Duration) -> Self {
        self.mute_duration = Some(duration);
        self
    }

    /// Check the rule shape.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a zero threshold, a mute length that is
    /// not a positive whole number of seconds, or a mute duration attached to
    /// a non-mute punishment.
    pub fn validate(&self) -> ModerationResult<()> {
        if self.warning_count == 0 {
            return Err(ModerationError::new(ModerationErrorKind::Validation(
                "Warning threshold must be at least 1".to_string(),
            )));
        }
        match (self.punishment, self.mute_duration) {
            (PunishmentType::Mute, Some(duration)) => validate_mute_duration(duration),
            (PunishmentType::Mute, None) | (_, None) => Ok(()),
            (punishment, Some(_)) => Err(ModerationError::new(ModerationErrorKind::Validation(
                format!("A {} escalation cannot carry a mute duration", punishment),
            ))),
        }
    }

    /// Infraction payload this rule produces.
    pub fn infraction_kind(&self) -> InfractionKind {
        match self.punishment {
            PunishmentType::Mute => InfractionKind::Mute {
                duration: self.mute_duration,
            },
            PunishmentType::Kick => InfractionKind::Kick,
            PunishmentType::Softban => InfractionKind::Softban,
            PunishmentType::Ban => InfractionKind::Ban,
        }
    }
}
