//! Infractions: recorded moderation actions against a member.

use crate::{GuildId, InfractionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tribunal_error::{ModerationError, ModerationErrorKind, ModerationResult};

/// Mutes at or below this duration cannot be appealed.
pub const APPEALABLE_MUTE_THRESHOLD: Duration = Duration::from_secs(24 * 60 * 60);

/// Variant payload of an infraction.
///
/// Serialized with an explicit `type` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InfractionKind {
    /// A recorded warning
    Warning,
    /// A mute; `None` duration means permanent
    Mute {
        /// How long the mute lasts
        #[serde(default)]
        duration: Option<Duration>,
    },
    /// A ban
    Ban,
    /// A ban immediately followed by an unban
    Softban,
    /// Removal from the guild
    Kick,
}

impl InfractionKind {
    /// The fieldless discriminator of this variant.
    pub fn infraction_type(&self) -> InfractionType {
        match self {
            InfractionKind::Warning => InfractionType::Warning,
            InfractionKind::Mute { .. } => InfractionType::Mute,
            InfractionKind::Ban => InfractionType::Ban,
            InfractionKind::Softban => InfractionType::Softban,
            InfractionKind::Kick => InfractionType::Kick,
        }
    }

    /// Time-bound duration, if this variant carries one.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            InfractionKind::Mute { duration } => *duration,
            InfractionKind::Warning
            | InfractionKind::Ban
            | InfractionKind::Softban
            | InfractionKind::Kick => None,
        }
    }
}

/// Check a finite mute length.
///
/// Mutes are stored with second precision, so the length must be a positive
/// whole number of seconds.
///
/// # Errors
///
/// Returns a validation error for a zero, sub-second or fractional length.
pub fn validate_mute_duration(duration: Duration) -> ModerationResult<()> {
    if duration.as_secs() == 0 || duration.subsec_nanos() != 0 {
        return Err(ModerationError::new(ModerationErrorKind::Validation(format!(
            "Mute duration must be a positive whole number of seconds, got {:?}",
            duration
        ))));
    }
    Ok(())
}

/// Discriminator for infraction variants, as stored in the `infraction_type` column.
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
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InfractionType {
    /// Warning
    Warning,
    /// Mute
    Mute,
    /// Ban
    Ban,
    /// Softban
    Softban,
    /// Kick
    Kick,
}

/// Who revoked an infraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Revoker {
    /// A human moderator
    Moderator(UserId),
    /// The expiry reconciler
    System,
}

impl fmt::Display for Revoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revoker::Moderator(user_id) => write!(f, "{}", user_id),
            Revoker::System => f.write_str("system"),
        }
    }
}

impl FromStr for Revoker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "system" {
            return Ok(Revoker::System);
        }
        s.parse::<u64>()
            .map(|id| Revoker::Moderator(UserId(id)))
            .map_err(|_| format!("Invalid revoker '{}'", s))
    }
}

impl From<Revoker> for String {
    fn from(revoker: Revoker) -> Self {
        revoker.to_string()
    }
}

impl TryFrom<String> for Revoker {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A recorded moderation action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infraction {
    /// Store-assigned id, monotonic and never reused
    pub id: InfractionId,
    /// Guild the infraction was issued in
    pub guild_id: GuildId,
    /// Member the infraction targets
    pub receiver_id: UserId,
    /// Moderator who issued it
    pub issuer_id: UserId,
    /// Free-text reason
    pub reason: String,
    /// Issue time
    pub issued_at: DateTime<Utc>,
    /// Whether the infraction has been revoked
    pub revoked: bool,
    /// Who revoked it
    pub revoked_by: Option<Revoker>,
    /// When it was revoked
    pub revoked_at: Option<DateTime<Utc>>,
    /// When it was appealed
    pub appealed_at: Option<DateTime<Utc>>,
    /// Appeal text
    pub appeal_message: Option<String>,
    /// Variant payload
    #[serde(flatten)]
    pub kind: InfractionKind,
}

impl Infraction {
    /// The fieldless discriminator of this infraction.
    pub fn infraction_type(&self) -> InfractionType {
        self.kind.infraction_type()
    }

    /// When a time-bound infraction lapses. `None` for permanent or untimed infractions.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let duration = self.kind.duration()?;
        let duration = chrono::Duration::from_std(duration).ok()?;
        self.issued_at.checked_add_signed(duration)
    }

    /// Whether the infraction's duration has elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| now > expires_at)
    }

    /// Not revoked and not expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired(now)
    }

    /// Whether the infraction has already been appealed.
    pub fn is_appealed(&self) -> bool {
        self.appealed_at.is_some()
    }

    /// Whether this infraction type and duration admit an appeal.
    ///
    /// A mute is appealable only when permanent or longer than `mute_threshold`.
    /// Transient actions (softban, kick) are never appealable.
    pub fn is_appealable(&self, mute_threshold: Duration) -> bool {
        match &self.kind {
            InfractionKind::Warning | InfractionKind::Ban => true,
            InfractionKind::Mute { duration: None } => true,
            InfractionKind::Mute {
                duration: Some(duration),
            } => *duration > mute_threshold,
            InfractionKind::Softban | InfractionKind::Kick => false,
        }
    }
}

/// An infraction before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInfraction {
    /// Guild the infraction is issued in
    pub guild_id: GuildId,
    /// Member the infraction targets
    pub receiver_id: UserId,
    /// Moderator issuing it
    pub issuer_id: UserId,
    /// Free-text reason
    pub reason: String,
    /// Issue time
    pub issued_at: DateTime<Utc>,
    /// Variant payload
    pub kind: InfractionKind,
}

impl NewInfraction {
    /// Attach a store-assigned id, producing a fresh unrevoked, unappealed infraction.
    pub fn with_id(self, id: InfractionId) -> Infraction {
        Infraction {
            id,
            guild_id: self.guild_id,
            receiver_id: self.receiver_id,
            issuer_id: self.issuer_id,
            reason: self.reason,
            issued_at: self.issued_at,
            revoked: false,
            revoked_by: None,
            revoked_at: None,
            appealed_at: None,
            appeal_message: None,
            kind: self.kind,
        }
    }
}
