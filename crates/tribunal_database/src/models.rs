//! Diesel row types and their conversions to domain types.
//!
//! Snowflakes are stored in `BIGINT` columns by reinterpreting the bits of the
//! `u64`; platform ids never reach the sign bit in practice.

use crate::schema::{
    escalation_history, escalation_rules, guild_settings, infractions, permission_rules,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::time::Duration;
use tribunal_core::{
    ChannelId, GuildId, GuildSettings, Infraction, InfractionId, InfractionKind, InfractionType,
    NewInfraction, NewPermissionRule, PermissionRule, PunishmentType, RoleId, RuleId, UserId,
    WarningEscalationRule,
};
use tribunal_error::{DatabaseError, DatabaseErrorKind};

pub(crate) fn to_column(id: u64) -> i64 {
    id as i64
}

pub(crate) fn from_column(value: i64) -> u64 {
    value as u64
}

fn corrupt(message: String) -> DatabaseError {
    DatabaseError::new(DatabaseErrorKind::CorruptRow(message))
}

pub(crate) fn threshold_to_column(warning_count: u32) -> i32 {
    i32::try_from(warning_count).unwrap_or(i32::MAX)
}

fn duration_to_column(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

fn duration_from_column(secs: i64) -> Result<Duration, DatabaseError> {
    u64::try_from(secs)
        .map(Duration::from_secs)
        .map_err(|_| corrupt(format!("Negative duration {}", secs)))
}

// Permission rules

/// A row of `permission_rules`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = permission_rules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PermissionRuleRow {
    pub id: i64,
    pub guild_id: i64,
    pub scope: String,
    pub target_id: Option<i64>,
    pub command_or_module: String,
    pub effect: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable form of a permission rule.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = permission_rules)]
pub struct NewPermissionRuleRow {
    pub guild_id: i64,
    pub scope: String,
    pub target_id: Option<i64>,
    pub command_or_module: String,
    pub effect: String,
}

impl From<NewPermissionRule> for NewPermissionRuleRow {
    fn from(rule: NewPermissionRule) -> Self {
        Self {
            guild_id: to_column(rule.guild_id.get()),
            scope: rule.scope.to_string(),
            target_id: rule.target_id.map(to_column),
            command_or_module: rule.command_or_module,
            effect: rule.effect.to_string(),
        }
    }
}

impl TryFrom<PermissionRuleRow> for PermissionRule {
    type Error = DatabaseError;

    fn try_from(row: PermissionRuleRow) -> Result<Self, Self::Error> {
        Ok(PermissionRule {
            id: RuleId(row.id),
            guild_id: GuildId(from_column(row.guild_id)),
            scope: row
                .scope
                .parse()
                .map_err(|_| corrupt(format!("Unknown rule scope '{}'", row.scope)))?,
            target_id: row.target_id.map(from_column),
            command_or_module: row.command_or_module,
            effect: row
                .effect
                .parse()
                .map_err(|_| corrupt(format!("Unknown rule effect '{}'", row.effect)))?,
        })
    }
}

// Infractions

/// A row of `infractions`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = infractions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InfractionRow {
    pub id: i64,
    pub guild_id: i64,
    pub receiver_id: i64,
    pub issuer_id: i64,
    pub infraction_type: String,
    pub reason: String,
    pub issued_at: DateTime<Utc>,
    pub duration_secs: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub revoked: bool,
    pub revoked_by: Option<String>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub appealed_at: Option<DateTime<Utc>>,
    pub appeal_message: Option<String>,
}

/// Insertable form of an infraction.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = infractions)]
pub struct NewInfractionRow {
    pub guild_id: i64,
    pub receiver_id: i64,
    pub issuer_id: i64,
    pub infraction_type: String,
    pub reason: String,
    pub issued_at: DateTime<Utc>,
    pub duration_secs: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<NewInfraction> for NewInfractionRow {
    fn from(infraction: NewInfraction) -> Self {
        let duration = infraction.kind.duration();
        let expires_at = duration
            .and_then(|duration| chrono::Duration::from_std(duration).ok())
            .and_then(|duration| infraction.issued_at.checked_add_signed(duration));
        Self {
            guild_id: to_column(infraction.guild_id.get()),
            receiver_id: to_column(infraction.receiver_id.get()),
            issuer_id: to_column(infraction.issuer_id.get()),
            infraction_type: infraction.kind.infraction_type().to_string(),
            reason: infraction.reason,
            issued_at: infraction.issued_at,
            duration_secs: duration.map(duration_to_column),
            expires_at,
        }
    }
}

impl TryFrom<InfractionRow> for Infraction {
    type Error = DatabaseError;

    fn try_from(row: InfractionRow) -> Result<Self, Self::Error> {
        let infraction_type: InfractionType = row
            .infraction_type
            .parse()
            .map_err(|_| corrupt(format!("Unknown infraction type '{}'", row.infraction_type)))?;
        let kind = match infraction_type {
            InfractionType::Warning => InfractionKind::Warning,
            InfractionType::Mute => InfractionKind::Mute {
                duration: row.duration_secs.map(duration_from_column).transpose()?,
            },
            InfractionType::Ban => InfractionKind::Ban,
            InfractionType::Softban => InfractionKind::Softban,
            InfractionType::Kick => InfractionKind::Kick,
        };
        let revoked_by = row
            .revoked_by
            .map(|revoker| revoker.parse().map_err(corrupt))
            .transpose()?;

        Ok(Infraction {
            id: InfractionId(row.id),
            guild_id: GuildId(from_column(row.guild_id)),
            receiver_id: UserId(from_column(row.receiver_id)),
            issuer_id: UserId(from_column(row.issuer_id)),
            reason: row.reason,
            issued_at: row.issued_at,
            revoked: row.revoked,
            revoked_by,
            revoked_at: row.revoked_at,
            appealed_at: row.appealed_at,
            appeal_message: row.appeal_message,
            kind,
        })
    }
}

// Escalation rules

/// A row of `escalation_rules`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = escalation_rules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EscalationRuleRow {
    pub guild_id: i64,
    pub warning_count: i32,
    pub punishment: String,
    pub mute_duration_secs: Option<i64>,
}

impl From<&WarningEscalationRule> for EscalationRuleRow {
    fn from(rule: &WarningEscalationRule) -> Self {
        Self {
            guild_id: to_column(rule.guild_id.get()),
            warning_count: threshold_to_column(rule.warning_count),
            punishment: rule.punishment.to_string(),
            mute_duration_secs: rule.mute_duration.map(duration_to_column),
        }
    }
}

impl TryFrom<EscalationRuleRow> for WarningEscalationRule {
    type Error = DatabaseError;

    fn try_from(row: EscalationRuleRow) -> Result<Self, Self::Error> {
        let punishment: PunishmentType = row
            .punishment
            .parse()
            .map_err(|_| corrupt(format!("Unknown punishment '{}'", row.punishment)))?;
        let warning_count = u32::try_from(row.warning_count)
            .map_err(|_| corrupt(format!("Negative warning count {}", row.warning_count)))?;
        Ok(WarningEscalationRule {
            guild_id: GuildId(from_column(row.guild_id)),
            warning_count,
            punishment,
            mute_duration: row
                .mute_duration_secs
                .map(duration_from_column)
                .transpose()?,
        })
    }
}

/// Insertable row of `escalation_history`; `fired_at` takes the column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = escalation_history)]
pub struct NewEscalationHistoryRow {
    pub guild_id: i64,
    pub receiver_id: i64,
    pub warning_count: i32,
    pub warning_id: i64,
}

impl NewEscalationHistoryRow {
    /// Row recording that `warning_id` brought the member to `warning_count`.
    pub fn new(
        guild_id: GuildId,
        receiver_id: UserId,
        warning_count: u32,
        warning_id: InfractionId,
    ) -> Self {
        Self {
            guild_id: to_column(guild_id.get()),
            receiver_id: to_column(receiver_id.get()),
            warning_count: threshold_to_column(warning_count),
            warning_id: warning_id.get(),
        }
    }
}

// Guild settings

/// A row of `guild_settings`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = guild_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GuildSettingsRow {
    pub guild_id: i64,
    pub mute_role_id: Option<i64>,
    pub log_channel_id: Option<i64>,
}

impl From<&GuildSettings> for GuildSettingsRow {
    fn from(settings: &GuildSettings) -> Self {
        Self {
            guild_id: to_column(settings.guild_id.get()),
            mute_role_id: settings.mute_role_id.map(|role| to_column(role.get())),
            log_channel_id: settings.log_channel_id.map(|channel| to_column(channel.get())),
        }
    }
}

impl From<GuildSettingsRow> for GuildSettings {
    fn from(row: GuildSettingsRow) -> Self {
        GuildSettings {
            guild_id: GuildId(from_column(row.guild_id)),
            mute_role_id: row.mute_role_id.map(|role| RoleId(from_column(role))),
            log_channel_id: row
                .log_channel_id
                .map(|channel| ChannelId(from_column(channel))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribunal_core::{Revoker, RuleEffect, RuleScope};

    fn infraction_row(infraction_type: &str, duration_secs: Option<i64>) -> InfractionRow {
        InfractionRow {
            id: 7,
            guild_id: 1,
            receiver_id: 2,
            issuer_id: 3,
            infraction_type: infraction_type.to_string(),
            reason: "spam".to_string(),
            issued_at: Utc::now(),
            duration_secs,
            expires_at: None,
            revoked: true,
            revoked_by: Some("system".to_string()),
            revoked_at: Some(Utc::now()),
            appealed_at: None,
            appeal_message: None,
        }
    }

    #[test]
    fn test_mute_row_converts() {
        let infraction = Infraction::try_from(infraction_row("mute", Some(3600))).unwrap();
        assert_eq!(
            infraction.kind,
            InfractionKind::Mute {
                duration: Some(Duration::from_secs(3600))
            }
        );
        assert_eq!(infraction.revoked_by, Some(Revoker::System));
    }

    #[test]
    fn test_unknown_type_is_corrupt() {
        let err = Infraction::try_from(infraction_row("timeout", None)).unwrap_err();
        assert!(matches!(err.kind, DatabaseErrorKind::CorruptRow(_)));
    }

    #[test]
    fn test_new_mute_row_records_expiry() {
        let issued_at = Utc::now();
        let row = NewInfractionRow::from(NewInfraction {
            guild_id: GuildId(1),
            receiver_id: UserId(2),
            issuer_id: UserId(3),
            reason: "loud".to_string(),
            issued_at,
            kind: InfractionKind::Mute {
                duration: Some(Duration::from_secs(60)),
            },
        });
        assert_eq!(row.infraction_type, "mute");
        assert_eq!(row.duration_secs, Some(60));
        assert_eq!(row.expires_at, Some(issued_at + chrono::Duration::seconds(60)));
    }

    #[test]
    fn test_large_snowflake_survives_column() {
        let id = u64::MAX - 5;
        assert_eq!(from_column(to_column(id)), id);
    }

    #[test]
    fn test_escalation_history_row_columns() {
        let row = NewEscalationHistoryRow::new(GuildId(1), UserId(u64::MAX), 3, InfractionId(12));
        assert_eq!(row.receiver_id, -1);
        assert_eq!(row.warning_count, 3);
        assert_eq!(row.warning_id, 12);
    }

    #[test]
    fn test_permission_row_converts() {
        let rule = PermissionRule::try_from(PermissionRuleRow {
            id: 4,
            guild_id: 1,
            scope: "role".to_string(),
            target_id: Some(300),
            command_or_module: "warn".to_string(),
            effect: "disable".to_string(),
            created_at: Utc::now(),
        })
        .unwrap();
        assert_eq!(rule.scope, RuleScope::Role);
        assert_eq!(rule.effect, RuleEffect::Disable);
        assert_eq!(rule.target_id, Some(300));
    }
}
