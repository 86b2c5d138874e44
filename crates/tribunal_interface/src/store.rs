//! Persistent store for moderation state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tribunal_core::{
    GuildId, GuildSettings, Infraction, InfractionId, NewInfraction, NewPermissionRule,
    PermissionRule, Revoker, RuleId, UserId, WarningEscalationRule,
};
use tribunal_error::ModerationResult;

/// Persistence for permission rules, infractions, escalation rules and guild settings.
///
/// Implementations must give read-after-write consistency within the process
/// and assign infraction and rule ids monotonically, never reusing one.
/// Failures to reach the backing store are reported as storage errors.
#[async_trait]
pub trait ModerationStore: Send + Sync {
    // Permission rules

    /// Persist a validated rule and return it with its assigned id.
    async fn add_permission_rule(
        &self,
        rule: NewPermissionRule,
    ) -> ModerationResult<PermissionRule>;

    /// Delete a rule.
    ///
    /// # Errors
    ///
    /// Not-found if the guild has no rule with this id.
    async fn remove_permission_rule(&self, guild_id: GuildId, rule_id: RuleId)
    -> ModerationResult<()>;

    /// All rules for a guild, in ascending id order.
    async fn list_permission_rules(&self, guild_id: GuildId)
    -> ModerationResult<Vec<PermissionRule>>;

    // Infractions

    /// Persist an infraction and return it with its assigned id.
    async fn insert_infraction(&self, infraction: NewInfraction) -> ModerationResult<Infraction>;

    /// Fetch an infraction by id.
    async fn get_infraction(&self, id: InfractionId) -> ModerationResult<Option<Infraction>>;

    /// Physically remove an infraction. Used only to roll back an issuance
    /// whose platform action failed.
    async fn delete_infraction(&self, id: InfractionId) -> ModerationResult<()>;

    /// Set the revoke fields of an unrevoked infraction.
    ///
    /// # Errors
    ///
    /// Conflict if the infraction is already revoked; not-found if it does not exist.
    async fn mark_revoked(
        &self,
        id: InfractionId,
        revoker: Revoker,
        revoked_at: DateTime<Utc>,
    ) -> ModerationResult<Infraction>;

    /// Set the appeal fields of an unappealed infraction.
    ///
    /// # Errors
    ///
    /// Conflict if the infraction is already appealed; not-found if it does not exist.
    async fn mark_appealed(
        &self,
        id: InfractionId,
        message: &str,
        appealed_at: DateTime<Utc>,
    ) -> ModerationResult<Infraction>;

    /// Undo [`mark_appealed`](Self::mark_appealed). Used only to roll back an
    /// appeal whose delivery failed.
    ///
    /// # Errors
    ///
    /// Not-found if the infraction does not exist.
    async fn clear_appeal(&self, id: InfractionId) -> ModerationResult<()>;

    /// Infraction history of a member in a guild, in ascending id order.
    async fn list_infractions(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        include_revoked: bool,
    ) -> ModerationResult<Vec<Infraction>>;

    /// Number of unrevoked warnings held by a member.
    async fn count_active_warnings(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
    ) -> ModerationResult<u32>;

    /// The member's unrevoked, unexpired mute, if any.
    async fn find_active_mute(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        now: DateTime<Utc>,
    ) -> ModerationResult<Option<Infraction>>;

    /// Every unrevoked time-bound infraction whose duration has elapsed at `now`.
    async fn list_expired(&self, now: DateTime<Utc>) -> ModerationResult<Vec<Infraction>>;

    // Escalation rules

    /// Insert or replace the rule for `(guild_id, warning_count)`.
    async fn set_escalation_rule(&self, rule: WarningEscalationRule) -> ModerationResult<()>;

    /// Delete the rule for a threshold.
    ///
    /// # Errors
    ///
    /// Not-found if no rule exists at this threshold.
    async fn remove_escalation_rule(
        &self,
        guild_id: GuildId,
        warning_count: u32,
    ) -> ModerationResult<()>;

    /// The rule at an exact threshold, if any.
    async fn get_escalation_rule(
        &self,
        guild_id: GuildId,
        warning_count: u32,
    ) -> ModerationResult<Option<WarningEscalationRule>>;

    /// All rules for a guild, ascending by threshold.
    async fn list_escalation_rules(
        &self,
        guild_id: GuildId,
    ) -> ModerationResult<Vec<WarningEscalationRule>>;

    // Escalation history

    /// Remember that a threshold fired for a member, citing the warning that
    /// reached it.
    ///
    /// Returns `false` if the threshold was already recorded for the member.
    async fn record_escalation(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        warning_count: u32,
        warning_id: InfractionId,
    ) -> ModerationResult<bool>;

    /// Whether a threshold already fired for a member.
    async fn has_escalation_fired(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        warning_count: u32,
    ) -> ModerationResult<bool>;

    // Guild settings

    /// Settings for a guild; unconfigured guilds get empty settings.
    async fn get_guild_settings(&self, guild_id: GuildId) -> ModerationResult<GuildSettings>;

    /// Insert or replace the settings for a guild.
    async fn save_guild_settings(&self, settings: GuildSettings) -> ModerationResult<()>;
}
