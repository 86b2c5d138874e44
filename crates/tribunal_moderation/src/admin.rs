//! Rule and settings administration.

use std::sync::Arc;
use tracing::{info, instrument};
use tribunal_core::{GuildId, GuildSettings, NewPermissionRule, PermissionRule, RuleId};
use tribunal_error::ModerationResult;
use tribunal_interface::ModerationStore;

/// Administrative operations on a guild's permission rules and settings.
#[derive(Clone)]
pub struct ModerationAdmin {
    store: Arc<dyn ModerationStore>,
}

impl std::fmt::Debug for ModerationAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModerationAdmin").finish_non_exhaustive()
    }
}

impl ModerationAdmin {
    /// Create over a store.
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a permission rule.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank command name or a missing target.
    #[instrument(
        skip(self, rule),
        fields(
            guild_id = %rule.guild_id,
            scope = %rule.scope,
            command = %rule.command_or_module
        )
    )]
    pub async fn add_permission_rule(
        &self,
        rule: NewPermissionRule,
    ) -> ModerationResult<PermissionRule> {
        let rule = rule.validate()?;
        let stored = self.store.add_permission_rule(rule).await?;
        info!(rule_id = %stored.id, effect = %stored.effect, "Permission rule added");
        Ok(stored)
    }

    /// Delete a permission rule.
    #[instrument(skip(self))]
    pub async fn remove_permission_rule(
        &self,
        guild_id: GuildId,
        rule_id: RuleId,
    ) -> ModerationResult<()> {
        self.store.remove_permission_rule(guild_id, rule_id).await?;
        info!("Permission rule removed");
        Ok(())
    }

    /// All rules for a guild, oldest first.
    pub async fn permission_rules(
        &self,
        guild_id: GuildId,
    ) -> ModerationResult<Vec<PermissionRule>> {
        self.store.list_permission_rules(guild_id).await
    }

    /// Current settings, empty if never saved.
    pub async fn settings(&self, guild_id: GuildId) -> ModerationResult<GuildSettings> {
        self.store.get_guild_settings(guild_id).await
    }

    /// Replace a guild's settings.
    #[instrument(skip(self, settings), fields(guild_id = %settings.guild_id))]
    pub async fn save_settings(&self, settings: GuildSettings) -> ModerationResult<()> {
        self.store.save_guild_settings(settings).await?;
        info!("Guild settings saved");
        Ok(())
    }
}
