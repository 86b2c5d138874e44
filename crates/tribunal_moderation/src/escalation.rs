//! Warning-count escalation.

use std::sync::Arc;
use tracing::{debug, info, instrument};
use tribunal_core::{GuildId, Infraction, InfractionKind, UserId, WarningEscalationRule};
use tribunal_error::{ModerationError, ModerationErrorKind, ModerationResult};
use tribunal_interface::ModerationStore;

/// Decides whether a freshly persisted warning crosses a configured threshold.
///
/// The engine only decides; [`crate::InfractionLifecycle`] applies the
/// punishment while it still holds the receiver's lock.
///
/// Thresholds match on exact equality with the active-warning count, and
/// each threshold fires at most once per member: a fired threshold is
/// recorded in the store and skipped when revocations bring the count back to
/// it. A threshold the count jumped past is never fired later.
#[derive(Clone)]
pub struct EscalationEngine {
    store: Arc<dyn ModerationStore>,
}

impl std::fmt::Debug for EscalationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscalationEngine").finish_non_exhaustive()
    }
}

impl EscalationEngine {
    /// Create an engine over a store.
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    /// Rule triggered by `warning`, if any.
    ///
    /// A rule that already fired for this member is not returned again.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `warning` is not a warning, or a storage
    /// error if the count or rule lookup fails.
    #[instrument(
        skip(self, warning),
        fields(
            warning_id = %warning.id,
            guild_id = %warning.guild_id,
            receiver_id = %warning.receiver_id
        )
    )]
    pub async fn evaluate(
        &self,
        warning: &Infraction,
    ) -> ModerationResult<Option<WarningEscalationRule>> {
        if warning.kind != InfractionKind::Warning {
            return Err(ModerationError::new(ModerationErrorKind::Validation(format!(
                "Infraction {} is a {}, not a warning",
                warning.id,
                warning.infraction_type()
            ))));
        }

        let active = self
            .store
            .count_active_warnings(warning.guild_id, warning.receiver_id)
            .await?;
        let rule = self
            .store
            .get_escalation_rule(warning.guild_id, active)
            .await?;

        let Some(rule) = rule else {
            debug!(active_warnings = active, "No escalation rule at this count");
            return Ok(None);
        };
        if self
            .store
            .has_escalation_fired(warning.guild_id, warning.receiver_id, active)
            .await?
        {
            info!(active_warnings = active, "Threshold already fired for this member");
            return Ok(None);
        }

        info!(
            active_warnings = active,
            punishment = %rule.punishment,
            "Warning threshold reached"
        );
        Ok(Some(rule))
    }

    /// Mark `rule` as fired for the warning's receiver.
    ///
    /// Returns `false` if it had already been marked.
    pub async fn record(
        &self,
        warning: &Infraction,
        rule: &WarningEscalationRule,
    ) -> ModerationResult<bool> {
        self.store
            .record_escalation(
                warning.guild_id,
                warning.receiver_id,
                rule.warning_count,
                warning.id,
            )
            .await
    }

    /// Whether the threshold already fired for a member.
    pub async fn has_fired(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        warning_count: u32,
    ) -> ModerationResult<bool> {
        self.store
            .has_escalation_fired(guild_id, receiver_id, warning_count)
            .await
    }

    /// Create or replace the rule for a threshold.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed rule.
    #[instrument(
        skip(self, rule),
        fields(
            guild_id = %rule.guild_id,
            warning_count = rule.warning_count,
            punishment = %rule.punishment
        )
    )]
    pub async fn set_rule(&self, rule: WarningEscalationRule) -> ModerationResult<()> {
        rule.validate()?;
        self.store.set_escalation_rule(rule).await?;
        info!("Escalation rule saved");
        Ok(())
    }

    /// Delete the rule for a threshold.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if no rule exists at that count.
    #[instrument(skip(self))]
    pub async fn remove_rule(&self, guild_id: GuildId, warning_count: u32) -> ModerationResult<()> {
        self.store
            .remove_escalation_rule(guild_id, warning_count)
            .await?;
        info!("Escalation rule removed");
        Ok(())
    }

    /// All rules for a guild, by ascending threshold.
    pub async fn rules(&self, guild_id: GuildId) -> ModerationResult<Vec<WarningEscalationRule>> {
        self.store.list_escalation_rules(guild_id).await
    }
}
