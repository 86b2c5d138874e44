//! Issuing, appealing and revoking infractions.

use crate::hierarchy::{Issuer, Requirement, ensure_outranks};
use crate::{EscalationEngine, KeyedLocks, LifecycleConfig};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tribunal_core::{
    GuildId, Infraction, InfractionId, InfractionKind, ModerationEvent, NewInfraction,
    PunishmentType, Revoker, TransientAction, TransientKind, UserId, WarningEscalationRule,
    validate_mute_duration,
};
use tribunal_error::{ModerationError, ModerationErrorKind, ModerationResult};
use tribunal_interface::{ChatGateway, ModerationNotifier, ModerationStore};

/// Result of issuing a warning.
#[derive(Debug)]
pub struct WarningOutcome {
    /// The persisted warning
    pub warning: Infraction,
    /// What the escalation check did, if a rule matched or the check failed
    pub escalation: Option<EscalationOutcome>,
}

/// Punishment applied by an escalation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Punishment {
    /// A persisted mute or ban
    Infraction(Infraction),
    /// A performed kick or softban
    Transient(TransientAction),
}

/// Result of the escalation step after a warning.
///
/// The warning itself stays persisted whatever happens here.
#[derive(Debug)]
pub enum EscalationOutcome {
    /// The rule's punishment was applied
    Applied {
        /// Rule that matched
        rule: WarningEscalationRule,
        /// What was done
        punishment: Punishment,
    },
    /// The rule lookup or the punishment failed
    Failed {
        /// Rule that matched, if the lookup got that far
        rule: Option<WarningEscalationRule>,
        /// Why it failed
        error: ModerationError,
    },
}

/// The infraction state machine.
///
/// Every mutating operation holds the `(guild, receiver)` lock from its first
/// check to its last write, so two concurrent mutes for one member cannot both
/// pass the active-mute check. Platform failures abort the operation; when the
/// store write already happened it is rolled back.
#[derive(Clone)]
pub struct InfractionLifecycle {
    store: Arc<dyn ModerationStore>,
    gateway: Arc<dyn ChatGateway>,
    notifier: Arc<dyn ModerationNotifier>,
    escalation: EscalationEngine,
    locks: KeyedLocks,
    config: LifecycleConfig,
}

impl std::fmt::Debug for InfractionLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfractionLifecycle")
            .field("locks", &self.locks.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl InfractionLifecycle {
    /// Wire a lifecycle over its collaborators.
    pub fn new(
        store: Arc<dyn ModerationStore>,
        gateway: Arc<dyn ChatGateway>,
        notifier: Arc<dyn ModerationNotifier>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            escalation: EscalationEngine::new(Arc::clone(&store)),
            store,
            gateway,
            notifier,
            locks: KeyedLocks::new(),
            config,
        }
    }

    /// Escalation engine sharing this lifecycle's store.
    pub fn escalation(&self) -> &EscalationEngine {
        &self.escalation
    }

    /// Active configuration.
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Per-member lock registry.
    pub fn locks(&self) -> &KeyedLocks {
        &self.locks
    }

    // Issuance

    /// Record a warning, then apply any escalation rule it reaches.
    ///
    /// # Errors
    ///
    /// Hierarchy violations, a receiver outside the guild, or a store failure.
    /// Escalation failures are reported in the outcome, not as an error.
    #[instrument(skip(self, reason), fields(%guild_id, %receiver_id, %issuer_id))]
    pub async fn issue_warning(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        issuer_id: UserId,
        reason: &str,
    ) -> ModerationResult<WarningOutcome> {
        let _guard = self.locks.lock(guild_id, receiver_id).await;
        let issuer = Issuer::Moderator(issuer_id);
        ensure_outranks(
            self.gateway.as_ref(),
            guild_id,
            issuer,
            receiver_id,
            Requirement::Record,
        )
        .await?;

        let warning = self
            .store
            .insert_infraction(self.draft(
                guild_id,
                receiver_id,
                issuer,
                reason,
                InfractionKind::Warning,
            ))
            .await?;
        info!(infraction_id = %warning.id, "Warning issued");

        self.message_receiver(
            receiver_id,
            format!("You have been warned in guild {}. Reason: {}", guild_id, warning.reason),
        )
        .await;
        self.publish(ModerationEvent::InfractionIssued {
            infraction: warning.clone(),
        })
        .await;

        let escalation = self.escalate(&warning).await;
        Ok(WarningOutcome { warning, escalation })
    }

    /// Mute a member. `None` duration mutes permanently.
    ///
    /// # Errors
    ///
    /// Conflict if the member already has an active mute, validation error for
    /// a duration that is not a positive whole number of seconds or a guild
    /// without a mute role.
    #[instrument(skip(self, reason), fields(%guild_id, %receiver_id, %issuer_id, ?duration))]
    pub async fn issue_mute(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        issuer_id: UserId,
        duration: Option<Duration>,
        reason: &str,
    ) -> ModerationResult<Infraction> {
        let _guard = self.locks.lock(guild_id, receiver_id).await;
        self.mute_locked(guild_id, receiver_id, Issuer::Moderator(issuer_id), duration, reason)
            .await
    }

    /// Ban a member (or a user who already left).
    #[instrument(skip(self, reason), fields(%guild_id, %receiver_id, %issuer_id))]
    pub async fn issue_ban(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        issuer_id: UserId,
        reason: &str,
    ) -> ModerationResult<Infraction> {
        let _guard = self.locks.lock(guild_id, receiver_id).await;
        self.ban_locked(guild_id, receiver_id, Issuer::Moderator(issuer_id), reason)
            .await
    }

    /// Ban then immediately unban, clearing the member's recent messages.
    #[instrument(skip(self, reason), fields(%guild_id, %receiver_id, %issuer_id))]
    pub async fn issue_softban(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        issuer_id: UserId,
        reason: &str,
    ) -> ModerationResult<TransientAction> {
        let _guard = self.locks.lock(guild_id, receiver_id).await;
        self.transient_locked(
            TransientKind::Softban,
            guild_id,
            receiver_id,
            Issuer::Moderator(issuer_id),
            reason,
        )
        .await
    }

    /// Remove a member from the guild. Nothing is persisted.
    #[instrument(skip(self, reason), fields(%guild_id, %receiver_id, %issuer_id))]
    pub async fn issue_kick(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        issuer_id: UserId,
        reason: &str,
    ) -> ModerationResult<TransientAction> {
        let _guard = self.locks.lock(guild_id, receiver_id).await;
        self.transient_locked(
            TransientKind::Kick,
            guild_id,
            receiver_id,
            Issuer::Moderator(issuer_id),
            reason,
        )
        .await
    }

    // Appeal and revoke

    /// Attach the receiver's one-time appeal to an infraction.
    ///
    /// The appeal is persisted, then delivered to the notifier; if delivery
    /// fails the appeal is withdrawn and the error returned.
    ///
    /// # Errors
    ///
    /// Validation error for an empty or oversized message, a revoked or
    /// non-appealable infraction; conflict if already appealed; authorization
    /// error if `receiver_id` is not the infraction's receiver.
    #[instrument(skip(self, message), fields(%guild_id, %infraction_id, %receiver_id))]
    pub async fn appeal(
        &self,
        guild_id: GuildId,
        infraction_id: InfractionId,
        receiver_id: UserId,
        message: &str,
    ) -> ModerationResult<Infraction> {
        let message = message.trim();
        if message.is_empty() {
            return Err(validation("Appeal message cannot be empty".to_string()));
        }
        let length = message.chars().count();
        if length > self.config.max_appeal_length {
            return Err(validation(format!(
                "Appeal message is {} characters, the limit is {}",
                length, self.config.max_appeal_length
            )));
        }

        let _guard = self.locks.lock(guild_id, receiver_id).await;
        let infraction = self.load(guild_id, infraction_id).await?;
        if infraction.receiver_id != receiver_id {
            return Err(ModerationError::new(ModerationErrorKind::Authorization(
                "Only the receiver may appeal an infraction".to_string(),
            )));
        }
        if infraction.is_appealed() {
            return Err(conflict(format!("Infraction {} was already appealed", infraction_id)));
        }
        if infraction.revoked {
            return Err(validation(format!(
                "Infraction {} was revoked and cannot be appealed",
                infraction_id
            )));
        }
        if !infraction.is_appealable(self.config.appeal_threshold) {
            return Err(validation(format!(
                "This {} is not appealable",
                infraction.infraction_type()
            )));
        }

        let appealed = self
            .store
            .mark_appealed(infraction_id, message, Utc::now())
            .await?;
        let delivered = self
            .notifier
            .notify(&ModerationEvent::InfractionAppealed {
                infraction: appealed.clone(),
            })
            .await;
        if let Err(err) = delivered {
            warn!(error = %err, "Appeal could not be delivered, withdrawing it");
            if let Err(rollback) = self.store.clear_appeal(infraction_id).await {
                error!(error = %rollback, "Could not withdraw undelivered appeal");
            }
            return Err(err.into());
        }
        info!("Infraction appealed");
        Ok(appealed)
    }

    /// Revoke an infraction on a moderator's behalf and undo its effect.
    ///
    /// # Errors
    ///
    /// Conflict if already revoked, not-found for an unknown id, authorization
    /// error if the revoker does not outrank a receiver who is still a member.
    #[instrument(skip(self), fields(%guild_id, %infraction_id, %revoker_id))]
    pub async fn revoke(
        &self,
        guild_id: GuildId,
        infraction_id: InfractionId,
        revoker_id: UserId,
    ) -> ModerationResult<Infraction> {
        let receiver_id = self.load(guild_id, infraction_id).await?.receiver_id;
        let _guard = self.locks.lock(guild_id, receiver_id).await;
        let infraction = self.load(guild_id, infraction_id).await?;
        if infraction.revoked {
            return Err(conflict(format!("Infraction {} was already revoked", infraction_id)));
        }

        let reversal_needed = matches!(
            infraction.kind,
            InfractionKind::Mute { .. } | InfractionKind::Ban
        );
        let standing = ensure_outranks(
            self.gateway.as_ref(),
            guild_id,
            Issuer::Moderator(revoker_id),
            receiver_id,
            Requirement::Reverse {
                external: reversal_needed,
            },
        )
        .await?;

        let now = Utc::now();
        let overlapping = self.overlapping(&infraction, now).await?;
        match &infraction.kind {
            _ if overlapping.is_some() => {
                debug!(other_id = ?overlapping, "Another infraction keeps the effect in place");
            }
            InfractionKind::Mute { .. } if standing.is_member => {
                self.lift_mute_role(guild_id, receiver_id).await?;
            }
            InfractionKind::Ban => {
                self.gateway
                    .remove_ban(
                        guild_id,
                        receiver_id,
                        &format!("Infraction {} revoked by {}", infraction_id, revoker_id),
                    )
                    .await?;
            }
            _ => debug!("No platform effect to reverse"),
        }

        let revoked = self
            .store
            .mark_revoked(infraction_id, Revoker::Moderator(revoker_id), now)
            .await?;
        info!("Infraction revoked");
        self.publish(ModerationEvent::InfractionRevoked {
            infraction: revoked.clone(),
        })
        .await;
        Ok(revoked)
    }

    /// Revoke a time-bound infraction whose duration has elapsed, as the system.
    ///
    /// A receiver who left the guild, or who is still under another active
    /// mute, is revoked without a platform call.
    ///
    /// # Errors
    ///
    /// Conflict if it was revoked in the meantime, validation error if it has
    /// not expired at `now`, or the platform/store error that stopped it.
    #[instrument(
        skip(self, infraction),
        fields(
            infraction_id = %infraction.id,
            guild_id = %infraction.guild_id,
            receiver_id = %infraction.receiver_id
        )
    )]
    pub async fn expire(
        &self,
        infraction: &Infraction,
        now: DateTime<Utc>,
    ) -> ModerationResult<Infraction> {
        let guild_id = infraction.guild_id;
        let receiver_id = infraction.receiver_id;
        let _guard = self.locks.lock(guild_id, receiver_id).await;
        let current = self.load(guild_id, infraction.id).await?;
        if current.revoked {
            return Err(conflict(format!("Infraction {} was already revoked", current.id)));
        }
        if !current.is_expired(now) {
            return Err(validation(format!("Infraction {} has not expired", current.id)));
        }

        if let InfractionKind::Mute { .. } = current.kind {
            if let Some(other_id) = self.overlapping(&current, now).await? {
                debug!(%other_id, "Receiver is still muted by another infraction");
            } else if self
                .gateway
                .get_member_rank(guild_id, receiver_id)
                .await?
                .is_some()
            {
                self.lift_mute_role(guild_id, receiver_id).await?;
            } else {
                debug!("Receiver left the guild, skipping role removal");
            }
        }

        let revoked = self
            .store
            .mark_revoked(current.id, Revoker::System, now)
            .await?;
        info!("Expired infraction revoked");

        self.message_receiver(
            receiver_id,
            format!(
                "Your {} in guild {} has expired.",
                revoked.infraction_type(),
                guild_id
            ),
        )
        .await;
        self.publish(ModerationEvent::InfractionRevoked {
            infraction: revoked.clone(),
        })
        .await;
        Ok(revoked)
    }

    // Queries

    /// Fetch an infraction belonging to a guild.
    pub async fn infraction(
        &self,
        guild_id: GuildId,
        infraction_id: InfractionId,
    ) -> ModerationResult<Infraction> {
        self.load(guild_id, infraction_id).await
    }

    /// A member's infraction history, oldest first.
    pub async fn history(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        include_revoked: bool,
    ) -> ModerationResult<Vec<Infraction>> {
        self.store
            .list_infractions(guild_id, receiver_id, include_revoked)
            .await
    }

    /// The member's current mute, if any.
    pub async fn active_mute(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
    ) -> ModerationResult<Option<Infraction>> {
        self.store
            .find_active_mute(guild_id, receiver_id, Utc::now())
            .await
    }

    // Lock-held internals

    async fn escalate(&self, warning: &Infraction) -> Option<EscalationOutcome> {
        let rule = match self.escalation.evaluate(warning).await {
            Ok(Some(rule)) => rule,
            Ok(None) => return None,
            Err(error) => {
                error!(error = %error, "Escalation lookup failed");
                return Some(EscalationOutcome::Failed { rule: None, error });
            }
        };
        match self.escalation.record(warning, &rule).await {
            Ok(true) => Some(self.apply_escalation(warning, rule).await),
            Ok(false) => {
                debug!(warning_count = rule.warning_count, "Threshold was claimed already");
                None
            }
            Err(error) => {
                error!(error = %error, "Could not record escalation");
                Some(EscalationOutcome::Failed {
                    rule: Some(rule),
                    error,
                })
            }
        }
    }

    async fn apply_escalation(
        &self,
        warning: &Infraction,
        rule: WarningEscalationRule,
    ) -> EscalationOutcome {
        let reason = format!(
            "Automatic escalation: {} active warnings (warning #{})",
            rule.warning_count, warning.id
        );
        self.publish(ModerationEvent::EscalationTriggered {
            warning_id: warning.id,
            rule: rule.clone(),
        })
        .await;

        let guild_id = warning.guild_id;
        let receiver_id = warning.receiver_id;
        let applied = match rule.punishment {
            PunishmentType::Mute => self
                .mute_locked(
                    guild_id,
                    receiver_id,
                    Issuer::System,
                    rule.mute_duration,
                    &reason,
                )
                .await
                .map(Punishment::Infraction),
            PunishmentType::Ban => self
                .ban_locked(guild_id, receiver_id, Issuer::System, &reason)
                .await
                .map(Punishment::Infraction),
            PunishmentType::Softban => self
                .transient_locked(
                    TransientKind::Softban,
                    guild_id,
                    receiver_id,
                    Issuer::System,
                    &reason,
                )
                .await
                .map(Punishment::Transient),
            PunishmentType::Kick => self
                .transient_locked(
                    TransientKind::Kick,
                    guild_id,
                    receiver_id,
                    Issuer::System,
                    &reason,
                )
                .await
                .map(Punishment::Transient),
        };

        match applied {
            Ok(punishment) => {
                info!(punishment = %rule.punishment, "Escalation applied");
                EscalationOutcome::Applied { rule, punishment }
            }
            Err(error) => {
                error!(punishment = %rule.punishment, error = %error, "Escalation failed");
                EscalationOutcome::Failed {
                    rule: Some(rule),
                    error,
                }
            }
        }
    }

    async fn mute_locked(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        issuer: Issuer,
        duration: Option<Duration>,
        reason: &str,
    ) -> ModerationResult<Infraction> {
        if let Some(duration) = duration {
            validate_mute_duration(duration)?;
        }
        ensure_outranks(
            self.gateway.as_ref(),
            guild_id,
            issuer,
            receiver_id,
            Requirement::Enforce,
        )
        .await?;

        let settings = self.store.get_guild_settings(guild_id).await?;
        let mute_role = settings.mute_role_id.ok_or_else(|| {
            validation(format!("Guild {} has no mute role configured", guild_id))
        })?;
        if let Some(active) = self
            .store
            .find_active_mute(guild_id, receiver_id, Utc::now())
            .await?
        {
            return Err(conflict(format!(
                "Member {} is already muted by infraction {}",
                receiver_id, active.id
            )));
        }

        let mute = self
            .store
            .insert_infraction(self.draft(
                guild_id,
                receiver_id,
                issuer,
                reason,
                InfractionKind::Mute { duration },
            ))
            .await?;
        if let Err(err) = self.gateway.add_role(guild_id, receiver_id, mute_role).await {
            self.roll_back(&mute).await;
            return Err(err.into());
        }
        info!(infraction_id = %mute.id, "Mute issued");

        let length = match duration {
            Some(duration) => format!("for {} minutes", duration.as_secs() / 60),
            None => "permanently".to_string(),
        };
        self.message_receiver(
            receiver_id,
            format!(
                "You have been muted {} in guild {}. Reason: {}",
                length, guild_id, mute.reason
            ),
        )
        .await;
        self.publish(ModerationEvent::InfractionIssued {
            infraction: mute.clone(),
        })
        .await;
        Ok(mute)
    }

    async fn ban_locked(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        issuer: Issuer,
        reason: &str,
    ) -> ModerationResult<Infraction> {
        let standing = ensure_outranks(
            self.gateway.as_ref(),
            guild_id,
            issuer,
            receiver_id,
            Requirement::EnforceAnyone,
        )
        .await?;

        let ban = self
            .store
            .insert_infraction(self.draft(
                guild_id,
                receiver_id,
                issuer,
                reason,
                InfractionKind::Ban,
            ))
            .await?;
        if standing.is_member {
            self.message_receiver(
                receiver_id,
                format!(
                    "You have been banned from guild {}. Reason: {}",
                    guild_id, ban.reason
                ),
            )
            .await;
        }
        if let Err(err) = self.gateway.add_ban(guild_id, receiver_id, &ban.reason).await {
            self.roll_back(&ban).await;
            return Err(err.into());
        }
        info!(infraction_id = %ban.id, "Ban issued");

        self.publish(ModerationEvent::InfractionIssued {
            infraction: ban.clone(),
        })
        .await;
        Ok(ban)
    }

    async fn transient_locked(
        &self,
        kind: TransientKind,
        guild_id: GuildId,
        receiver_id: UserId,
        issuer: Issuer,
        reason: &str,
    ) -> ModerationResult<TransientAction> {
        ensure_outranks(
            self.gateway.as_ref(),
            guild_id,
            issuer,
            receiver_id,
            Requirement::Enforce,
        )
        .await?;

        let reason = normalize_reason(reason);
        let verb = match kind {
            TransientKind::Softban => "softbanned",
            TransientKind::Kick => "kicked",
        };
        self.message_receiver(
            receiver_id,
            format!(
                "You have been {} from guild {}. Reason: {}",
                verb, guild_id, reason
            ),
        )
        .await;

        match kind {
            TransientKind::Softban => {
                self.gateway.add_ban(guild_id, receiver_id, &reason).await?;
                if let Err(err) = self.gateway.remove_ban(guild_id, receiver_id, &reason).await {
                    error!(error = %err, "Softban unban failed, member remains banned");
                    return Err(err.into());
                }
            }
            TransientKind::Kick => self.gateway.kick(guild_id, receiver_id, &reason).await?,
        }

        let action = TransientAction {
            kind,
            guild_id,
            receiver_id,
            issuer_id: self.issuer_id(issuer),
            reason,
            performed_at: Utc::now(),
        };
        info!(action = %kind, "Transient action performed");
        self.publish(ModerationEvent::TransientActionTaken {
            action: action.clone(),
        })
        .await;
        Ok(action)
    }

    /// Another unrevoked infraction that keeps the same platform effect on the
    /// receiver: an active mute for a mute, any ban for a ban.
    async fn overlapping(
        &self,
        infraction: &Infraction,
        now: DateTime<Utc>,
    ) -> ModerationResult<Option<InfractionId>> {
        let others = self
            .store
            .list_infractions(infraction.guild_id, infraction.receiver_id, false)
            .await?;
        Ok(others
            .into_iter()
            .find(|other| {
                other.id != infraction.id
                    && match (&infraction.kind, &other.kind) {
                        (InfractionKind::Mute { .. }, InfractionKind::Mute { .. }) => {
                            other.is_active(now)
                        }
                        (InfractionKind::Ban, InfractionKind::Ban) => true,
                        _ => false,
                    }
            })
            .map(|other| other.id))
    }

    async fn lift_mute_role(&self, guild_id: GuildId, receiver_id: UserId) -> ModerationResult<()> {
        let settings = self.store.get_guild_settings(guild_id).await?;
        match settings.mute_role_id {
            Some(role_id) => {
                self.gateway
                    .remove_role(guild_id, receiver_id, role_id)
                    .await?;
            }
            None => warn!(%guild_id, "No mute role configured, nothing to remove"),
        }
        Ok(())
    }

    async fn load(
        &self,
        guild_id: GuildId,
        infraction_id: InfractionId,
    ) -> ModerationResult<Infraction> {
        match self.store.get_infraction(infraction_id).await? {
            Some(infraction) if infraction.guild_id == guild_id => Ok(infraction),
            _ => Err(ModerationError::new(ModerationErrorKind::NotFound(format!(
                "Infraction {} does not exist in guild {}",
                infraction_id, guild_id
            )))),
        }
    }

    async fn roll_back(&self, infraction: &Infraction) {
        warn!(infraction_id = %infraction.id, "Platform action failed, rolling back infraction");
        if let Err(err) = self.store.delete_infraction(infraction.id).await {
            error!(infraction_id = %infraction.id, error = %err, "Rollback failed");
        }
    }

    async fn message_receiver(&self, receiver_id: UserId, content: String) {
        if !self.config.direct_message_receivers {
            return;
        }
        if let Err(err) = self.gateway.send_direct_message(receiver_id, &content).await {
            warn!(%receiver_id, error = %err, "Could not message receiver");
        }
    }

    async fn publish(&self, event: ModerationEvent) {
        if let Err(err) = self.notifier.notify(&event).await {
            warn!(event = event.label(), error = %err, "Could not deliver moderation event");
        }
    }

    fn issuer_id(&self, issuer: Issuer) -> UserId {
        match issuer {
            Issuer::Moderator(user_id) => user_id,
            Issuer::System => self.gateway.bot_user_id(),
        }
    }

    fn draft(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        issuer: Issuer,
        reason: &str,
        kind: InfractionKind,
    ) -> NewInfraction {
        NewInfraction {
            guild_id,
            receiver_id,
            issuer_id: self.issuer_id(issuer),
            reason: normalize_reason(reason),
            issued_at: Utc::now(),
            kind,
        }
    }
}

fn normalize_reason(reason: &str) -> String {
    let reason = reason.trim();
    if reason.is_empty() {
        "No reason provided".to_string()
    } else {
        reason.to_string()
    }
}

fn validation(message: String) -> ModerationError {
    ModerationError::new(ModerationErrorKind::Validation(message))
}

fn conflict(message: String) -> ModerationError {
    ModerationError::new(ModerationErrorKind::Conflict(message))
}
