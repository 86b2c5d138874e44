//! In-memory implementation of ModerationStore.
//!
//! Backs tests and single-process deployments that do not need durability.
//! All data is lost when the store is dropped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tribunal_core::{
    GuildId, GuildSettings, Infraction, InfractionId, InfractionKind, NewInfraction,
    NewPermissionRule, PermissionRule, Revoker, RuleId, UserId, WarningEscalationRule,
};
use tribunal_error::{ModerationError, ModerationErrorKind, ModerationResult};
use tribunal_interface::ModerationStore;

#[derive(Debug, Default)]
struct MemoryState {
    last_infraction_id: i64,
    last_rule_id: i64,
    infractions: BTreeMap<InfractionId, Infraction>,
    rules: BTreeMap<RuleId, PermissionRule>,
    escalation_rules: BTreeMap<(GuildId, u32), WarningEscalationRule>,
    fired_escalations: HashMap<(GuildId, UserId, u32), InfractionId>,
    settings: HashMap<GuildId, GuildSettings>,
}

/// HashMap-backed store behind a single async `RwLock`.
///
/// Ids are assigned from counters that never go backwards, so deleted ids are
/// never reused.
#[derive(Debug, Clone, Default)]
pub struct InMemoryModerationStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryModerationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored infractions (for testing).
    pub async fn infraction_count(&self) -> usize {
        self.state.read().await.infractions.len()
    }
}

fn not_found(message: String) -> ModerationError {
    ModerationError::new(ModerationErrorKind::NotFound(message))
}

#[async_trait]
impl ModerationStore for InMemoryModerationStore {
    async fn add_permission_rule(
        &self,
        rule: NewPermissionRule,
    ) -> ModerationResult<PermissionRule> {
        let rule = rule.validate()?;
        let mut state = self.state.write().await;
        state.last_rule_id += 1;
        let stored = rule.with_id(RuleId(state.last_rule_id));
        state.rules.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn remove_permission_rule(
        &self,
        guild_id: GuildId,
        rule_id: RuleId,
    ) -> ModerationResult<()> {
        let mut state = self.state.write().await;
        match state.rules.get(&rule_id) {
            Some(rule) if rule.guild_id == guild_id => {
                state.rules.remove(&rule_id);
                Ok(())
            }
            _ => Err(not_found(format!("Permission rule {} does not exist", rule_id))),
        }
    }

    async fn list_permission_rules(
        &self,
        guild_id: GuildId,
    ) -> ModerationResult<Vec<PermissionRule>> {
        let state = self.state.read().await;
        Ok(state
            .rules
            .values()
            .filter(|rule| rule.guild_id == guild_id)
            .cloned()
            .collect())
    }

    async fn insert_infraction(&self, infraction: NewInfraction) -> ModerationResult<Infraction> {
        let mut state = self.state.write().await;
        state.last_infraction_id += 1;
        let stored = infraction.with_id(InfractionId(state.last_infraction_id));
        state.infractions.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_infraction(&self, id: InfractionId) -> ModerationResult<Option<Infraction>> {
        Ok(self.state.read().await.infractions.get(&id).cloned())
    }

    async fn delete_infraction(&self, id: InfractionId) -> ModerationResult<()> {
        self.state
            .write()
            .await
            .infractions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(format!("Infraction {} does not exist", id)))
    }

    async fn mark_revoked(
        &self,
        id: InfractionId,
        revoker: Revoker,
        revoked_at: DateTime<Utc>,
    ) -> ModerationResult<Infraction> {
        let mut state = self.state.write().await;
        let infraction = state
            .infractions
            .get_mut(&id)
            .ok_or_else(|| not_found(format!("Infraction {} does not exist", id)))?;
        if infraction.revoked {
            return Err(ModerationError::new(ModerationErrorKind::Conflict(format!(
                "Infraction {} was already revoked",
                id
            ))));
        }
        infraction.revoked = true;
        infraction.revoked_by = Some(revoker);
        infraction.revoked_at = Some(revoked_at);
        Ok(infraction.clone())
    }

    async fn mark_appealed(
        &self,
        id: InfractionId,
        message: &str,
        appealed_at: DateTime<Utc>,
    ) -> ModerationResult<Infraction> {
        let mut state = self.state.write().await;
        let infraction = state
            .infractions
            .get_mut(&id)
            .ok_or_else(|| not_found(format!("Infraction {} does not exist", id)))?;
        if infraction.is_appealed() {
            return Err(ModerationError::new(ModerationErrorKind::Conflict(format!(
                "Infraction {} was already appealed",
                id
            ))));
        }
        infraction.appealed_at = Some(appealed_at);
        infraction.appeal_message = Some(message.to_string());
        Ok(infraction.clone())
    }

    async fn clear_appeal(&self, id: InfractionId) -> ModerationResult<()> {
        let mut state = self.state.write().await;
        let infraction = state
            .infractions
            .get_mut(&id)
            .ok_or_else(|| not_found(format!("Infraction {} does not exist", id)))?;
        infraction.appealed_at = None;
        infraction.appeal_message = None;
        Ok(())
    }

    async fn list_infractions(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        include_revoked: bool,
    ) -> ModerationResult<Vec<Infraction>> {
        let state = self.state.read().await;
        Ok(state
            .infractions
            .values()
            .filter(|infraction| {
                infraction.guild_id == guild_id
                    && infraction.receiver_id == receiver_id
                    && (include_revoked || !infraction.revoked)
            })
            .cloned()
            .collect())
    }

    async fn count_active_warnings(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
    ) -> ModerationResult<u32> {
        let state = self.state.read().await;
        let count = state
            .infractions
            .values()
            .filter(|infraction| {
                infraction.guild_id == guild_id
                    && infraction.receiver_id == receiver_id
                    && !infraction.revoked
                    && infraction.kind == InfractionKind::Warning
            })
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn find_active_mute(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        now: DateTime<Utc>,
    ) -> ModerationResult<Option<Infraction>> {
        let state = self.state.read().await;
        Ok(state
            .infractions
            .values()
            .rev()
            .find(|infraction| {
                infraction.guild_id == guild_id
                    && infraction.receiver_id == receiver_id
                    && matches!(infraction.kind, InfractionKind::Mute { .. })
                    && infraction.is_active(now)
            })
            .cloned())
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> ModerationResult<Vec<Infraction>> {
        let state = self.state.read().await;
        Ok(state
            .infractions
            .values()
            .filter(|infraction| !infraction.revoked && infraction.is_expired(now))
            .cloned()
            .collect())
    }

    async fn set_escalation_rule(&self, rule: WarningEscalationRule) -> ModerationResult<()> {
        rule.validate()?;
        self.state
            .write()
            .await
            .escalation_rules
            .insert((rule.guild_id, rule.warning_count), rule);
        Ok(())
    }

    async fn remove_escalation_rule(
        &self,
        guild_id: GuildId,
        warning_count: u32,
    ) -> ModerationResult<()> {
        self.state
            .write()
            .await
            .escalation_rules
            .remove(&(guild_id, warning_count))
            .map(|_| ())
            .ok_or_else(|| {
                not_found(format!(
                    "No escalation rule at {} warnings in guild {}",
                    warning_count, guild_id
                ))
            })
    }

    async fn get_escalation_rule(
        &self,
        guild_id: GuildId,
        warning_count: u32,
    ) -> ModerationResult<Option<WarningEscalationRule>> {
        Ok(self
            .state
            .read()
            .await
            .escalation_rules
            .get(&(guild_id, warning_count))
            .cloned())
    }

    async fn list_escalation_rules(
        &self,
        guild_id: GuildId,
    ) -> ModerationResult<Vec<WarningEscalationRule>> {
        let state = self.state.read().await;
        Ok(state
            .escalation_rules
            .range((guild_id, 0)..=(guild_id, u32::MAX))
            .map(|(_, rule)| rule.clone())
            .collect())
    }

    async fn record_escalation(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        warning_count: u32,
        warning_id: InfractionId,
    ) -> ModerationResult<bool> {
        let mut state = self.state.write().await;
        match state.fired_escalations.entry((guild_id, receiver_id, warning_count)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(warning_id);
                Ok(true)
            }
        }
    }

    async fn has_escalation_fired(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        warning_count: u32,
    ) -> ModerationResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .fired_escalations
            .contains_key(&(guild_id, receiver_id, warning_count)))
    }

    async fn get_guild_settings(&self, guild_id: GuildId) -> ModerationResult<GuildSettings> {
        Ok(self
            .state
            .read()
            .await
            .settings
            .get(&guild_id)
            .cloned()
            .unwrap_or_else(|| GuildSettings::new(guild_id)))
    }

    async fn save_guild_settings(&self, settings: GuildSettings) -> ModerationResult<()> {
        self.state
            .write()
            .await
            .settings
            .insert(settings.guild_id, settings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tribunal_core::{PunishmentType, RuleEffect, RuleScope};

    fn draft(receiver: u64, kind: InfractionKind) -> NewInfraction {
        NewInfraction {
            guild_id: GuildId(1),
            receiver_id: UserId(receiver),
            issuer_id: UserId(99),
            reason: "test".to_string(),
            issued_at: Utc::now(),
            kind,
        }
    }

    #[tokio::test]
    async fn test_ids_are_never_reused() {
        let store = InMemoryModerationStore::new();
        let first = store.insert_infraction(draft(2, InfractionKind::Warning)).await.unwrap();
        store.delete_infraction(first.id).await.unwrap();
        let second = store.insert_infraction(draft(2, InfractionKind::Warning)).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_mark_revoked_twice_conflicts() {
        let store = InMemoryModerationStore::new();
        let warning = store.insert_infraction(draft(2, InfractionKind::Warning)).await.unwrap();
        store
            .mark_revoked(warning.id, Revoker::System, Utc::now())
            .await
            .unwrap();
        let err = store
            .mark_revoked(warning.id, Revoker::Moderator(UserId(5)), Utc::now())
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        let stored = store.get_infraction(warning.id).await.unwrap().unwrap();
        assert_eq!(stored.revoked_by, Some(Revoker::System));
    }

    #[tokio::test]
    async fn test_count_active_warnings_skips_revoked_and_other_kinds() {
        let store = InMemoryModerationStore::new();
        let first = store.insert_infraction(draft(2, InfractionKind::Warning)).await.unwrap();
        store.insert_infraction(draft(2, InfractionKind::Warning)).await.unwrap();
        store.insert_infraction(draft(2, InfractionKind::Ban)).await.unwrap();
        store.insert_infraction(draft(3, InfractionKind::Warning)).await.unwrap();
        store
            .mark_revoked(first.id, Revoker::System, Utc::now())
            .await
            .unwrap();

        assert_eq!(store.count_active_warnings(GuildId(1), UserId(2)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_expired_only_returns_elapsed_mutes() {
        let store = InMemoryModerationStore::new();
        let short = store
            .insert_infraction(draft(
                2,
                InfractionKind::Mute {
                    duration: Some(Duration::from_secs(60)),
                },
            ))
            .await
            .unwrap();
        store
            .insert_infraction(draft(3, InfractionKind::Mute { duration: None }))
            .await
            .unwrap();

        let later = Utc::now() + chrono::Duration::minutes(5);
        let expired = store.list_expired(later).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, short.id);
    }

    #[tokio::test]
    async fn test_escalation_is_recorded_once_per_member() {
        let store = InMemoryModerationStore::new();
        assert!(store.record_escalation(GuildId(1), UserId(2), 3, InfractionId(7)).await.unwrap());
        assert!(!store.record_escalation(GuildId(1), UserId(2), 3, InfractionId(9)).await.unwrap());
        assert!(store.has_escalation_fired(GuildId(1), UserId(2), 3).await.unwrap());
        assert!(!store.has_escalation_fired(GuildId(1), UserId(4), 3).await.unwrap());
        assert!(!store.has_escalation_fired(GuildId(1), UserId(2), 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_permission_rules_are_validated_and_ordered() {
        let store = InMemoryModerationStore::new();
        let invalid = NewPermissionRule {
            guild_id: GuildId(1),
            scope: RuleScope::Role,
            target_id: None,
            command_or_module: "warn".to_string(),
            effect: RuleEffect::Disable,
        };
        assert!(store.add_permission_rule(invalid.clone()).await.unwrap_err().is_validation());

        let first = store
            .add_permission_rule(NewPermissionRule {
                target_id: Some(5),
                ..invalid.clone()
            })
            .await
            .unwrap();
        let second = store
            .add_permission_rule(NewPermissionRule {
                scope: RuleScope::Global,
                ..invalid
            })
            .await
            .unwrap();

        let rules = store.list_permission_rules(GuildId(1)).await.unwrap();
        assert_eq!(rules.iter().map(|rule| rule.id).collect::<Vec<_>>(), vec![first.id, second.id]);
        assert!(
            store
                .remove_permission_rule(GuildId(2), first.id)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_escalation_rules_upsert_by_threshold() {
        let store = InMemoryModerationStore::new();
        store
            .set_escalation_rule(WarningEscalationRule::new(GuildId(1), 3, PunishmentType::Kick))
            .await
            .unwrap();
        store
            .set_escalation_rule(WarningEscalationRule::new(GuildId(1), 3, PunishmentType::Ban))
            .await
            .unwrap();
        store
            .set_escalation_rule(WarningEscalationRule::new(GuildId(2), 1, PunishmentType::Kick))
            .await
            .unwrap();

        let rules = store.list_escalation_rules(GuildId(1)).await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].punishment, PunishmentType::Ban);
        assert!(
            store
                .remove_escalation_rule(GuildId(1), 4)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }
}
