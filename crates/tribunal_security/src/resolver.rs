//! Layered permission rule resolution.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use tribunal_core::{ActorContext, CommandRef, PermissionRule, RuleEffect, RuleId, RuleScope};
use tribunal_error::{ModerationError, ModerationErrorKind, ModerationResult};

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Decision {
    /// Command may run
    Allow,
    /// Command is blocked
    Deny,
}

impl From<RuleEffect> for Decision {
    fn from(effect: RuleEffect) -> Self {
        match effect {
            RuleEffect::Enable => Decision::Allow,
            RuleEffect::Disable => Decision::Deny,
        }
    }
}

/// Decision plus the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Allow or deny
    pub decision: Decision,
    /// Rule that decided, `None` for owner bypass or the default
    pub matched_rule_id: Option<RuleId>,
    /// Layer of the deciding rule
    pub matched_scope: Option<RuleScope>,
}

impl Resolution {
    fn unmatched() -> Self {
        Self {
            decision: Decision::Allow,
            matched_rule_id: None,
            matched_scope: None,
        }
    }

    fn from_rule(rule: &PermissionRule) -> Self {
        Self {
            decision: rule.effect.into(),
            matched_rule_id: Some(rule.id),
            matched_scope: Some(rule.scope),
        }
    }

    /// Whether the command may run.
    pub fn is_allowed(&self) -> bool {
        self.decision == Decision::Allow
    }
}

/// Pure resolver from (actor, command, rule set) to a decision.
///
/// Precedence:
/// 1. Guild owners are always allowed.
/// 2. The newest global rule for the command decides.
/// 3. Otherwise the first layer of `[user, roles by descending rank, channel, guild]`
///    holding a matching rule decides, newest rule first within that layer.
/// 4. No match allows.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionResolver;

impl PermissionResolver {
    /// Create a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Resolve the decision for `actor` invoking `command` under `rules`.
    ///
    /// Rules belonging to other guilds are ignored.
    #[instrument(
        skip(self, actor, rules),
        fields(
            user_id = %actor.user_id(),
            guild_id = %actor.guild_id(),
            command = %command.name
        )
    )]
    pub fn resolve(
        &self,
        actor: &ActorContext,
        command: &CommandRef,
        rules: &[PermissionRule],
    ) -> Resolution {
        if actor.is_guild_owner() {
            debug!("Guild owner bypasses permission rules");
            return Resolution::unmatched();
        }

        let governing: Vec<&PermissionRule> = rules
            .iter()
            .filter(|rule| rule.guild_id == *actor.guild_id() && rule.governs(command))
            .collect();

        let global = governing
            .iter()
            .copied()
            .filter(|rule| rule.scope == RuleScope::Global);
        if let Some(rule) = newest(global) {
            debug!(rule_id = %rule.id, effect = %rule.effect, "Global rule decides");
            return Resolution::from_rule(rule);
        }

        for (scope, target) in candidates(actor) {
            let layer = governing
                .iter()
                .copied()
                .filter(|rule| rule.scope == scope && rule.target_id == Some(target));
            if let Some(rule) = newest(layer) {
                debug!(
                    rule_id = %rule.id,
                    %scope,
                    target_id = target,
                    effect = %rule.effect,
                    "Layered rule decides"
                );
                return Resolution::from_rule(rule);
            }
        }

        debug!("No rule matched, allowing by default");
        Resolution::unmatched()
    }

    /// Resolve and turn a deny into an authorization error.
    pub fn check(
        &self,
        actor: &ActorContext,
        command: &CommandRef,
        rules: &[PermissionRule],
    ) -> ModerationResult<Resolution> {
        let resolution = self.resolve(actor, command, rules);
        if resolution.is_allowed() {
            return Ok(resolution);
        }
        Err(ModerationError::new(ModerationErrorKind::Authorization(
            match resolution.matched_rule_id {
                Some(rule_id) => format!(
                    "Command '{}' is disabled by rule {}",
                    command.name, rule_id
                ),
                None => format!("Command '{}' is disabled", command.name),
            },
        )))
    }
}

/// Candidate targets in priority order.
fn candidates(actor: &ActorContext) -> Vec<(RuleScope, u64)> {
    let mut targets = Vec::with_capacity(actor.roles().len() + 3);
    targets.push((RuleScope::User, actor.user_id().get()));
    targets.extend(actor.roles().iter().map(|role| (RuleScope::Role, role.get())));
    targets.push((RuleScope::Channel, actor.channel_id().get()));
    targets.push((RuleScope::Guild, actor.guild_id().get()));
    targets
}

fn newest<'a>(rules: impl Iterator<Item = &'a PermissionRule>) -> Option<&'a PermissionRule> {
    rules.max_by_key(|rule| rule.id)
}
