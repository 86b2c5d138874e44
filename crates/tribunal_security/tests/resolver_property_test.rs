//! Property tests for permission rule precedence.

use proptest::prelude::*;
use tribunal_core::{
    ActorContext, ActorContextBuilder, ChannelId, CommandRef, GuildId, PermissionRule, RoleId,
    RuleEffect, RuleId, RuleScope, UserId,
};
use tribunal_security::{Decision, PermissionResolver};

const GUILD: u64 = 1;
const USER: u64 = 10;
const ROLES: [u64; 3] = [300, 200, 100];
const CHANNEL: u64 = 50;

fn actor(owner: bool) -> ActorContext {
    ActorContextBuilder::default()
        .user_id(UserId(USER))
        .guild_id(GuildId(GUILD))
        .roles(ROLES.iter().copied().map(RoleId).collect::<Vec<_>>())
        .channel_id(ChannelId(CHANNEL))
        .is_guild_owner(owner)
        .build()
        .unwrap()
}

fn command() -> CommandRef {
    CommandRef::new("mute").in_module("moderation")
}

/// Unassigned rule: scope, target, effect, governed name.
type RuleSeed = (RuleScope, Option<u64>, RuleEffect, &'static str);

fn seed_strategy() -> impl Strategy<Value = RuleSeed> {
    let scope = prop_oneof![
        Just((RuleScope::Global, None)),
        Just((RuleScope::Guild, Some(GUILD))),
        Just((RuleScope::User, Some(USER))),
        Just((RuleScope::User, Some(99))),
        Just((RuleScope::Channel, Some(CHANNEL))),
        Just((RuleScope::Channel, Some(51))),
        prop::sample::select(ROLES.to_vec()).prop_map(|role| (RuleScope::Role, Some(role))),
        Just((RuleScope::Role, Some(999))),
    ];
    let effect = prop_oneof![Just(RuleEffect::Enable), Just(RuleEffect::Disable)];
    let name = prop::sample::select(vec!["mute", "moderation", "ban"]);
    (scope, effect, name).prop_map(|((scope, target), effect, name)| (scope, target, effect, name))
}

fn assign_ids(seeds: Vec<RuleSeed>) -> Vec<PermissionRule> {
    seeds
        .into_iter()
        .enumerate()
        .map(|(index, (scope, target_id, effect, name))| PermissionRule {
            id: RuleId(index as i64 + 1),
            guild_id: GuildId(GUILD),
            scope,
            target_id,
            command_or_module: name.to_string(),
            effect,
        })
        .collect()
}

/// Straightforward restatement of the precedence order.
fn expected(rules: &[PermissionRule]) -> (Decision, Option<RuleId>) {
    let governs = |rule: &&PermissionRule| rule.governs(&command());
    let layers: Vec<(RuleScope, Option<u64>)> = std::iter::once((RuleScope::User, Some(USER)))
        .chain(ROLES.iter().map(|role| (RuleScope::Role, Some(*role))))
        .chain([
            (RuleScope::Channel, Some(CHANNEL)),
            (RuleScope::Guild, Some(GUILD)),
        ])
        .collect();

    let global = rules
        .iter()
        .filter(governs)
        .filter(|rule| rule.scope == RuleScope::Global)
        .max_by_key(|rule| rule.id);
    if let Some(rule) = global {
        return (rule.effect.into(), Some(rule.id));
    }
    for (scope, target) in layers {
        let hit = rules
            .iter()
            .filter(governs)
            .filter(|rule| rule.scope == scope && rule.target_id == target)
            .max_by_key(|rule| rule.id);
        if let Some(rule) = hit {
            return (rule.effect.into(), Some(rule.id));
        }
    }
    (Decision::Allow, None)
}

proptest! {
    #[test]
    fn prop_matches_precedence_order(seeds in prop::collection::vec(seed_strategy(), 0..24)) {
        let rules = assign_ids(seeds);
        let resolution = PermissionResolver::new().resolve(&actor(false), &command(), &rules);
        let (decision, rule_id) = expected(&rules);
        prop_assert_eq!(resolution.decision, decision);
        prop_assert_eq!(resolution.matched_rule_id, rule_id);
    }

    #[test]
    fn prop_insertion_order_is_irrelevant(
        (original, shuffled) in prop::collection::vec(seed_strategy(), 0..24)
            .prop_map(assign_ids)
            .prop_flat_map(|rules| (Just(rules.clone()), Just(rules).prop_shuffle()))
    ) {
        let resolver = PermissionResolver::new();
        let first = resolver.resolve(&actor(false), &command(), &original);
        let second = resolver.resolve(&actor(false), &command(), &shuffled);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_newest_global_disable_always_denies(
        seeds in prop::collection::vec(seed_strategy(), 0..24),
    ) {
        let mut rules = assign_ids(seeds);
        let newest = RuleId(rules.len() as i64 + 1);
        rules.push(PermissionRule {
            id: newest,
            guild_id: GuildId(GUILD),
            scope: RuleScope::Global,
            target_id: None,
            command_or_module: "mute".to_string(),
            effect: RuleEffect::Disable,
        });
        let resolution = PermissionResolver::new().resolve(&actor(false), &command(), &rules);
        prop_assert_eq!(resolution.decision, Decision::Deny);
        prop_assert_eq!(resolution.matched_rule_id, Some(newest));
    }

    #[test]
    fn prop_owner_always_allowed(seeds in prop::collection::vec(seed_strategy(), 0..24)) {
        let rules = assign_ids(seeds);
        let resolution = PermissionResolver::new().resolve(&actor(true), &command(), &rules);
        prop_assert_eq!(resolution.decision, Decision::Allow);
    }
}
