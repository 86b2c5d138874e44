//! Tests for warning-count escalation.

mod test_utils;

use std::time::Duration;
use test_utils::{
    BOT, GUILD, GatewayCall, Harness, MEMBER, MODERATOR, MUTE_ROLE, MockOp, OTHER_MEMBER,
};
use tribunal_core::{InfractionKind, PunishmentType, WarningEscalationRule};
use tribunal_moderation::{EscalationOutcome, Punishment, WarningOutcome};

async fn warn(harness: &Harness) -> WarningOutcome {
    harness
        .lifecycle
        .issue_warning(GUILD, MEMBER, MODERATOR, "rule breach")
        .await
        .unwrap()
}

#[tokio::test]
async fn test_threshold_triggers_exactly_once() {
    let harness = Harness::new().await;
    harness
        .lifecycle
        .escalation()
        .set_rule(
            WarningEscalationRule::new(GUILD, 3, PunishmentType::Mute)
                .with_mute_duration(Duration::from_secs(600)),
        )
        .await
        .unwrap();

    assert!(warn(&harness).await.escalation.is_none());
    assert!(warn(&harness).await.escalation.is_none());

    let third = warn(&harness).await;
    match third.escalation {
        Some(EscalationOutcome::Applied {
            rule,
            punishment: Punishment::Infraction(mute),
        }) => {
            assert_eq!(rule.warning_count, 3);
            assert_eq!(
                mute.kind,
                InfractionKind::Mute {
                    duration: Some(Duration::from_secs(600))
                }
            );
            assert_eq!(mute.issuer_id, BOT);
            assert!(mute.reason.contains(&format!("#{}", third.warning.id)));
        }
        other => panic!("expected an applied mute, got {other:?}"),
    }

    assert!(warn(&harness).await.escalation.is_none());

    let mutes = harness
        .gateway
        .actions()
        .into_iter()
        .filter(|call| *call == GatewayCall::AddRole(GUILD, MEMBER, MUTE_ROLE))
        .count();
    assert_eq!(mutes, 1);
    assert!(harness.notifier.labels().contains(&"escalation_triggered"));
}

#[tokio::test]
async fn test_kick_escalation_is_transient() {
    let harness = Harness::new().await;
    harness
        .lifecycle
        .escalation()
        .set_rule(WarningEscalationRule::new(GUILD, 1, PunishmentType::Kick))
        .await
        .unwrap();

    let outcome = warn(&harness).await;

    assert!(matches!(
        outcome.escalation,
        Some(EscalationOutcome::Applied {
            punishment: Punishment::Transient(_),
            ..
        })
    ));
    assert!(harness.gateway.actions().contains(&GatewayCall::Kick(GUILD, MEMBER)));
    assert_eq!(harness.store.infraction_count().await, 1);
}

#[tokio::test]
async fn test_threshold_fires_once_per_member_despite_revocation() {
    let harness = Harness::new().await;
    harness
        .lifecycle
        .escalation()
        .set_rule(WarningEscalationRule::new(GUILD, 2, PunishmentType::Kick))
        .await
        .unwrap();

    let first = warn(&harness).await.warning;
    let second = warn(&harness).await;
    assert!(second.escalation.is_some());
    harness
        .lifecycle
        .revoke(GUILD, first.id, MODERATOR)
        .await
        .unwrap();

    // Active count is back at 2, but the threshold already fired.
    let third = warn(&harness).await;
    assert!(third.escalation.is_none());

    let kicks = harness
        .gateway
        .actions()
        .into_iter()
        .filter(|call| *call == GatewayCall::Kick(GUILD, MEMBER))
        .count();
    assert_eq!(kicks, 1);
    assert!(
        harness
            .lifecycle
            .escalation()
            .has_fired(GUILD, MEMBER, 2)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_fired_threshold_is_tracked_per_member() {
    let harness = Harness::new().await;
    harness
        .lifecycle
        .escalation()
        .set_rule(WarningEscalationRule::new(GUILD, 1, PunishmentType::Kick))
        .await
        .unwrap();

    assert!(warn(&harness).await.escalation.is_some());
    let other = harness
        .lifecycle
        .issue_warning(GUILD, OTHER_MEMBER, MODERATOR, "rule breach")
        .await
        .unwrap();

    assert!(other.escalation.is_some());
    assert!(harness.gateway.actions().contains(&GatewayCall::Kick(GUILD, OTHER_MEMBER)));
}

#[tokio::test]
async fn test_exact_match_never_fires_above_threshold() {
    let harness = Harness::new().await;
    warn(&harness).await;
    warn(&harness).await;
    harness
        .lifecycle
        .escalation()
        .set_rule(WarningEscalationRule::new(GUILD, 2, PunishmentType::Kick))
        .await
        .unwrap();

    assert!(warn(&harness).await.escalation.is_none());
}

#[tokio::test]
async fn test_failed_punishment_keeps_warning() {
    let harness = Harness::new().await;
    harness
        .lifecycle
        .escalation()
        .set_rule(WarningEscalationRule::new(GUILD, 1, PunishmentType::Ban))
        .await
        .unwrap();
    harness.gateway.fail(MockOp::AddBan);

    let outcome = warn(&harness).await;

    match outcome.escalation {
        Some(EscalationOutcome::Failed { rule: Some(rule), error }) => {
            assert_eq!(rule.punishment, PunishmentType::Ban);
            assert!(error.is_external());
        }
        other => panic!("expected a failed escalation, got {other:?}"),
    }
    assert_eq!(harness.store.infraction_count().await, 1);
}

#[tokio::test]
async fn test_escalation_rule_administration() {
    let harness = Harness::new().await;
    let engine = harness.lifecycle.escalation();

    let zero = engine
        .set_rule(WarningEscalationRule::new(GUILD, 0, PunishmentType::Kick))
        .await
        .unwrap_err();
    assert!(zero.is_validation());

    let kick_with_duration = engine
        .set_rule(
            WarningEscalationRule::new(GUILD, 2, PunishmentType::Kick)
                .with_mute_duration(Duration::from_secs(60)),
        )
        .await
        .unwrap_err();
    assert!(kick_with_duration.is_validation());

    engine
        .set_rule(WarningEscalationRule::new(GUILD, 5, PunishmentType::Ban))
        .await
        .unwrap();
    engine
        .set_rule(WarningEscalationRule::new(GUILD, 2, PunishmentType::Kick))
        .await
        .unwrap();
    let thresholds: Vec<u32> = engine
        .rules(GUILD)
        .await
        .unwrap()
        .iter()
        .map(|rule| rule.warning_count)
        .collect();
    assert_eq!(thresholds, vec![2, 5]);

    engine.remove_rule(GUILD, 5).await.unwrap();
    assert!(engine.remove_rule(GUILD, 5).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_evaluate_rejects_non_warnings() {
    let harness = Harness::new().await;
    let ban = harness
        .lifecycle
        .issue_ban(GUILD, MEMBER, MODERATOR, "x")
        .await
        .unwrap();

    let err = harness.lifecycle.escalation().evaluate(&ban).await.unwrap_err();
    assert!(err.is_validation());
}
