//! Tests for the expiry reconciliation sweep.

mod test_utils;

use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use test_utils::{GUILD, GatewayCall, Harness, MEMBER, MODERATOR, MUTE_ROLE, MockOp, OTHER_MEMBER};
use tribunal_core::{InfractionKind, NewInfraction, Revoker};
use tribunal_interface::ModerationStore;
use tribunal_moderation::{ExpiryReconciler, PassReport};

const HOUR: Duration = Duration::from_secs(60 * 60);

fn reconciler(harness: &Harness) -> ExpiryReconciler {
    ExpiryReconciler::new(harness.store.clone(), harness.lifecycle.clone())
}

#[tokio::test]
async fn test_elapsed_mute_is_revoked_by_system() {
    let harness = Harness::new().await;
    let mute = harness
        .lifecycle
        .issue_mute(GUILD, MEMBER, MODERATOR, Some(HOUR), "cool off")
        .await
        .unwrap();

    let after = mute.issued_at + chrono::Duration::hours(1) + chrono::Duration::seconds(1);
    let report = reconciler(&harness).run_pass_at(after).await.unwrap();

    assert_eq!(
        report,
        PassReport {
            expired: 1,
            revoked: 1,
            failed: 0,
            skipped: false,
            locks_pruned: 1,
        }
    );
    let stored = harness.store.get_infraction(mute.id).await.unwrap().unwrap();
    assert!(stored.revoked);
    assert_eq!(stored.revoked_by, Some(Revoker::System));
    assert_eq!(stored.revoked_at, Some(after));
    assert!(
        harness
            .gateway
            .actions()
            .contains(&GatewayCall::RemoveRole(GUILD, MEMBER, MUTE_ROLE))
    );
    assert_eq!(harness.gateway.messages_to(MEMBER).len(), 2);
}

#[tokio::test]
async fn test_unexpired_and_permanent_mutes_are_left_alone() {
    let harness = Harness::new().await;
    let timed = harness
        .lifecycle
        .issue_mute(GUILD, MEMBER, MODERATOR, Some(HOUR), "timed")
        .await
        .unwrap();
    harness
        .lifecycle
        .issue_mute(GUILD, OTHER_MEMBER, MODERATOR, None, "forever")
        .await
        .unwrap();

    let before = timed.issued_at + chrono::Duration::minutes(59);
    let report = reconciler(&harness).run_pass_at(before).await.unwrap();

    assert_eq!(report.expired, 0);
    assert_eq!(harness.lifecycle.history(GUILD, OTHER_MEMBER, false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_one_failure_does_not_abort_the_pass() {
    let harness = Harness::new().await;
    let failing = harness
        .lifecycle
        .issue_mute(GUILD, MEMBER, MODERATOR, Some(HOUR), "first")
        .await
        .unwrap();
    let succeeding = harness
        .lifecycle
        .issue_mute(GUILD, OTHER_MEMBER, MODERATOR, Some(HOUR), "second")
        .await
        .unwrap();
    harness.gateway.fail_for(MockOp::RemoveRole, MEMBER);

    let after = succeeding.issued_at + chrono::Duration::hours(2);
    let report = reconciler(&harness).run_pass_at(after).await.unwrap();

    assert_eq!(report.expired, 2);
    assert_eq!(report.revoked, 1);
    assert_eq!(report.failed, 1);

    let failed = harness.store.get_infraction(failing.id).await.unwrap().unwrap();
    assert!(!failed.revoked);
    let revoked = harness.store.get_infraction(succeeding.id).await.unwrap().unwrap();
    assert_eq!(revoked.revoked_by, Some(Revoker::System));

    // The failed item is picked up again once the platform recovers.
    harness.gateway.clear_failures();
    let retry = reconciler(&harness).run_pass_at(after).await.unwrap();
    assert_eq!(retry.revoked, 1);
}

#[tokio::test]
async fn test_departed_receiver_is_revoked_without_platform_call() {
    let harness = Harness::new().await;
    let mute = harness
        .lifecycle
        .issue_mute(GUILD, MEMBER, MODERATOR, Some(HOUR), "left")
        .await
        .unwrap();
    harness.gateway.remove_member(GUILD, MEMBER);

    let after = mute.issued_at + chrono::Duration::hours(2);
    let report = reconciler(&harness).run_pass_at(after).await.unwrap();

    assert_eq!(report.revoked, 1);
    assert!(
        !harness
            .gateway
            .actions()
            .contains(&GatewayCall::RemoveRole(GUILD, MEMBER, MUTE_ROLE))
    );
}

#[tokio::test]
async fn test_sweep_keeps_role_while_newer_mute_is_active() {
    let harness = Harness::new().await;
    let stale = harness
        .store
        .insert_infraction(NewInfraction {
            guild_id: GUILD,
            receiver_id: MEMBER,
            issuer_id: MODERATOR,
            reason: "old mute".to_string(),
            issued_at: Utc::now() - chrono::Duration::hours(2),
            kind: InfractionKind::Mute { duration: Some(HOUR) },
        })
        .await
        .unwrap();
    let current = harness
        .lifecycle
        .issue_mute(GUILD, MEMBER, MODERATOR, None, "again")
        .await
        .unwrap();

    let report = reconciler(&harness).run_pass().await.unwrap();

    assert_eq!(report.expired, 1);
    assert_eq!(report.revoked, 1);
    let swept = harness.store.get_infraction(stale.id).await.unwrap().unwrap();
    assert_eq!(swept.revoked_by, Some(Revoker::System));
    assert!(
        !harness
            .gateway
            .actions()
            .contains(&GatewayCall::RemoveRole(GUILD, MEMBER, MUTE_ROLE))
    );
    let active = harness.lifecycle.active_mute(GUILD, MEMBER).await.unwrap();
    assert_eq!(active.map(|mute| mute.id), Some(current.id));
}

#[tokio::test]
async fn test_pass_prunes_idle_member_locks() {
    let harness = Harness::new().await;
    harness
        .lifecycle
        .issue_warning(GUILD, MEMBER, MODERATOR, "noise")
        .await
        .unwrap();
    harness
        .lifecycle
        .issue_warning(GUILD, OTHER_MEMBER, MODERATOR, "noise")
        .await
        .unwrap();
    assert_eq!(harness.lifecycle.locks().len(), 2);

    let report = reconciler(&harness).run_pass().await.unwrap();

    assert_eq!(report.locks_pruned, 2);
    assert!(harness.lifecycle.locks().is_empty());
}

#[tokio::test]
async fn test_pass_runs_housekeeping_hook() {
    let harness = Harness::new().await;
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let reconciler = reconciler(&harness).with_housekeeping(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    reconciler.run_pass().await.unwrap();
    reconciler.run_pass().await.unwrap();

    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_overlapping_pass_is_skipped() {
    let harness = Harness::new().await;
    let mute = harness
        .lifecycle
        .issue_mute(GUILD, MEMBER, MODERATOR, Some(HOUR), "slow")
        .await
        .unwrap();
    harness.gateway.set_delay(Duration::from_millis(300));

    let after = mute.issued_at + chrono::Duration::hours(2);
    let reconciler = reconciler(&harness);
    let running = {
        let reconciler = reconciler.clone();
        tokio::spawn(async move { reconciler.run_pass_at(after).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(reconciler.is_busy());
    let overlapping = reconciler.run_pass_at(after).await.unwrap();
    assert!(overlapping.skipped);
    assert_eq!(overlapping.expired, 0);

    let first = running.await.unwrap().unwrap();
    assert_eq!(first.revoked, 1);
    assert!(!reconciler.is_busy());
}

#[tokio::test]
async fn test_spawned_reconciler_sweeps_until_shutdown() {
    let harness = Arc::new(Harness::new().await);
    let stale = harness
        .store
        .insert_infraction(NewInfraction {
            guild_id: GUILD,
            receiver_id: MEMBER,
            issuer_id: MODERATOR,
            reason: "old mute".to_string(),
            issued_at: Utc::now() - chrono::Duration::hours(2),
            kind: InfractionKind::Mute { duration: Some(HOUR) },
        })
        .await
        .unwrap();

    let handle = reconciler(&harness).spawn(Duration::from_millis(20));

    let mut revoked = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let stored = harness.store.get_infraction(stale.id).await.unwrap().unwrap();
        if stored.revoked {
            revoked = true;
            break;
        }
    }
    assert!(revoked);

    handle.shutdown().await;
}
