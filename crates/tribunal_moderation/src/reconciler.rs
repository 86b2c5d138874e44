//! Periodic sweep revoking expired time-bound infractions.

use crate::InfractionLifecycle;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use tribunal_error::ModerationResult;
use tribunal_interface::ModerationStore;

/// Summary of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Expired infractions found
    pub expired: usize,
    /// Infractions revoked by this pass
    pub revoked: usize,
    /// Infractions that could not be revoked and stay for the next pass
    pub failed: usize,
    /// Whether the pass was dropped because another was running
    pub skipped: bool,
    /// Idle member locks released after the pass
    pub locks_pruned: usize,
}

impl PassReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Clears the busy flag when a pass ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Work run at the end of every completed pass.
pub type Housekeeping = Arc<dyn Fn() + Send + Sync>;

/// Revokes mutes whose duration has elapsed.
///
/// At most one pass runs at a time; a pass requested while another is in
/// flight returns immediately with [`PassReport::skipped`] set. After each
/// pass the lifecycle's idle member locks are pruned and the housekeeping
/// hook, if any, runs.
#[derive(Clone)]
pub struct ExpiryReconciler {
    store: Arc<dyn ModerationStore>,
    lifecycle: InfractionLifecycle,
    busy: Arc<AtomicBool>,
    housekeeping: Option<Housekeeping>,
}

impl std::fmt::Debug for ExpiryReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryReconciler")
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

impl ExpiryReconciler {
    /// Create a reconciler revoking through `lifecycle`.
    pub fn new(store: Arc<dyn ModerationStore>, lifecycle: InfractionLifecycle) -> Self {
        Self {
            store,
            lifecycle,
            busy: Arc::new(AtomicBool::new(false)),
            housekeeping: None,
        }
    }

    /// Run `hook` after every completed pass, e.g. to purge rate-limit windows.
    pub fn with_housekeeping(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.housekeeping = Some(Arc::new(hook));
        self
    }

    /// Whether a pass is running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run one pass now.
    pub async fn run_pass(&self) -> ModerationResult<PassReport> {
        self.run_pass_at(Utc::now()).await
    }

    /// Run one pass treating `now` as the current time.
    ///
    /// Failures on individual infractions are logged and counted; the pass
    /// carries on with the rest.
    ///
    /// # Errors
    ///
    /// Returns the store error if the expired set cannot be listed.
    #[instrument(skip(self))]
    pub async fn run_pass_at(&self, now: DateTime<Utc>) -> ModerationResult<PassReport> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Previous pass still running, skipping");
            return Ok(PassReport::skipped());
        }
        let _busy = BusyGuard(&self.busy);

        let expired = self.store.list_expired(now).await.inspect_err(|err| {
            error!(error = %err, "Could not list expired infractions, abandoning pass");
        })?;

        let mut report = PassReport {
            expired: expired.len(),
            ..PassReport::default()
        };
        for infraction in &expired {
            match self.lifecycle.expire(infraction, now).await {
                Ok(_) => report.revoked += 1,
                Err(err) if err.is_conflict() => {
                    debug!(infraction_id = %infraction.id, "Already revoked by someone else");
                }
                Err(err) => {
                    warn!(
                        infraction_id = %infraction.id,
                        error = %err,
                        "Could not expire infraction"
                    );
                    report.failed += 1;
                }
            }
        }

        report.locks_pruned = self.lifecycle.locks().prune();
        if let Some(hook) = &self.housekeeping {
            hook();
        }

        if report.expired > 0 {
            info!(
                expired = report.expired,
                revoked = report.revoked,
                failed = report.failed,
                locks_pruned = report.locks_pruned,
                "Expiry pass complete"
            );
        } else {
            debug!(locks_pruned = report.locks_pruned, "Expiry pass found nothing to do");
        }
        Ok(report)
    }

    /// Run passes on a fixed interval until the handle is shut down.
    ///
    /// Each tick starts its pass on its own task, so a slow pass makes later
    /// ticks skip rather than queue.
    pub fn spawn(self, interval: Duration) -> ReconcilerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        info!(?interval, "Starting expiry reconciler");

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if self.is_busy() {
                            debug!("Tick dropped, pass in flight");
                            continue;
                        }
                        let reconciler = self.clone();
                        tokio::spawn(async move {
                            if let Err(err) = reconciler.run_pass().await {
                                error!(error = %err, "Expiry pass failed");
                            }
                        });
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            info!("Expiry reconciler stopped");
                            break;
                        }
                    }
                }
            }
        });

        ReconcilerHandle { shutdown_tx, task }
    }
}

/// Control handle for a spawned reconciler.
#[derive(Debug)]
pub struct ReconcilerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// Stop the timer and wait for the loop to exit.
    ///
    /// A pass already in flight finishes on its own task.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(err) = self.task.await {
            error!(error = %err, "Reconciler task ended abnormally");
        }
    }

    /// Whether the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
