//! Wiring of the engine's components over a store, gateway and notifier.

use crate::TribunalConfig;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};
use tribunal_core::{ActorContext, CommandRef};
use tribunal_error::ModerationResult;
use tribunal_interface::{ChatGateway, ModerationNotifier, ModerationStore};
use tribunal_moderation::{
    EscalationEngine, ExpiryReconciler, InfractionLifecycle, ModerationAdmin, ReconcilerHandle,
};
use tribunal_security::{
    CommandGuard, CommandRegistry, PermissionCheck, PermissionResolver, RateLimitCheck,
    RateLimiter, Resolution,
};

/// Every engine component, sharing one store, gateway and notifier.
///
/// Cloning is cheap and shares all state, including rate-limit windows and
/// per-member locks.
#[derive(Clone)]
pub struct ModerationRuntime {
    config: TribunalConfig,
    store: Arc<dyn ModerationStore>,
    lifecycle: InfractionLifecycle,
    admin: ModerationAdmin,
    reconciler: ExpiryReconciler,
    limiter: RateLimiter,
    commands: CommandRegistry,
}

impl std::fmt::Debug for ModerationRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModerationRuntime")
            .field("config", &self.config)
            .field("lifecycle", &self.lifecycle)
            .field("reconciler", &self.reconciler)
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}

impl ModerationRuntime {
    /// Build the engine.
    ///
    /// Every command is guarded by the standard pipeline (rate limit, then
    /// permission rules) unless [`register_guard`](Self::register_guard)
    /// replaces it.
    #[instrument(skip_all)]
    pub fn new(
        config: TribunalConfig,
        store: Arc<dyn ModerationStore>,
        gateway: Arc<dyn ChatGateway>,
        notifier: Arc<dyn ModerationNotifier>,
    ) -> Self {
        let lifecycle = InfractionLifecycle::new(
            Arc::clone(&store),
            gateway,
            notifier,
            config.lifecycle(),
        );
        let limiter = RateLimiter::new();
        let swept = limiter.clone();
        let reconciler = ExpiryReconciler::new(Arc::clone(&store), lifecycle.clone())
            .with_housekeeping(move || {
                purge_stale_windows(&swept);
            });
        let commands = CommandRegistry::new(Self::standard_guard(&config, &store, &limiter));

        info!(
            rate_limit = ?config.rate_limit(),
            interval = ?config.reconciler_interval(),
            "Moderation runtime ready"
        );

        Self {
            admin: ModerationAdmin::new(Arc::clone(&store)),
            config,
            store,
            lifecycle,
            reconciler,
            limiter,
            commands,
        }
    }

    fn standard_guard(
        config: &TribunalConfig,
        store: &Arc<dyn ModerationStore>,
        limiter: &RateLimiter,
    ) -> CommandGuard {
        let rate_limit = RateLimitCheck::new(limiter.clone(), config.rate_limit())
            .bypass_administrators(config.rate_limit.bypass_administrators)
            .bypass_private(config.rate_limit.bypass_private);
        CommandGuard::standard(rate_limit, PermissionCheck::new(Arc::clone(store)))
    }

    /// The configuration the runtime was built with.
    pub fn config(&self) -> &TribunalConfig {
        &self.config
    }

    /// The shared store.
    pub fn store(&self) -> &Arc<dyn ModerationStore> {
        &self.store
    }

    /// Infraction issuance, appeal, revoke and queries.
    pub fn lifecycle(&self) -> &InfractionLifecycle {
        &self.lifecycle
    }

    /// Escalation rule administration.
    pub fn escalation(&self) -> &EscalationEngine {
        self.lifecycle.escalation()
    }

    /// Permission rule and guild settings administration.
    pub fn admin(&self) -> &ModerationAdmin {
        &self.admin
    }

    /// The expiry sweep, for running passes by hand.
    pub fn reconciler(&self) -> &ExpiryReconciler {
        &self.reconciler
    }

    /// Shared rate-limit windows.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Command guards.
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Replace the guard for one command.
    pub fn register_guard(&mut self, command: impl AsRef<str>, guard: CommandGuard) {
        self.commands.register(command, guard);
    }

    /// Run the command's guard for an invocation.
    ///
    /// # Errors
    ///
    /// `RateLimited` or `Authorization` from the first check that denies.
    pub async fn authorize(
        &self,
        actor: &ActorContext,
        command: &CommandRef,
    ) -> ModerationResult<()> {
        self.commands.authorize(actor, command).await
    }

    /// Explain which rule decides an invocation, without rate limiting.
    pub async fn explain(
        &self,
        actor: &ActorContext,
        command: &CommandRef,
    ) -> ModerationResult<Resolution> {
        let rules = self.store.list_permission_rules(*actor.guild_id()).await?;
        Ok(PermissionResolver::new().resolve(actor, command, &rules))
    }

    /// Drop rate-limit windows whose period has passed.
    ///
    /// Every reconciler pass does this too.
    pub fn purge_rate_limits(&self) -> usize {
        purge_stale_windows(&self.limiter)
    }

    /// Start the expiry sweep at the configured interval.
    ///
    /// Each pass also prunes idle member locks and stale rate-limit windows.
    pub fn start_reconciler(&self) -> ReconcilerHandle {
        self.reconciler.clone().spawn(self.config.reconciler_interval())
    }
}

fn purge_stale_windows(limiter: &RateLimiter) -> usize {
    let purged = limiter.purge_stale(Instant::now());
    debug!(purged, "Purged stale rate-limit windows");
    purged
}
