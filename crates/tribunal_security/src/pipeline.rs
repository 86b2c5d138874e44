//! Ordered command-check pipeline.
//!
//! Each moderation command is registered with a [`CommandGuard`], a fixed,
//! ordered list of [`CommandCheck`]s. The router calls
//! [`CommandGuard::authorize`] before dispatching; the first check that denies
//! ends the pipeline and its error is surfaced to the invoker.

use crate::{
    BypassFlags, PermissionResolver, RateLimit, RateLimitDecision, RateLimitKey, RateLimiter,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use tribunal_core::{ActorContext, CommandRef};
use tribunal_error::{ModerationError, ModerationErrorKind, ModerationResult};
use tribunal_interface::ModerationStore;

/// A command invocation under inspection.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Invoking member
    pub actor: &'a ActorContext,
    /// Command being invoked
    pub command: &'a CommandRef,
}

/// Outcome of a single check.
#[derive(Debug)]
pub enum Verdict {
    /// Continue to the next check
    Allow,
    /// Stop and surface the error
    Deny(ModerationError),
}

/// One step of the pipeline.
///
/// Returning `Err` means the check itself failed (e.g. the store was
/// unreachable), which also stops the pipeline.
#[async_trait]
pub trait CommandCheck: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Inspect the invocation.
    async fn check(&self, invocation: &Invocation<'_>) -> ModerationResult<Verdict>;
}

/// Ordered list of checks fixed at registration time.
#[derive(Clone, Default)]
pub struct CommandGuard {
    checks: Vec<Arc<dyn CommandCheck>>,
}

impl std::fmt::Debug for CommandGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandGuard")
            .field("checks", &self.check_names())
            .finish()
    }
}

impl CommandGuard {
    /// Guard with no checks; allows everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard moderation guard: rate limit, then permission rules.
    pub fn standard(rate_limit: RateLimitCheck, permissions: PermissionCheck) -> Self {
        Self::new().with_check(rate_limit).with_check(permissions)
    }

    /// Append a check to the end of the pipeline.
    pub fn with_check(mut self, check: impl CommandCheck + 'static) -> Self {
        self.checks.push(Arc::new(check));
        self
    }

    /// Append a shared check.
    pub fn with_shared_check(mut self, check: Arc<dyn CommandCheck>) -> Self {
        self.checks.push(check);
        self
    }

    /// Check names in execution order.
    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|check| check.name()).collect()
    }

    /// Run every check in order.
    ///
    /// # Errors
    ///
    /// Returns the denying check's error, or the error of a check that failed.
    #[instrument(
        skip(self, actor),
        fields(
            user_id = %actor.user_id(),
            guild_id = %actor.guild_id(),
            command = %command.name
        )
    )]
    pub async fn authorize(
        &self,
        actor: &ActorContext,
        command: &CommandRef,
    ) -> ModerationResult<()> {
        let invocation = Invocation { actor, command };
        for check in &self.checks {
            debug!(check = check.name(), "Running command check");
            match check.check(&invocation).await? {
                Verdict::Allow => continue,
                Verdict::Deny(err) => {
                    info!(check = check.name(), error = %err, "Command denied");
                    return Err(err);
                }
            }
        }
        debug!("All command checks passed");
        Ok(())
    }
}

/// Guards keyed by command name, with a fallback for unregistered commands.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    fallback: CommandGuard,
    guards: HashMap<String, CommandGuard>,
}

impl CommandRegistry {
    /// Registry whose unregistered commands use `fallback`.
    pub fn new(fallback: CommandGuard) -> Self {
        Self {
            fallback,
            guards: HashMap::new(),
        }
    }

    /// Register a guard for a command name (case-insensitive).
    pub fn register(&mut self, command: impl AsRef<str>, guard: CommandGuard) {
        self.guards
            .insert(command.as_ref().to_ascii_lowercase(), guard);
    }

    /// Guard that applies to a command.
    pub fn guard_for(&self, command: &CommandRef) -> &CommandGuard {
        self.guards
            .get(&command.name.to_ascii_lowercase())
            .unwrap_or(&self.fallback)
    }

    /// Authorize an invocation through its command's guard.
    pub async fn authorize(
        &self,
        actor: &ActorContext,
        command: &CommandRef,
    ) -> ModerationResult<()> {
        self.guard_for(command).authorize(actor, command).await
    }
}

/// Rate limit step backed by a shared [`RateLimiter`].
#[derive(Debug, Clone)]
pub struct RateLimitCheck {
    limiter: RateLimiter,
    limit: RateLimit,
    bypass_administrators: bool,
    bypass_private: bool,
}

impl RateLimitCheck {
    /// Check with administrator and private-context bypass enabled.
    pub fn new(limiter: RateLimiter, limit: RateLimit) -> Self {
        Self {
            limiter,
            limit,
            bypass_administrators: true,
            bypass_private: true,
        }
    }

    /// Set whether administrators skip the limit.
    pub fn bypass_administrators(mut self, bypass: bool) -> Self {
        self.bypass_administrators = bypass;
        self
    }

    /// Set whether private-context invocations skip the limit.
    pub fn bypass_private(mut self, bypass: bool) -> Self {
        self.bypass_private = bypass;
        self
    }

    fn bypass_flags(&self, actor: &ActorContext) -> BypassFlags {
        BypassFlags {
            private_context: self.bypass_private && actor.is_private(),
            administrator: self.bypass_administrators && actor.is_administrator(),
        }
    }
}

#[async_trait]
impl CommandCheck for RateLimitCheck {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    async fn check(&self, invocation: &Invocation<'_>) -> ModerationResult<Verdict> {
        let key = RateLimitKey::for_actor(invocation.actor);
        match self
            .limiter
            .check(key, self.limit, self.bypass_flags(invocation.actor))
        {
            RateLimitDecision::Allow => Ok(Verdict::Allow),
            RateLimitDecision::Deny { remaining } => Ok(Verdict::Deny(ModerationError::new(
                ModerationErrorKind::RateLimited {
                    actor: key.to_string(),
                    remaining_ms: u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
                },
            ))),
        }
    }
}

/// Permission step that loads the guild's rules from the store.
#[derive(Clone)]
pub struct PermissionCheck {
    store: Arc<dyn ModerationStore>,
    resolver: PermissionResolver,
}

impl std::fmt::Debug for PermissionCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionCheck").finish_non_exhaustive()
    }
}

impl PermissionCheck {
    /// Create a permission step over a store.
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self {
            store,
            resolver: PermissionResolver::new(),
        }
    }
}

#[async_trait]
impl CommandCheck for PermissionCheck {
    fn name(&self) -> &'static str {
        "permission"
    }

    async fn check(&self, invocation: &Invocation<'_>) -> ModerationResult<Verdict> {
        if invocation.actor.is_guild_owner() {
            return Ok(Verdict::Allow);
        }
        let rules = self
            .store
            .list_permission_rules(*invocation.actor.guild_id())
            .await?;
        match self
            .resolver
            .check(invocation.actor, invocation.command, &rules)
        {
            Ok(_) => Ok(Verdict::Allow),
            Err(err) => Ok(Verdict::Deny(err)),
        }
    }
}
