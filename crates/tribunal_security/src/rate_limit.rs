//! Per-actor fixed-window invocation limiting.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};
use tribunal_core::{ActorContext, GuildId, UserId};

/// Rate limit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Invocations allowed per window
    pub limit: u32,
    /// Window length
    pub period: Duration,
}

impl RateLimit {
    /// Create a new rate limit.
    pub fn new(limit: u32, period: Duration) -> Self {
        Self { limit, period }
    }

    /// Limit expressed in whole seconds.
    pub fn per_secs(limit: u32, period_secs: u64) -> Self {
        Self::new(limit, Duration::from_secs(period_secs))
    }
}

/// Identity a window is tracked under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateLimitKey {
    /// Invoking member
    pub user_id: UserId,
    /// Guild, absent for private contexts
    pub guild_id: Option<GuildId>,
}

impl RateLimitKey {
    /// Key scoped to a guild.
    pub fn new(user_id: UserId, guild_id: Option<GuildId>) -> Self {
        Self { user_id, guild_id }
    }

    /// Key for the actor's current invocation.
    pub fn for_actor(actor: &ActorContext) -> Self {
        let guild_id = (!actor.is_private()).then_some(*actor.guild_id());
        Self::new(*actor.user_id(), guild_id)
    }
}

impl std::fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.guild_id {
            Some(guild_id) => write!(f, "{}:{}", self.user_id, guild_id),
            None => write!(f, "{}:dm", self.user_id),
        }
    }
}

/// Conditions that skip rate limiting entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BypassFlags {
    /// Invocation came through a private context
    pub private_context: bool,
    /// Actor is a guild administrator
    pub administrator: bool,
}

impl BypassFlags {
    /// No bypass.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether any flag short-circuits the check.
    pub fn any(&self) -> bool {
        self.private_context || self.administrator
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Invocation may proceed
    Allow,
    /// Invocation is over the limit
    Deny {
        /// Time until the current window closes
        remaining: Duration,
    },
}

impl RateLimitDecision {
    /// Whether the invocation may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allow)
    }
}

/// Window tracked for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    /// When the window opened
    pub started: Instant,
    /// Invocations counted in the window
    pub count: u32,
    /// Period the window was opened with
    pub period: Duration,
}

impl RateLimitWindow {
    fn open(now: Instant, period: Duration) -> Self {
        Self {
            started: now,
            count: 1,
            period,
        }
    }

    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }
}

/// Shared window map. Clones of a limiter share one state.
pub type RateLimitState = Arc<DashMap<RateLimitKey, RateLimitWindow>>;

/// Per-actor rate limiter.
///
/// Each key's window is updated under its map entry lock, so concurrent
/// invocations from one actor are counted exactly once each.
#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    windows: RateLimitState,
}

impl RateLimiter {
    /// Create a limiter with its own empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a limiter over an existing state map.
    pub fn with_state(windows: RateLimitState) -> Self {
        Self { windows }
    }

    /// Shared handle to the window map.
    pub fn state(&self) -> RateLimitState {
        Arc::clone(&self.windows)
    }

    /// Check and count an invocation now.
    pub fn check(
        &self,
        key: RateLimitKey,
        limit: RateLimit,
        bypass: BypassFlags,
    ) -> RateLimitDecision {
        self.check_at(key, limit, bypass, Instant::now())
    }

    /// Check and count an invocation at `now`.
    #[instrument(skip(self), fields(key = %key))]
    pub fn check_at(
        &self,
        key: RateLimitKey,
        limit: RateLimit,
        bypass: BypassFlags,
        now: Instant,
    ) -> RateLimitDecision {
        if bypass.any() {
            debug!("Rate limit bypassed");
            return RateLimitDecision::Allow;
        }

        let mut window = self
            .windows
            .entry(key)
            .or_insert_with(|| RateLimitWindow {
                started: now,
                count: 0,
                period: limit.period,
            });

        if window.count == 0 || window.age(now) >= limit.period {
            *window = RateLimitWindow::open(now, limit.period);
            debug!("Opened new rate limit window");
            return RateLimitDecision::Allow;
        }

        window.count = window.count.saturating_add(1);
        window.period = limit.period;
        if window.count <= limit.limit {
            debug!(count = window.count, limit = limit.limit, "Rate limit check passed");
            RateLimitDecision::Allow
        } else {
            let remaining = limit.period.saturating_sub(window.age(now));
            debug!(
                count = window.count,
                remaining_ms = remaining.as_millis() as u64,
                "Rate limit exceeded"
            );
            RateLimitDecision::Deny { remaining }
        }
    }

    /// Drop windows whose period has elapsed. Returns the number removed.
    pub fn purge_stale(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| window.age(now) < window.period);
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!(removed, "Purged stale rate limit windows");
        }
        removed
    }

    /// Number of tracked windows.
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Current window for a key.
    pub fn window(&self, key: &RateLimitKey) -> Option<RateLimitWindow> {
        self.windows.get(key).map(|window| *window)
    }
}
