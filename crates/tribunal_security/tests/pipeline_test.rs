//! Tests for the ordered command-check pipeline.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tribunal_core::{ActorContext, ActorContextBuilder, ChannelId, CommandRef, GuildId, UserId};
use tribunal_error::{ModerationError, ModerationErrorKind, ModerationResult};
use tribunal_security::{
    CommandCheck, CommandGuard, CommandRegistry, Invocation, RateLimit, RateLimitCheck,
    RateLimiter, Verdict,
};

/// Check that records how often it ran and returns a fixed verdict.
struct FixedCheck {
    name: &'static str,
    deny: bool,
    calls: Arc<AtomicUsize>,
}

impl FixedCheck {
    fn new(name: &'static str, deny: bool) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name,
                deny,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl CommandCheck for FixedCheck {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn check(&self, _invocation: &Invocation<'_>) -> ModerationResult<Verdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.deny {
            Ok(Verdict::Deny(ModerationError::new(
                ModerationErrorKind::Authorization(format!("{} denied", self.name)),
            )))
        } else {
            Ok(Verdict::Allow)
        }
    }
}

fn actor() -> ActorContext {
    ActorContextBuilder::default()
        .user_id(UserId(10))
        .guild_id(GuildId(1))
        .channel_id(ChannelId(50))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_empty_guard_allows() {
    let guard = CommandGuard::new();
    assert!(guard.authorize(&actor(), &CommandRef::new("warn")).await.is_ok());
}

#[tokio::test]
async fn test_first_deny_short_circuits() {
    let (first, first_calls) = FixedCheck::new("first", true);
    let (second, second_calls) = FixedCheck::new("second", false);
    let guard = CommandGuard::new().with_check(first).with_check(second);

    let err = guard
        .authorize(&actor(), &CommandRef::new("warn"))
        .await
        .unwrap_err();

    assert!(err.is_authorization());
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_checks_run_in_registration_order() {
    let (first, _) = FixedCheck::new("first", false);
    let (second, _) = FixedCheck::new("second", false);
    let guard = CommandGuard::new().with_check(first).with_check(second);
    assert_eq!(guard.check_names(), vec!["first", "second"]);
}

#[tokio::test]
async fn test_rate_limit_check_denies_over_limit() {
    let limiter = RateLimiter::new();
    let guard = CommandGuard::new().with_check(RateLimitCheck::new(
        limiter.clone(),
        RateLimit::per_secs(2, 60),
    ));
    let command = CommandRef::new("warn");

    assert!(guard.authorize(&actor(), &command).await.is_ok());
    assert!(guard.authorize(&actor(), &command).await.is_ok());
    let err = guard.authorize(&actor(), &command).await.unwrap_err();

    match err.kind() {
        ModerationErrorKind::RateLimited { actor, remaining_ms } => {
            assert_eq!(actor, "10:1");
            assert!(*remaining_ms > 0 && *remaining_ms <= 60_000);
        }
        other => panic!("expected rate limit, got {other}"),
    }
    assert_eq!(limiter.window_count(), 1);
}

#[tokio::test]
async fn test_rate_limit_denial_precedes_later_checks() {
    let (later, later_calls) = FixedCheck::new("later", false);
    let guard = CommandGuard::new()
        .with_check(RateLimitCheck::new(RateLimiter::new(), RateLimit::per_secs(1, 60)))
        .with_check(later);
    let command = CommandRef::new("warn");

    guard.authorize(&actor(), &command).await.unwrap();
    assert!(guard.authorize(&actor(), &command).await.is_err());
    assert_eq!(later_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_administrator_bypasses_rate_limit() {
    let guard = CommandGuard::new().with_check(RateLimitCheck::new(
        RateLimiter::new(),
        RateLimit::per_secs(1, 60),
    ));
    let admin = ActorContextBuilder::default()
        .user_id(UserId(10))
        .guild_id(GuildId(1))
        .channel_id(ChannelId(50))
        .is_administrator(true)
        .build()
        .unwrap();

    for _ in 0..5 {
        assert!(guard.authorize(&admin, &CommandRef::new("warn")).await.is_ok());
    }
}

#[tokio::test]
async fn test_registry_falls_back_for_unregistered_commands() {
    let (deny, _) = FixedCheck::new("deny", true);
    let mut registry = CommandRegistry::new(CommandGuard::new());
    registry.register("Ban", CommandGuard::new().with_check(deny));

    assert!(registry.authorize(&actor(), &CommandRef::new("warn")).await.is_ok());
    assert!(registry.authorize(&actor(), &CommandRef::new("ban")).await.is_err());
}
