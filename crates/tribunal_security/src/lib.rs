//! Command gating for Tribunal: who may invoke what, and how often.
//!
//! # Architecture
//!
//! Before a moderation command runs, the upstream router passes the invocation
//! through a [`CommandGuard`], an ordered list of [`CommandCheck`]s fixed at
//! registration time. The standard order is:
//!
//! 1. **Rate Limit Layer** - [`RateLimiter`], a per-actor fixed window
//! 2. **Permission Layer** - [`PermissionResolver`], layered guild rules
//!
//! The first check that denies stops the pipeline.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod pipeline;
mod rate_limit;
mod resolver;

pub use pipeline::{
    CommandCheck, CommandGuard, CommandRegistry, Invocation, PermissionCheck, RateLimitCheck,
    Verdict,
};
pub use rate_limit::{
    BypassFlags, RateLimit, RateLimitDecision, RateLimitKey, RateLimitState, RateLimitWindow,
    RateLimiter,
};
pub use resolver::{Decision, PermissionResolver, Resolution};
