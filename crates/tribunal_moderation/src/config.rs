//! Lifecycle tuning.

use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tribunal_core::APPEALABLE_MUTE_THRESHOLD;

/// Knobs for [`crate::InfractionLifecycle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Setters)]
#[setters(prefix = "with_")]
pub struct LifecycleConfig {
    /// Mutes must be longer than this (or permanent) to be appealable
    pub appeal_threshold: Duration,
    /// Longest accepted appeal message, in characters
    pub max_appeal_length: usize,
    /// Whether receivers are messaged about actions taken against them
    pub direct_message_receivers: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            appeal_threshold: APPEALABLE_MUTE_THRESHOLD,
            max_appeal_length: 1000,
            direct_message_receivers: true,
        }
    }
}
