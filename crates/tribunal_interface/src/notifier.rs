//! Moderation event sink.

use async_trait::async_trait;
use tribunal_core::ModerationEvent;
use tribunal_error::GatewayResult;

/// Receives moderation events for logging or alerting.
#[async_trait]
pub trait ModerationNotifier: Send + Sync {
    /// Deliver one event.
    async fn notify(&self, event: &ModerationEvent) -> GatewayResult<()>;
}
