//! Notifier that writes moderation events to the log.

use async_trait::async_trait;
use tracing::{info, warn};
use tribunal_core::ModerationEvent;
use tribunal_error::GatewayResult;
use tribunal_interface::ModerationNotifier;

/// Emits each event as a structured `info!` record with a JSON payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Create a notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModerationNotifier for TracingNotifier {
    async fn notify(&self, event: &ModerationEvent) -> GatewayResult<()> {
        match serde_json::to_string(event) {
            Ok(payload) => info!(
                event = event.label(),
                guild_id = %event.guild_id(),
                payload = %payload,
                "Moderation event"
            ),
            Err(err) => warn!(
                event = event.label(),
                error = %err,
                "Could not serialize moderation event"
            ),
        }
        Ok(())
    }
}
