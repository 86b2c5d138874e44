//! Notifier that posts moderation events to a guild's log channel.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};
use tribunal_core::{InfractionKind, ModerationEvent, Revoker};
use tribunal_error::{GatewayError, GatewayErrorKind, GatewayResult};
use tribunal_interface::{ChatGateway, ModerationNotifier, ModerationStore};

fn mention(user_id: impl std::fmt::Display) -> String {
    format!("<@{}>", user_id)
}

fn duration_suffix(kind: &InfractionKind) -> String {
    match kind.duration() {
        Some(duration) => format!(" for {}s", duration.as_secs()),
        None if matches!(kind, InfractionKind::Mute { .. }) => " permanently".to_string(),
        None => String::new(),
    }
}

/// Render an event as a single log-channel line.
pub fn format_event(event: &ModerationEvent) -> String {
    match event {
        ModerationEvent::InfractionIssued { infraction } => format!(
            "Infraction #{} ({}) issued to {} by {}{}: {}",
            infraction.id,
            infraction.infraction_type(),
            mention(infraction.receiver_id),
            mention(infraction.issuer_id),
            duration_suffix(&infraction.kind),
            infraction.reason
        ),
        ModerationEvent::TransientActionTaken { action } => format!(
            "{} of {} by {}: {}",
            action.kind,
            mention(action.receiver_id),
            mention(action.issuer_id),
            action.reason
        ),
        ModerationEvent::InfractionAppealed { infraction } => format!(
            "Infraction #{} ({}) appealed by {}: {}",
            infraction.id,
            infraction.infraction_type(),
            mention(infraction.receiver_id),
            infraction.appeal_message.as_deref().unwrap_or_default()
        ),
        ModerationEvent::InfractionRevoked { infraction } => {
            let revoker = match infraction.revoked_by {
                Some(Revoker::Moderator(user_id)) => mention(user_id),
                Some(Revoker::System) => "the system (expired)".to_string(),
                None => "unknown".to_string(),
            };
            format!(
                "Infraction #{} ({}) against {} revoked by {}",
                infraction.id,
                infraction.infraction_type(),
                mention(infraction.receiver_id),
                revoker
            )
        }
        ModerationEvent::EscalationTriggered { warning_id, rule } => format!(
            "Warning #{} reached {} active warnings, applying {}",
            warning_id, rule.warning_count, rule.punishment
        ),
    }
}

/// Posts each event to the log channel configured in the guild's settings.
///
/// Guilds without a log channel are skipped silently.
#[derive(Clone)]
pub struct LogChannelNotifier {
    gateway: Arc<dyn ChatGateway>,
    store: Arc<dyn ModerationStore>,
}

impl std::fmt::Debug for LogChannelNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogChannelNotifier").finish_non_exhaustive()
    }
}

impl LogChannelNotifier {
    /// Create a notifier posting through `gateway` and reading settings from `store`.
    pub fn new(gateway: Arc<dyn ChatGateway>, store: Arc<dyn ModerationStore>) -> Self {
        Self { gateway, store }
    }
}

#[async_trait]
impl ModerationNotifier for LogChannelNotifier {
    #[instrument(skip(self, event), fields(event = event.label(), guild_id = %event.guild_id()))]
    async fn notify(&self, event: &ModerationEvent) -> GatewayResult<()> {
        let settings = self
            .store
            .get_guild_settings(event.guild_id())
            .await
            .map_err(|err| {
                GatewayError::new(GatewayErrorKind::Unavailable(format!(
                    "Could not load guild settings: {}",
                    err
                )))
            })?;

        let Some(channel_id) = settings.log_channel_id else {
            debug!("No log channel configured");
            return Ok(());
        };

        self.gateway
            .send_channel_message(channel_id, &format_event(event))
            .await
    }
}
