//! Per-guild moderation settings.

use crate::{ChannelId, GuildId, RoleId};
use serde::{Deserialize, Serialize};

/// Moderation settings for a single guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSettings {
    /// Guild these settings belong to
    pub guild_id: GuildId,
    /// Role applied to muted members
    #[serde(default)]
    pub mute_role_id: Option<RoleId>,
    /// Channel receiving moderation log entries
    #[serde(default)]
    pub log_channel_id: Option<ChannelId>,
}

impl GuildSettings {
    /// Settings with nothing configured.
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            mute_role_id: None,
            log_channel_id: None,
        }
    }

    /// Set the mute role.
    pub fn with_mute_role(mut self, role_id: RoleId) -> Self {
        self.mute_role_id = Some(role_id);
        self
    }

    /// Set the log channel.
    pub fn with_log_channel(mut self, channel_id: ChannelId) -> Self {
        self.log_channel_id = Some(channel_id);
        self
    }
}
