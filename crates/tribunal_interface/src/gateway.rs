//! Chat platform gateway.

use async_trait::async_trait;
use tribunal_core::{ChannelId, GuildId, Rank, RoleId, UserId};
use tribunal_error::GatewayResult;

/// Side effects and lookups against the chat platform.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Ban a user from a guild.
    async fn add_ban(&self, guild_id: GuildId, user_id: UserId, reason: &str) -> GatewayResult<()>;

    /// Lift a ban.
    async fn remove_ban(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
    ) -> GatewayResult<()>;

    /// Remove a member from a guild.
    async fn kick(&self, guild_id: GuildId, user_id: UserId, reason: &str) -> GatewayResult<()>;

    /// Grant a role to a member.
    async fn add_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId)
    -> GatewayResult<()>;

    /// Take a role away from a member.
    async fn remove_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> GatewayResult<()>;

    /// Send a direct message to a user.
    async fn send_direct_message(&self, user_id: UserId, content: &str) -> GatewayResult<()>;

    /// Post a message to a guild channel.
    async fn send_channel_message(&self, channel_id: ChannelId, content: &str)
    -> GatewayResult<()>;

    /// Rank of a member, or `None` when the user is not in the guild.
    async fn get_member_rank(&self, guild_id: GuildId, user_id: UserId)
    -> GatewayResult<Option<Rank>>;

    /// Whether the user owns the guild.
    async fn is_guild_owner(&self, guild_id: GuildId, user_id: UserId) -> GatewayResult<bool>;

    /// The bot's own user id; its rank bounds what the engine may act on.
    fn bot_user_id(&self) -> UserId;
}
