//! Serenity-backed chat gateway.

use crate::mapping::{classify_status, rank_from_positions};
use async_trait::async_trait;
use serenity::http::Http;
use serenity::model::id as discord;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use tribunal_core::{ChannelId, GuildId, Rank, RoleId, UserId};
use tribunal_error::{GatewayError, GatewayErrorKind, GatewayResult};
use tribunal_interface::ChatGateway;

/// Messages deleted along with a softban or ban, in days.
const BAN_DELETE_MESSAGE_DAYS: u8 = 0;

fn status_of(err: &serenity::Error) -> Option<u16> {
    match err {
        serenity::Error::Http(http) => http.status_code().map(|status| status.as_u16()),
        _ => None,
    }
}

fn gateway_error(
    err: serenity::Error,
    action: &str,
    target: Option<(GuildId, UserId)>,
) -> GatewayError {
    let kind = classify_status(status_of(&err), action, target, err.to_string());
    error!(action, error = %err, "Discord call failed");
    GatewayError::new(kind)
}

fn guild(guild_id: GuildId) -> discord::GuildId {
    discord::GuildId::new(guild_id.get())
}

fn user(user_id: UserId) -> discord::UserId {
    discord::UserId::new(user_id.get())
}

/// [`ChatGateway`] calling the Discord REST API.
///
/// Holds no cache; ranks and ownership are read fresh on every call.
pub struct SerenityGateway {
    http: Arc<Http>,
    bot_user_id: UserId,
}

impl std::fmt::Debug for SerenityGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerenityGateway")
            .field("bot_user_id", &self.bot_user_id)
            .finish_non_exhaustive()
    }
}

impl SerenityGateway {
    /// Create a gateway with its own HTTP client and resolve the bot's user id.
    ///
    /// # Errors
    ///
    /// Returns an API error if the token is rejected.
    #[instrument(skip(token), fields(token_len = token.as_ref().len()))]
    pub async fn connect(token: impl AsRef<str>) -> GatewayResult<Self> {
        let http = Arc::new(Http::new(token.as_ref()));
        let current = http
            .get_current_user()
            .await
            .map_err(|e| gateway_error(e, "get_current_user", None))?;
        info!(bot_user_id = %current.id, "Connected to Discord HTTP API");
        Ok(Self::with_http_client(http, UserId(current.id.get())))
    }

    /// Wrap an existing HTTP client, sharing its rate-limit buckets.
    pub fn with_http_client(http: Arc<Http>, bot_user_id: UserId) -> Self {
        Self { http, bot_user_id }
    }

    /// The underlying HTTP client.
    pub fn http_client(&self) -> Arc<Http> {
        Arc::clone(&self.http)
    }
}

#[async_trait]
impl ChatGateway for SerenityGateway {
    #[instrument(skip(self, reason))]
    async fn add_ban(&self, guild_id: GuildId, user_id: UserId, reason: &str) -> GatewayResult<()> {
        self.http
            .ban_user(guild(guild_id), user(user_id), BAN_DELETE_MESSAGE_DAYS, Some(reason))
            .await
            .map_err(|e| gateway_error(e, "ban", None))
    }

    #[instrument(skip(self, reason))]
    async fn remove_ban(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
    ) -> GatewayResult<()> {
        self.http
            .remove_ban(guild(guild_id), user(user_id), Some(reason))
            .await
            .map_err(|e| gateway_error(e, "unban", None))
    }

    #[instrument(skip(self, reason))]
    async fn kick(&self, guild_id: GuildId, user_id: UserId, reason: &str) -> GatewayResult<()> {
        self.http
            .kick_member(guild(guild_id), user(user_id), Some(reason))
            .await
            .map_err(|e| gateway_error(e, "kick", Some((guild_id, user_id))))
    }

    #[instrument(skip(self))]
    async fn add_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> GatewayResult<()> {
        self.http
            .add_member_role(
                guild(guild_id),
                user(user_id),
                discord::RoleId::new(role_id.get()),
                None,
            )
            .await
            .map_err(|e| gateway_error(e, "add_role", Some((guild_id, user_id))))
    }

    #[instrument(skip(self))]
    async fn remove_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> GatewayResult<()> {
        self.http
            .remove_member_role(
                guild(guild_id),
                user(user_id),
                discord::RoleId::new(role_id.get()),
                None,
            )
            .await
            .map_err(|e| gateway_error(e, "remove_role", Some((guild_id, user_id))))
    }

    #[instrument(skip(self, content))]
    async fn send_direct_message(&self, user_id: UserId, content: &str) -> GatewayResult<()> {
        let channel = self
            .http
            .create_private_channel(&serde_json::json!({ "recipient_id": user_id.get() }))
            .await
            .map_err(|e| gateway_error(e, "create_dm", None))?;

        channel.id.say(&self.http, content).await.map_err(|e| {
            if status_of(&e) == Some(403) {
                debug!(user_id = %user_id, "Receiver does not accept direct messages");
                GatewayError::new(GatewayErrorKind::DirectMessagesClosed(user_id.get()))
            } else {
                gateway_error(e, "send_dm", None)
            }
        })?;
        Ok(())
    }

    #[instrument(skip(self, content))]
    async fn send_channel_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> GatewayResult<()> {
        discord::ChannelId::new(channel_id.get())
            .say(&self.http, content)
            .await
            .map_err(|e| gateway_error(e, "send_channel_message", None))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_member_rank(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> GatewayResult<Option<Rank>> {
        let member = match self.http.get_member(guild(guild_id), user(user_id)).await {
            Ok(member) => member,
            Err(e) if status_of(&e) == Some(404) => {
                debug!("User is not a member");
                return Ok(None);
            }
            Err(e) => return Err(gateway_error(e, "get_member", Some((guild_id, user_id)))),
        };

        let roles = self
            .http
            .get_guild_roles(guild(guild_id))
            .await
            .map_err(|e| gateway_error(e, "get_guild_roles", None))?;
        let positions: HashMap<u64, u16> = roles
            .iter()
            .map(|role| (role.id.get(), role.position))
            .collect();
        let member_roles: Vec<u64> = member.roles.iter().map(|role| role.get()).collect();

        let rank = rank_from_positions(&member_roles, &positions);
        debug!(%rank, "Resolved member rank");
        Ok(Some(rank))
    }

    #[instrument(skip(self))]
    async fn is_guild_owner(&self, guild_id: GuildId, user_id: UserId) -> GatewayResult<bool> {
        let partial = self
            .http
            .get_guild(guild(guild_id))
            .await
            .map_err(|e| gateway_error(e, "get_guild", None))?;
        Ok(partial.owner_id.get() == user_id.get())
    }

    fn bot_user_id(&self) -> UserId {
        self.bot_user_id
    }
}
