//! Test utilities for runtime tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tribunal::{
    ActorContext, ActorContextBuilder, ChannelId, ChatGateway, GatewayResult, GuildId, Rank,
    RoleId, UserId,
};

pub const GUILD: GuildId = GuildId(1);
pub const CHANNEL: ChannelId = ChannelId(50);
pub const MODERATOR: UserId = UserId(10);
pub const MEMBER: UserId = UserId(20);
pub const BOT: UserId = UserId(1000);
pub const HELPER_ROLE: RoleId = RoleId(300);
pub const MUTE_ROLE: RoleId = RoleId(777);

/// Gateway with fixed ranks that records role changes.
pub struct StaticGateway {
    ranks: HashMap<UserId, Rank>,
    roles: Mutex<Vec<(UserId, RoleId, bool)>>,
}

impl StaticGateway {
    pub fn new() -> Self {
        Self {
            ranks: HashMap::from([(MODERATOR, Rank(50)), (MEMBER, Rank(10)), (BOT, Rank(100))]),
            roles: Mutex::new(Vec::new()),
        }
    }

    /// `(user, role, granted)` for every role change, in order.
    pub fn role_changes(&self) -> Vec<(UserId, RoleId, bool)> {
        self.roles.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatGateway for StaticGateway {
    async fn add_ban(&self, _: GuildId, _: UserId, _: &str) -> GatewayResult<()> {
        Ok(())
    }

    async fn remove_ban(&self, _: GuildId, _: UserId, _: &str) -> GatewayResult<()> {
        Ok(())
    }

    async fn kick(&self, _: GuildId, _: UserId, _: &str) -> GatewayResult<()> {
        Ok(())
    }

    async fn add_role(&self, _: GuildId, user_id: UserId, role_id: RoleId) -> GatewayResult<()> {
        self.roles.lock().unwrap().push((user_id, role_id, true));
        Ok(())
    }

    async fn remove_role(&self, _: GuildId, user_id: UserId, role_id: RoleId) -> GatewayResult<()> {
        self.roles.lock().unwrap().push((user_id, role_id, false));
        Ok(())
    }

    async fn send_direct_message(&self, _: UserId, _: &str) -> GatewayResult<()> {
        Ok(())
    }

    async fn send_channel_message(&self, _: ChannelId, _: &str) -> GatewayResult<()> {
        Ok(())
    }

    async fn get_member_rank(&self, _: GuildId, user_id: UserId) -> GatewayResult<Option<Rank>> {
        Ok(self.ranks.get(&user_id).copied())
    }

    async fn is_guild_owner(&self, _: GuildId, _: UserId) -> GatewayResult<bool> {
        Ok(false)
    }

    fn bot_user_id(&self) -> UserId {
        BOT
    }
}

/// A non-owner, non-administrator invoking from a guild channel.
pub fn actor(user_id: UserId, roles: Vec<RoleId>) -> ActorContext {
    ActorContextBuilder::default()
        .user_id(user_id)
        .guild_id(GUILD)
        .channel_id(CHANNEL)
        .roles(roles)
        .build()
        .unwrap()
}
