//! Recording chat gateway with injectable failures.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tribunal_core::{ChannelId, GuildId, Rank, RoleId, UserId};
use tribunal_error::{GatewayError, GatewayErrorKind, GatewayResult};
use tribunal_interface::ChatGateway;

/// Mutating gateway operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    AddBan,
    RemoveBan,
    Kick,
    AddRole,
    RemoveRole,
    DirectMessage,
}

/// A recorded mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    AddBan(GuildId, UserId),
    RemoveBan(GuildId, UserId),
    Kick(GuildId, UserId),
    AddRole(GuildId, UserId, RoleId),
    RemoveRole(GuildId, UserId, RoleId),
    DirectMessage(UserId, String),
    ChannelMessage(ChannelId, String),
}

/// Mock gateway for testing.
#[derive(Debug)]
pub struct MockGateway {
    bot: UserId,
    ranks: Mutex<HashMap<(GuildId, UserId), Rank>>,
    owners: Mutex<HashSet<(GuildId, UserId)>>,
    failures: Mutex<HashSet<(MockOp, Option<UserId>)>>,
    calls: Mutex<Vec<GatewayCall>>,
    delay: Mutex<Option<Duration>>,
}

impl MockGateway {
    pub fn new(bot: UserId) -> Self {
        Self {
            bot,
            ranks: Mutex::new(HashMap::new()),
            owners: Mutex::new(HashSet::new()),
            failures: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
        }
    }

    pub fn set_rank(&self, guild_id: GuildId, user_id: UserId, rank: Rank) {
        self.ranks.lock().unwrap().insert((guild_id, user_id), rank);
    }

    pub fn remove_member(&self, guild_id: GuildId, user_id: UserId) {
        self.ranks.lock().unwrap().remove(&(guild_id, user_id));
    }

    pub fn set_owner(&self, guild_id: GuildId, user_id: UserId) {
        self.owners.lock().unwrap().insert((guild_id, user_id));
    }

    /// Fail `op` for every user.
    pub fn fail(&self, op: MockOp) {
        self.failures.lock().unwrap().insert((op, None));
    }

    /// Fail `op` only when it targets `user_id`.
    pub fn fail_for(&self, op: MockOp, user_id: UserId) {
        self.failures.lock().unwrap().insert((op, Some(user_id)));
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// Delay role removal, to hold a reconciliation pass open.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than direct messages.
    pub fn actions(&self) -> Vec<GatewayCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, GatewayCall::DirectMessage(..)))
            .collect()
    }

    pub fn messages_to(&self, user_id: UserId) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::DirectMessage(target, content) if target == user_id => Some(content),
                _ => None,
            })
            .collect()
    }

    fn attempt(&self, op: MockOp, user_id: UserId, call: GatewayCall) -> GatewayResult<()> {
        let failures = self.failures.lock().unwrap();
        if failures.contains(&(op, None)) || failures.contains(&(op, Some(user_id))) {
            return Err(GatewayError::new(GatewayErrorKind::Unavailable(format!(
                "{:?} failed for {}",
                op, user_id
            ))));
        }
        drop(failures);
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl ChatGateway for MockGateway {
    async fn add_ban(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        _reason: &str,
    ) -> GatewayResult<()> {
        self.attempt(MockOp::AddBan, user_id, GatewayCall::AddBan(guild_id, user_id))
    }

    async fn remove_ban(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        _reason: &str,
    ) -> GatewayResult<()> {
        self.attempt(MockOp::RemoveBan, user_id, GatewayCall::RemoveBan(guild_id, user_id))
    }

    async fn kick(&self, guild_id: GuildId, user_id: UserId, _reason: &str) -> GatewayResult<()> {
        self.attempt(MockOp::Kick, user_id, GatewayCall::Kick(guild_id, user_id))
    }

    async fn add_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> GatewayResult<()> {
        self.attempt(
            MockOp::AddRole,
            user_id,
            GatewayCall::AddRole(guild_id, user_id, role_id),
        )
    }

    async fn remove_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> GatewayResult<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.attempt(
            MockOp::RemoveRole,
            user_id,
            GatewayCall::RemoveRole(guild_id, user_id, role_id),
        )
    }

    async fn send_direct_message(&self, user_id: UserId, content: &str) -> GatewayResult<()> {
        self.attempt(
            MockOp::DirectMessage,
            user_id,
            GatewayCall::DirectMessage(user_id, content.to_string()),
        )
    }

    async fn send_channel_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> GatewayResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(GatewayCall::ChannelMessage(channel_id, content.to_string()));
        Ok(())
    }

    async fn get_member_rank(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> GatewayResult<Option<Rank>> {
        Ok(self.ranks.lock().unwrap().get(&(guild_id, user_id)).copied())
    }

    async fn is_guild_owner(&self, guild_id: GuildId, user_id: UserId) -> GatewayResult<bool> {
        Ok(self.owners.lock().unwrap().contains(&(guild_id, user_id)))
    }

    fn bot_user_id(&self) -> UserId {
        self.bot
    }
}
