//! Invocation context supplied by the upstream command router.

use crate::{ChannelId, GuildId, RoleId, UserId};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// The member invoking a command, as seen at invocation time.
///
/// # Examples
///
/// ```
/// use tribunal_core::{ActorContextBuilder, ChannelId, GuildId, RoleId, UserId};
///
/// let actor = ActorContextBuilder::default()
///     .user_id(UserId(10))
///     .guild_id(GuildId(1))
///     .roles(vec![RoleId(300), RoleId(200)])
///     .channel_id(ChannelId(50))
///     .build()
///     .expect("valid actor");
///
/// assert!(!actor.is_guild_owner());
/// assert_eq!(actor.roles().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ActorContext {
    /// Invoking member
    user_id: UserId,
    /// Guild the command was invoked in
    guild_id: GuildId,
    /// Member roles, ordered by descending rank
    #[builder(default)]
    roles: Vec<RoleId>,
    /// Channel the command was invoked in
    channel_id: ChannelId,
    /// Whether the member owns the guild
    #[builder(default)]
    #[getter(skip)]
    is_guild_owner: bool,
    /// Whether the member holds the administrator permission
    #[builder(default)]
    #[getter(skip)]
    is_administrator: bool,
    /// Whether the command arrived through a private (direct message) context
    #[builder(default)]
    #[getter(skip)]
    is_private: bool,
}

impl ActorContext {
    /// Whether the member owns the guild.
    pub fn is_guild_owner(&self) -> bool {
        self.is_guild_owner
    }

    /// Whether the member holds the administrator permission.
    pub fn is_administrator(&self) -> bool {
        self.is_administrator
    }

    /// Whether the command arrived through a private context.
    pub fn is_private(&self) -> bool {
        self.is_private
    }
}

/// The command being invoked and the module it belongs to.
///
/// Permission rules may name either.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandRef {
    /// Command name (e.g. `warn`)
    pub name: String,
    /// Owning module name (e.g. `moderation`)
    pub module: Option<String>,
}

impl CommandRef {
    /// A command with no module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
        }
    }

    /// Attach the owning module.
    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Whether `key` names this command or its module, ignoring ASCII case.
    pub fn is_named_by(&self, key: &str) -> bool {
        self.name.eq_ignore_ascii_case(key)
            || self
                .module
                .as_deref()
                .is_some_and(|module| module.eq_ignore_ascii_case(key))
    }
}
