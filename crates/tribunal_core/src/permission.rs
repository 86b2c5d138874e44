//! Layered permission rules.

use crate::{CommandRef, GuildId, RuleId};
use serde::{Deserialize, Serialize};
use tribunal_error::{ModerationError, ModerationErrorKind, ModerationResult};

/// Layer a permission rule applies at.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleScope {
    /// Applies to every member of the guild and overrides all other layers
    Global,
    /// Guild-wide fallback, targeted at the guild id
    Guild,
    /// Applies to members holding a role
    Role,
    /// Applies to invocations in a channel
    Channel,
    /// Applies to a single member
    User,
}

impl RuleScope {
    /// Whether rules at this scope must name a target id.
    pub fn requires_target(self) -> bool {
        matches!(self, RuleScope::Role | RuleScope::Channel | RuleScope::User)
    }
}

/// Whether a matching rule allows or denies the command.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleEffect {
    /// Allow the command
    Enable,
    /// Deny the command
    Disable,
}

/// A stored permission rule. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRule {
    /// Monotonic id; a higher id means a more recently created rule
    pub id: RuleId,
    /// Guild the rule belongs to
    pub guild_id: GuildId,
    /// Layer the rule applies at
    pub scope: RuleScope,
    /// Role, channel, user or guild id the rule targets
    pub target_id: Option<u64>,
    /// Command or module name the rule governs
    pub command_or_module: String,
    /// Allow or deny
    pub effect: RuleEffect,
}

impl PermissionRule {
    /// Whether this rule governs the given command.
    pub fn governs(&self, command: &CommandRef) -> bool {
        command.is_named_by(&self.command_or_module)
    }
}

/// A permission rule before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPermissionRule {
    /// Guild the rule belongs to
    pub guild_id: GuildId,
    /// Layer the rule applies at
    pub scope: RuleScope,
    /// Role, channel or user id; ignored for global rules and forced to the guild id for
    /// guild rules
    pub target_id: Option<u64>,
    /// Command or module name the rule governs
    pub command_or_module: String,
    /// Allow or deny
    pub effect: RuleEffect,
}

impl NewPermissionRule {
    /// Check the rule shape and normalise its target.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the command name is blank or a
    /// role/channel/user rule is missing its target.
    pub fn validate(mut self) -> ModerationResult<Self> {
        let name = self.command_or_module.trim();
        if name.is_empty() {
            return Err(ModerationError::new(ModerationErrorKind::Validation(
                "Permission rule must name a command or module".to_string(),
            )));
        }
        self.command_or_module = name.to_string();

        match self.scope {
            RuleScope::Global => self.target_id = None,
            RuleScope::Guild => self.target_id = Some(self.guild_id.get()),
            RuleScope::Role | RuleScope::Channel | RuleScope::User => {
                if self.target_id.is_none() {
                    return Err(ModerationError::new(ModerationErrorKind::Validation(
                        format!("A {} rule requires a target id", self.scope),
                    )));
                }
            }
        }
        Ok(self)
    }

    /// Attach a store-assigned id.
    pub fn with_id(self, id: RuleId) -> PermissionRule {
        PermissionRule {
            id,
            guild_id: self.guild_id,
            scope: self.scope,
            target_id: self.target_id,
            command_or_module: self.command_or_module,
            effect: self.effect,
        }
    }
}
