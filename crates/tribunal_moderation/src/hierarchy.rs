//! Rank precondition shared by every lifecycle operation.

use tracing::debug;
use tribunal_core::{GuildId, Rank, UserId};
use tribunal_error::{ModerationError, ModerationErrorKind, ModerationResult};
use tribunal_interface::ChatGateway;

/// Who is performing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Issuer {
    /// A human moderator
    Moderator(UserId),
    /// The bot acting on its own (escalation, expiry)
    System,
}

/// What the operation will do to the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Requirement {
    /// Record only; receiver must be a member
    Record,
    /// Platform action against a current member
    Enforce,
    /// Platform action that may target a non-member (bans)
    EnforceAnyone,
    /// Undo an earlier action; rank only matters while the receiver is a member
    Reverse {
        /// Whether undoing needs a platform call
        external: bool,
    },
}

impl Requirement {
    fn allows_non_member(self) -> bool {
        matches!(self, Requirement::EnforceAnyone | Requirement::Reverse { .. })
    }

    fn needs_platform(self) -> bool {
        match self {
            Requirement::Record => false,
            Requirement::Enforce | Requirement::EnforceAnyone => true,
            Requirement::Reverse { external } => external,
        }
    }
}

/// Receiver's position as observed during the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Standing {
    pub is_member: bool,
}

fn denied(message: String) -> ModerationError {
    ModerationError::new(ModerationErrorKind::Authorization(message))
}

/// Verify `issuer` (and the bot, when a platform action follows) outranks `receiver`.
pub(crate) async fn ensure_outranks(
    gateway: &dyn ChatGateway,
    guild_id: GuildId,
    issuer: Issuer,
    receiver_id: UserId,
    requirement: Requirement,
) -> ModerationResult<Standing> {
    if issuer == Issuer::Moderator(receiver_id) {
        return Err(denied("Moderators cannot act on themselves".to_string()));
    }

    let reversing = matches!(requirement, Requirement::Reverse { .. });
    if !reversing && gateway.is_guild_owner(guild_id, receiver_id).await? {
        return Err(denied("The guild owner cannot be moderated".to_string()));
    }

    let (receiver_rank, is_member) = match gateway.get_member_rank(guild_id, receiver_id).await? {
        Some(rank) => (rank, true),
        None if requirement.allows_non_member() => (Rank::LOWEST, false),
        None => {
            return Err(ModerationError::new(ModerationErrorKind::NotFound(format!(
                "Member {} is not in guild {}",
                receiver_id, guild_id
            ))));
        }
    };

    if reversing && !is_member {
        debug!(%receiver_id, "Receiver left the guild, skipping rank checks");
        return Ok(Standing { is_member });
    }

    if let Issuer::Moderator(issuer_id) = issuer {
        if gateway.is_guild_owner(guild_id, issuer_id).await? {
            debug!(%issuer_id, "Guild owner satisfies hierarchy");
        } else {
            let issuer_rank = gateway
                .get_member_rank(guild_id, issuer_id)
                .await?
                .ok_or_else(|| {
                    denied(format!(
                        "Issuer {} is not a member of guild {}",
                        issuer_id, guild_id
                    ))
                })?;
            if !issuer_rank.outranks(receiver_rank) {
                return Err(denied(format!(
                    "Issuer {} (rank {}) does not outrank {} (rank {})",
                    issuer_id, issuer_rank, receiver_id, receiver_rank
                )));
            }
        }
    }

    if requirement.needs_platform() && is_member {
        let bot_id = gateway.bot_user_id();
        let bot_rank = gateway
            .get_member_rank(guild_id, bot_id)
            .await?
            .ok_or_else(|| denied(format!("Bot is not a member of guild {}", guild_id)))?;
        if !bot_rank.outranks(receiver_rank) {
            return Err(denied(format!(
                "Bot (rank {}) does not outrank {} (rank {})",
                bot_rank, receiver_id, receiver_rank
            )));
        }
    }

    Ok(Standing { is_member })
}
