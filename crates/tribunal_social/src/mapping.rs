//! Platform-neutral pieces of the Discord mapping.

use std::collections::HashMap;
use tribunal_core::{GuildId, Rank, UserId};
use tribunal_error::GatewayErrorKind;

/// Rank of a member holding `member_roles`, given every role's position in the guild.
///
/// The highest position wins. Roles missing from `positions` are ignored, and
/// a member with no known roles gets [`Rank::LOWEST`].
pub fn rank_from_positions(member_roles: &[u64], positions: &HashMap<u64, u16>) -> Rank {
    member_roles
        .iter()
        .filter_map(|role| positions.get(role))
        .max()
        .map(|position| Rank(u32::from(*position)))
        .unwrap_or(Rank::LOWEST)
}

/// Map an HTTP status from a failed platform call to a gateway error kind.
///
/// `action` names the call for the error message; `target` is the member the
/// call was about, when there is one.
pub fn classify_status(
    status: Option<u16>,
    action: &str,
    target: Option<(GuildId, UserId)>,
    message: String,
) -> GatewayErrorKind {
    match (status, target) {
        (Some(404), Some((guild_id, user_id))) => GatewayErrorKind::MemberNotFound {
            guild_id: guild_id.get(),
            user_id: user_id.get(),
        },
        (Some(403), _) => GatewayErrorKind::MissingPermission(format!("{}: {}", action, message)),
        (Some(429), _) => GatewayErrorKind::Unavailable(format!("{} rate limited", action)),
        (Some(status), _) if status >= 500 => {
            GatewayErrorKind::Unavailable(format!("{}: {}", action, message))
        }
        _ => GatewayErrorKind::Api(format!("{}: {}", action, message)),
    }
}
