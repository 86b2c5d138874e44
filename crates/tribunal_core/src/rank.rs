//! Member hierarchy position.

use serde::{Deserialize, Serialize};

/// Ordinal authority position derived from a member's highest role.
///
/// Higher values outrank lower ones. Members with no roles sit at
/// [`Rank::LOWEST`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct Rank(pub u32);

impl Rank {
    /// Rank of a member holding no roles.
    pub const LOWEST: Rank = Rank(0);

    /// Whether this rank is strictly above `other`.
    pub fn outranks(self, other: Rank) -> bool {
        self > other
    }
}
