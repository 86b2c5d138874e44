//! Strongly typed identifiers.
//!
//! Platform entities (guilds, users, roles, channels) are 64-bit snowflakes.
//! Store-assigned identifiers (infractions, permission rules) are signed so
//! they map directly onto `BIGSERIAL` columns.

use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw snowflake value.
            pub fn get(self) -> u64 {
                self.0
            }
        }
    };
}

macro_rules! store_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Raw store value.
            pub fn get(self) -> i64 {
                self.0
            }
        }
    };
}

snowflake!(
    /// Guild (tenant community) identifier.
    GuildId
);
snowflake!(
    /// Member identifier.
    UserId
);
snowflake!(
    /// Role identifier.
    RoleId
);
snowflake!(
    /// Channel identifier.
    ChannelId
);

store_id!(
    /// Infraction identifier, monotonically assigned by the store.
    InfractionId
);
store_id!(
    /// Permission rule identifier, monotonically assigned by the store.
    RuleId
);
