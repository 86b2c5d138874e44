//! Chat platform integrations for Tribunal.
//!
//! # Components
//!
//! - [`LogChannelNotifier`] posts moderation events to each guild's configured
//!   log channel through any [`ChatGateway`](tribunal_interface::ChatGateway).
//! - `SerenityGateway` (feature `discord`) implements the gateway over
//!   Serenity's HTTP client.
//!
//! Member ranks come from the position of the member's highest role; see
//! [`rank_from_positions`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod log_channel;
mod mapping;

#[cfg(feature = "discord")]
mod discord;

pub use log_channel::{LogChannelNotifier, format_event};
pub use mapping::{classify_status, rank_from_positions};

#[cfg(feature = "discord")]
pub use discord::SerenityGateway;
