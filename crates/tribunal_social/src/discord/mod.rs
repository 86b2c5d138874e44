//! Discord integration over Serenity's HTTP client.

mod gateway;

pub use gateway::SerenityGateway;
