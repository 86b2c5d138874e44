//! Error types for the Tribunal moderation engine.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! [`ModerationError`] carries the taxonomy that moderation callers branch on
//! (validation, authorization, conflict, not found, external action, storage).
//! Gateway and database failures convert into it at the component boundary.
//!
//! # Examples
//!
//! ```
//! use tribunal_error::{ModerationError, ModerationErrorKind, ModerationResult};
//!
//! fn appeal(message: &str) -> ModerationResult<()> {
//!     if message.trim().is_empty() {
//!         return Err(ModerationError::new(ModerationErrorKind::Validation(
//!             "Appeal message cannot be empty".to_string(),
//!         )));
//!     }
//!     Ok(())
//! }
//!
//! assert!(appeal("").unwrap_err().is_validation());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
#[cfg(feature = "database")]
mod database;
mod error;
mod gateway;
mod moderation;

pub use config::ConfigError;
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{TribunalError, TribunalErrorKind, TribunalResult};
pub use gateway::{GatewayError, GatewayErrorKind, GatewayResult};
pub use moderation::{ModerationError, ModerationErrorKind, ModerationResult};
