//! Top-level error wrapper types.

use crate::{ConfigError, GatewayError, ModerationError};
#[cfg(feature = "database")]
use crate::DatabaseError;

/// Union of every error the Tribunal crates raise.
///
/// # Examples
///
/// ```
/// use tribunal_error::{ConfigError, TribunalError};
///
/// let err: TribunalError = ConfigError::new("Missing field").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TribunalErrorKind {
    /// Moderation policy or lifecycle error
    #[from(ModerationError)]
    Moderation(ModerationError),
    /// Chat platform gateway error
    #[from(GatewayError)]
    Gateway(GatewayError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Database error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
}

/// Tribunal error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Tribunal Error: {}", _0)]
pub struct TribunalError(Box<TribunalErrorKind>);

impl TribunalError {
    /// Create a new error from a kind.
    pub fn new(kind: TribunalErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TribunalErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to TribunalErrorKind
impl<T> From<T> for TribunalError
where
    T: Into<TribunalErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Tribunal operations.
pub type TribunalResult<T> = std::result::Result<T, TribunalError>;
