//! Chat platform gateway error types.

/// Gateway failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GatewayErrorKind {
    /// The platform API rejected or failed the request.
    #[display("Platform API error: {}", _0)]
    Api(String),
    /// The target member is not in the guild.
    #[display("Member {} not found in guild {}", user_id, guild_id)]
    MemberNotFound {
        /// Guild that was searched
        guild_id: u64,
        /// Member that was not found
        user_id: u64,
    },
    /// The bot lacks the platform permission required for the action.
    #[display("Missing platform permission: {}", _0)]
    MissingPermission(String),
    /// The receiver does not accept direct messages.
    #[display("Direct messages closed for user {}", _0)]
    DirectMessagesClosed(u64),
    /// The call did not complete in time.
    #[display("Gateway call timed out: {}", _0)]
    Timeout(String),
    /// The gateway is unreachable.
    #[display("Gateway unavailable: {}", _0)]
    Unavailable(String),
}

/// Gateway error with location tracking.
///
/// # Examples
///
/// ```
/// use tribunal_error::{GatewayError, GatewayErrorKind};
///
/// let err = GatewayError::new(GatewayErrorKind::Timeout("add_role".to_string()));
/// assert!(format!("{}", err).contains("timed out"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gateway Error: {} at line {} in {}", kind, line, file)]
pub struct GatewayError {
    /// The kind of error that occurred
    pub kind: GatewayErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GatewayError {
    /// Create a new gateway error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GatewayErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GatewayErrorKind {
        &self.kind
    }
}

/// Result type for gateway calls.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(feature = "discord")]
impl From<serenity::Error> for GatewayError {
    #[track_caller]
    fn from(err: serenity::Error) -> Self {
        GatewayError::new(GatewayErrorKind::Api(err.to_string()))
    }
}
