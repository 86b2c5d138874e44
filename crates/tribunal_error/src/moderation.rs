//! Moderation error types.

use crate::GatewayError;

/// Moderation failure conditions.
///
/// Validation, authorization, conflict and not-found errors are raised before
/// any state is written. External action errors abort the single operation
/// that raised them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ModerationErrorKind {
    /// Malformed input (empty appeal, zero warning threshold, non-appealable infraction)
    #[display("Validation failed: {}", _0)]
    Validation(String),

    /// Hierarchy violation or missing permission
    #[display("Not authorized: {}", _0)]
    Authorization(String),

    /// Duplicate active mute, or infraction already appealed/revoked
    #[display("Conflict: {}", _0)]
    Conflict(String),

    /// Unknown infraction, rule or member
    #[display("Not found: {}", _0)]
    NotFound(String),

    /// A chat platform call failed
    #[display("External action failed: {}", _0)]
    ExternalAction(String),

    /// The persistent store failed or is unreachable
    #[display("Storage error: {}", _0)]
    Storage(String),

    /// The actor exhausted their invocation window
    #[display("Rate limited '{}', retry in {}ms", actor, remaining_ms)]
    RateLimited {
        /// Rate-limit key of the actor
        actor: String,
        /// Milliseconds until the window resets
        remaining_ms: u64,
    },
}

/// Moderation error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Moderation Error: {} at line {} in {}", kind, line, file)]
pub struct ModerationError {
    /// The specific error kind
    pub kind: ModerationErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl ModerationError {
    /// Create a new moderation error with location tracking.
    #[track_caller]
    pub fn new(kind: ModerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ModerationErrorKind {
        &self.kind
    }

    /// Whether this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ModerationErrorKind::Validation(_))
    }

    /// Whether this is an authorization error.
    pub fn is_authorization(&self) -> bool {
        matches!(self.kind, ModerationErrorKind::Authorization(_))
    }

    /// Whether this is a conflict error.
    pub fn is_conflict(&self) -> bool {
        matches!(self.kind, ModerationErrorKind::Conflict(_))
    }

    /// Whether this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ModerationErrorKind::NotFound(_))
    }

    /// Whether this is an external action error.
    pub fn is_external(&self) -> bool {
        matches!(self.kind, ModerationErrorKind::ExternalAction(_))
    }

    /// Whether the persistent store failed.
    pub fn is_storage(&self) -> bool {
        matches!(self.kind, ModerationErrorKind::Storage(_))
    }
}

/// Result type for moderation operations.
pub type ModerationResult<T> = Result<T, ModerationError>;

impl From<GatewayError> for ModerationError {
    #[track_caller]
    fn from(err: GatewayError) -> Self {
        ModerationError::new(ModerationErrorKind::ExternalAction(err.kind.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayErrorKind;

    #[test]
    fn test_gateway_error_maps_to_external_action() {
        let gateway = GatewayError::new(GatewayErrorKind::Unavailable("http 503".to_string()));
        let err: ModerationError = gateway.into();
        assert!(err.is_external());
        assert!(format!("{}", err).contains("http 503"));
    }

    #[test]
    fn test_location_is_tracked() {
        let err = ModerationError::new(ModerationErrorKind::Conflict("already revoked".into()));
        assert!(err.file.ends_with("moderation.rs"));
        assert!(err.line > 0);
    }

    #[test]
    fn test_rate_limited_display() {
        let err = ModerationError::new(ModerationErrorKind::RateLimited {
            actor: "42:7".to_string(),
            remaining_ms: 1500,
        });
        assert!(format!("{}", err).contains("1500ms"));
    }
}
