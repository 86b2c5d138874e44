//! Database error types.

use crate::{ModerationError, ModerationErrorKind};

/// Database error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum DatabaseErrorKind {
    /// Connection failed
    #[display("Database connection error: {}", _0)]
    Connection(String),
    /// Connection pool exhausted or misconfigured
    #[display("Connection pool error: {}", _0)]
    Pool(String),
    /// Query execution failed
    #[display("Database query error: {}", _0)]
    Query(String),
    /// Stored value could not be mapped back to a domain type
    #[display("Corrupt row: {}", _0)]
    CorruptRow(String),
    /// A unique or foreign-key constraint rejected the write
    #[display("Constraint violated: {}", _0)]
    Constraint(String),
    /// Embedded migrations could not be applied
    #[display("Migration error: {}", _0)]
    Migration(String),
    /// Record not found
    #[display("Record not found")]
    NotFound,
}

/// Database error with source location tracking.
///
/// # Examples
///
/// ```
/// use tribunal_error::{DatabaseError, DatabaseErrorKind};
///
/// let err = DatabaseError::new(DatabaseErrorKind::NotFound);
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Database Error: {} at line {} in {}", kind, line, file)]
pub struct DatabaseError {
    /// The kind of error that occurred
    pub kind: DatabaseErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DatabaseError {
    /// Create a new DatabaseError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DatabaseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl From<diesel::result::Error> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind as Violation, Error};

        let kind = match err {
            Error::NotFound => DatabaseErrorKind::NotFound,
            Error::DatabaseError(
                Violation::UniqueViolation | Violation::ForeignKeyViolation,
                info,
            ) => DatabaseErrorKind::Constraint(info.message().to_string()),
            other => DatabaseErrorKind::Query(other.to_string()),
        };
        DatabaseError::new(kind)
    }
}

/// Missing rows and constraint violations keep their meaning; everything
/// else is a storage failure.
impl From<DatabaseError> for ModerationError {
    #[track_caller]
    fn from(err: DatabaseError) -> Self {
        let kind = match err.kind {
            DatabaseErrorKind::NotFound => ModerationErrorKind::NotFound(err.kind.to_string()),
            DatabaseErrorKind::Constraint(message) => ModerationErrorKind::Conflict(message),
            other => ModerationErrorKind::Storage(other.to_string()),
        };
        ModerationError::new(kind)
    }
}
