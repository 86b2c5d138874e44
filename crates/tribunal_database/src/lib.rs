//! PostgreSQL persistence for Tribunal.
//!
//! [`PostgresModerationStore`] implements
//! [`ModerationStore`](tribunal_interface::ModerationStore) on an r2d2 pool of
//! diesel connections. Queries run on the blocking thread pool so async
//! callers never stall the runtime.
//!
//! # Example
//!
//! ```rust,ignore
//! use tribunal_database::PostgresModerationStore;
//!
//! // Requires DATABASE_URL=postgresql://localhost/tribunal in environment
//! let store = PostgresModerationStore::from_env()?;
//! store.run_migrations().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod migrations;
mod models;
mod store;

pub mod schema;

pub use connection::{DEFAULT_POOL_SIZE, PgPool, build_pool, database_url_from_env};
pub use migrations::{MIGRATIONS, run_migrations};
pub use models::{
    EscalationRuleRow, GuildSettingsRow, InfractionRow, NewEscalationHistoryRow,
    NewInfractionRow, NewPermissionRuleRow, PermissionRuleRow,
};
pub use store::PostgresModerationStore;

use tribunal_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
