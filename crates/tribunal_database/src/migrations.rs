//! Embedded schema migrations.

use crate::DatabaseResult;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;
use tribunal_error::{DatabaseError, DatabaseErrorKind};

/// Migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply every pending migration.
///
/// Returns the number of migrations applied.
///
/// # Errors
///
/// Returns a migration error if any migration fails.
pub fn run_migrations(conn: &mut PgConnection) -> DatabaseResult<usize> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "Applied database migrations");
    }
    Ok(applied.len())
}
