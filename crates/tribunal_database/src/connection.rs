//! Connection pool construction.

use crate::DatabaseResult;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use tracing::{debug, instrument};
use tribunal_error::{DatabaseError, DatabaseErrorKind};

/// Pool of PostgreSQL connections shared by the store.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Default number of pooled connections.
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Read the connection string from `DATABASE_URL`.
///
/// # Errors
///
/// Returns a connection error if the variable is not set.
pub fn database_url_from_env() -> DatabaseResult<String> {
    std::env::var("DATABASE_URL").map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })
}

/// Build a pool and check out one connection to prove the database is reachable.
///
/// # Errors
///
/// Returns a pool error if the pool cannot be built or the first connection fails.
#[instrument(skip(database_url))]
pub fn build_pool(database_url: &str, pool_size: u32) -> DatabaseResult<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(pool_size.max(1))
        .build(manager)
        .map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Pool(format!(
                "Failed to create connection pool: {}",
                e
            )))
        })?;

    // Warm up
    pool.get().map_err(|e| {
        DatabaseError::new(DatabaseErrorKind::Pool(format!(
            "Failed to warm up connection pool: {}",
            e
        )))
    })?;
    debug!("Connection pool ready");

    Ok(pool)
}
