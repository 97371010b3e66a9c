//! Database access layer for the lyrics catalog
//!
//! Per-entity query modules over a shared SQLite pool. Referential
//! integrity (cascade delete) and name uniqueness are enforced by the
//! schema; see `init`.

use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

pub mod albums;
pub mod artists;
pub mod init;
pub mod lyrics;
pub mod models;
pub mod songs;
pub mod votes;

/// Initialize database connection pool and create tables if needed
///
/// Foreign key enforcement is set on every pooled connection; cascade
/// delete relies on it.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(
        db_path
            .to_str()
            .ok_or_else(|| Error::Config(format!("Invalid database path: {:?}", db_path)))?,
    )
    .map_err(Error::Database)?
    .create_if_missing(true)
    .foreign_keys(true)
    .journal_mode(SqliteJournalMode::Wal)
    .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Idempotent - safe to call on every startup
    init::initialize_schema(&pool).await?;

    Ok(pool)
}

/// Parse a guid column read back from the database
pub(crate) fn parse_guid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("Invalid guid in database: {}", e)))
}

/// Build an ORDER BY clause from a caller-supplied sort column
///
/// `allowed` maps accepted sort names to SQL column expressions. Anything
/// outside the allowlist is a validation error, never interpolated into SQL.
/// Any `order` other than "desc" sorts ascending.
pub(crate) fn order_clause(
    sort: Option<&str>,
    order: &str,
    allowed: &[(&str, &str)],
    default_column: &str,
) -> Result<String> {
    let column = match sort {
        None => default_column,
        Some(requested) => allowed
            .iter()
            .find(|(name, _)| *name == requested)
            .map(|(_, column)| *column)
            .ok_or_else(|| Error::Validation(format!("Invalid sort column: {}", requested)))?,
    };

    let direction = if order.eq_ignore_ascii_case("desc") {
        "DESC"
    } else {
        "ASC"
    };

    Ok(format!("ORDER BY {} {}", column, direction))
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// In-memory pool for unit tests
    ///
    /// Uses a shared-cache, named in-memory database so that multiple pooled
    /// connections all observe the same data. A unique name per pool keeps
    /// parallel tests isolated from one another, and `min_connections(1)`
    /// keeps the in-memory database alive for the pool's lifetime. Foreign
    /// keys are enabled per-connection (cascade deletes rely on it).
    pub async fn memory_pool() -> SqlitePool {
        static DB_COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);

        let options = SqliteConnectOptions::from_str(&format!(
            "sqlite:file:memdb_test_{}?mode=memory&cache=shared",
            id
        ))
        .expect("valid in-memory sqlite url")
        .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory database");

        super::init::initialize_schema(&pool)
            .await
            .expect("Schema initialization failed");

        pool
    }
}
