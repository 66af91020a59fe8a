// ABOUTME: SQLite persistence for requirements analysis
// ABOUTME: Connection setup, embedded migrations, and storage for handoffs and project details

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

pub mod handoff;
pub mod project_details;

pub use handoff::HandoffStorage;
pub use project_details::{ProjectDetailsStorage, StoredProjectDetails};

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Open a pool for `database_url` and bring the schema up to date.
///
/// In-memory databases are limited to a single connection, since every
/// SQLite connection to `:memory:` gets its own private database.
pub async fn connect(database_url: &str) -> StorageResult<SqlitePool> {
    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(30));
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(if in_memory { 1 } else { 5 })
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    info!("SQLite storage initialized at {}", database_url);

    Ok(pool)
}

/// Apply the embedded migrations
pub async fn run_migrations(pool: &SqlitePool) -> StorageResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(StorageError::Migration)
}

/// Fresh in-memory database with the schema applied
#[doc(hidden)]
pub async fn memory_pool() -> StorageResult<SqlitePool> {
    connect("sqlite::memory:").await
}

/// Parse an RFC 3339 timestamp column
pub(crate) fn parse_timestamp(value: &str) -> StorageResult<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| StorageError::Database(format!("Failed to parse timestamp: {}", e)))
}
