//! SQLite persistence for the file index

pub mod files;
mod schema;

pub use files::{FileRecord, SqliteFileIndex};
pub use schema::initialize_schema;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::Result;

/// Create the database connection pool.
///
/// Capped at a single connection: every index operation across all
/// concurrent ingestions serializes through it, which keeps SQLite free of
/// writer contention.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    initialize_schema(&pool).await?;

    Ok(pool)
}
