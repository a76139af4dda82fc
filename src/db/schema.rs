//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- One row per distinct content fingerprint ever ingested
CREATE TABLE IF NOT EXISTS files (
    hash          TEXT NOT NULL UNIQUE,
    original_name TEXT NOT NULL,
    public_name   TEXT NOT NULL UNIQUE,
    size          INTEGER NOT NULL,
    ingested_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_files_hash ON files(hash);
CREATE INDEX IF NOT EXISTS idx_files_public_name ON files(public_name);
"#;
