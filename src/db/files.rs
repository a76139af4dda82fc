//! File index access
//!
//! Rows map content fingerprints to public names. Both columns carry UNIQUE
//! constraints; the database is the arbiter for the uniqueness invariants.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::ingest::pipeline::MetadataIndex;
use crate::ingest::types::{DuplicateField, IngestError};

/// One row per distinct content fingerprint.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    /// Hex-encoded SHA-256 of the payload
    pub hash: String,

    /// Client-supplied filename at first ingestion, informational only
    pub original_name: String,

    /// Allocator-generated name, doubles as object-store key and URL suffix
    pub public_name: String,

    /// Payload size in bytes
    pub size: i64,

    /// RFC 3339 timestamp of first ingestion
    pub ingested_at: String,
}

impl FileRecord {
    pub fn new(hash: &str, original_name: &str, public_name: &str, size: u64) -> Self {
        Self {
            hash: hash.to_string(),
            original_name: original_name.to_string(),
            public_name: public_name.to_string(),
            size: size as i64,
            ingested_at: Utc::now().to_rfc3339(),
        }
    }
}

/// SQLite-backed implementation of the pipeline's metadata index.
#[derive(Clone)]
pub struct SqliteFileIndex {
    pool: SqlitePool,
}

impl SqliteFileIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataIndex for SqliteFileIndex {
    async fn lookup_by_fingerprint(&self, hash: &str) -> Result<Option<String>, IngestError> {
        sqlx::query_scalar::<_, String>("SELECT public_name FROM files WHERE hash = ?")
            .bind(hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| IngestError::IndexUnavailable(e.to_string()))
    }

    async fn count_by_public_name(&self, name: &str) -> Result<i64, IngestError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(public_name) FROM files WHERE public_name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| IngestError::IndexUnavailable(e.to_string()))
    }

    async fn insert(&self, record: &FileRecord) -> Result<(), IngestError> {
        sqlx::query(
            r#"
            INSERT INTO files (hash, original_name, public_name, size, ingested_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.hash)
        .bind(&record.original_name)
        .bind(&record.public_name)
        .bind(record.size)
        .bind(&record.ingested_at)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(classify_insert_error)
    }
}

/// Unique-constraint violations become `DuplicateKey`; everything else means
/// the index could not be reached or queried.
fn classify_insert_error(e: sqlx::Error) -> IngestError {
    if let sqlx::Error::Database(db_err) = &e {
        let message = db_err.message();
        if message.contains("UNIQUE constraint failed") {
            return if message.contains("files.hash") {
                IngestError::DuplicateKey(DuplicateField::Fingerprint)
            } else {
                IngestError::DuplicateKey(DuplicateField::PublicName)
            };
        }
    }
    IngestError::IndexUnavailable(e.to_string())
}
