//! Ingestion pipeline
//!
//! Orchestrates one payload end to end: fingerprint, dedup lookup, and on a
//! miss the allocate → store → index → mark chain, in that order. Storage
//! and indexing happen before the marker, so a marker only ever exists for
//! content that is already durable.
//!
//! The index and object store sit behind trait seams so tests can
//! substitute fakes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::files::FileRecord;

use super::allocator::NameAllocator;
use super::hasher;
use super::marker::MarkerDir;
use super::types::{DuplicateField, IngestError, IngestedFile};

/// Durable mapping from content fingerprint to public name, also used to
/// probe public-name collisions.
#[async_trait]
pub trait MetadataIndex: Send + Sync {
    /// Public name previously assigned to this fingerprint, if any.
    async fn lookup_by_fingerprint(&self, hash: &str) -> Result<Option<String>, IngestError>;

    /// Number of records using this public name (0 means free).
    async fn count_by_public_name(&self, name: &str) -> Result<i64, IngestError>;

    /// Persist a new record. Unique-constraint violations surface as
    /// `DuplicateKey`.
    async fn insert(&self, record: &FileRecord) -> Result<(), IngestError>;
}

/// Durable remote storage of payload bytes under a public name.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `payload` under `public_name`. Any failure means "not stored".
    async fn store(&self, public_name: &str, payload: &[u8]) -> Result<(), IngestError>;
}

/// Per-payload ingestion orchestrator.
#[derive(Clone)]
pub struct IngestionPipeline {
    index: Arc<dyn MetadataIndex>,
    store: Arc<dyn ObjectStore>,
    allocator: NameAllocator,
    markers: MarkerDir,
}

impl IngestionPipeline {
    pub fn new(
        index: Arc<dyn MetadataIndex>,
        store: Arc<dyn ObjectStore>,
        allocator: NameAllocator,
        markers: MarkerDir,
    ) -> Self {
        Self {
            index,
            store,
            allocator,
            markers,
        }
    }

    /// Ingest a single payload and resolve it to a public name.
    ///
    /// Duplicate content returns the existing name without touching the
    /// object store or the marker directory, so storage I/O is paid at most
    /// once per distinct content.
    pub async fn ingest(
        &self,
        payload: &[u8],
        original_name: &str,
    ) -> Result<IngestedFile, IngestError> {
        let hash = hasher::fingerprint(payload);
        let size = payload.len() as u64;

        if let Some(existing) = self.index.lookup_by_fingerprint(&hash).await? {
            tracing::debug!(
                hash = %hash,
                public_name = %existing,
                "duplicate content, resolving to existing name"
            );
            return Ok(IngestedFile {
                hash,
                public_name: existing,
                size,
            });
        }

        let public_name = self
            .allocator
            .allocate(self.index.as_ref(), original_name)
            .await?;

        self.store.store(&public_name, payload).await?;

        let record = FileRecord::new(&hash, original_name, &public_name, size);
        match self.index.insert(&record).await {
            Ok(()) => {}
            Err(IngestError::DuplicateKey(DuplicateField::Fingerprint)) => {
                // A concurrent upload of the same bytes won the insert. The
                // surviving row is authoritative; the object we just stored
                // is unreferenced and left for out-of-band cleanup.
                let existing = self.index.lookup_by_fingerprint(&hash).await?.ok_or_else(|| {
                    IngestError::IndexUnavailable(
                        "record missing after duplicate-key insert".to_string(),
                    )
                })?;
                tracing::warn!(
                    hash = %hash,
                    orphaned_object = %public_name,
                    public_name = %existing,
                    "lost insert race to concurrent upload, orphaning stored object"
                );
                return Ok(IngestedFile {
                    hash,
                    public_name: existing,
                    size,
                });
            }
            Err(e) => {
                tracing::warn!(
                    hash = %hash,
                    orphaned_object = %public_name,
                    "index insert failed after store, object left unreferenced"
                );
                return Err(e);
            }
        }

        // The content is durable and indexed at this point, so a marker
        // failure does not fail the ingestion. It is logged for repair.
        if let Err(e) = self.markers.mark(&public_name).await {
            tracing::error!(
                public_name = %public_name,
                error = %e,
                "existence marker write failed for stored and indexed file"
            );
        }

        tracing::info!(
            hash = %hash,
            public_name = %public_name,
            size = size,
            "file ingested"
        );

        Ok(IngestedFile {
            hash,
            public_name,
            size,
        })
    }
}
