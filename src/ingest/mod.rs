//! File ingestion
//!
//! One upload flows through: SHA-256 fingerprint, dedup lookup against the
//! file index, and for new content the allocate → store → index → mark
//! chain. Duplicate content is answered from the index alone.

pub mod allocator;
pub mod hasher;
pub mod marker;
pub mod pipeline;
pub mod types;

pub use allocator::NameAllocator;
pub use marker::MarkerDir;
pub use pipeline::{IngestionPipeline, MetadataIndex, ObjectStore};
pub use types::{DuplicateField, IngestError, IngestedFile};
