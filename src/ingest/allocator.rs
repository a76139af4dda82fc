//! Public name allocation
//!
//! New content gets a short random lowercase stem with the original file's
//! extension preserved. Candidates are probed against the file index and
//! redrawn on collision, up to a bounded attempt budget.

use rand::Rng;

use super::pipeline::MetadataIndex;
use super::types::IngestError;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Allocates collision-free public names for newly ingested content.
#[derive(Debug, Clone)]
pub struct NameAllocator {
    /// Length of the random stem
    length: usize,

    /// Total candidate draws before giving up
    max_attempts: u32,

    /// Suffixes kept as one unit, e.g. "tar.gz" (no leading dot)
    compound_extensions: Vec<String>,
}

impl NameAllocator {
    pub fn new(length: usize, max_attempts: u32, compound_extensions: Vec<String>) -> Self {
        Self {
            length,
            max_attempts,
            compound_extensions,
        }
    }

    /// Derive the extension to preserve from the client-supplied filename.
    ///
    /// Configured compound suffixes win over the last dot-delimited segment,
    /// so `archive.tar.gz` keeps `.tar.gz` instead of `.gz`. Names without a
    /// dot yield an empty extension.
    pub fn extension(&self, original_name: &str) -> String {
        for suffix in &self.compound_extensions {
            if original_name.ends_with(suffix.as_str()) {
                return format!(".{suffix}");
            }
        }

        match original_name.rsplit_once('.') {
            Some((_, ext)) => format!(".{ext}"),
            None => String::new(),
        }
    }

    /// Allocate a public name that is not present in the index.
    ///
    /// Each attempt draws a fresh random stem; exhausting the budget fails
    /// with `NameSpaceExhausted` rather than returning a colliding name.
    pub async fn allocate(
        &self,
        index: &dyn MetadataIndex,
        original_name: &str,
    ) -> Result<String, IngestError> {
        let extension = self.extension(original_name);

        for _ in 0..self.max_attempts {
            let stem = self.random_stem();
            let candidate = format!("{stem}{extension}");

            if index.count_by_public_name(&candidate).await? == 0 {
                return Ok(candidate);
            }

            tracing::debug!(candidate = %candidate, "public name collision, redrawing");
        }

        Err(IngestError::NameSpaceExhausted {
            attempts: self.max_attempts,
        })
    }

    fn random_stem(&self) -> String {
        // ThreadRng is a CSPRNG reseeded from OS entropy, so stems are not
        // predictable from process start time.
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::db::files::FileRecord;

    fn allocator() -> NameAllocator {
        NameAllocator::new(8, 10, vec!["tar.gz".to_string(), "tar.bz2".to_string()])
    }

    /// Index fake that reports a collision for the first `collisions` probes.
    struct CollidingIndex {
        collisions: u32,
        probes: AtomicU32,
    }

    impl CollidingIndex {
        fn new(collisions: u32) -> Self {
            Self {
                collisions,
                probes: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl MetadataIndex for CollidingIndex {
        async fn lookup_by_fingerprint(&self, _hash: &str) -> Result<Option<String>, IngestError> {
            Ok(None)
        }

        async fn count_by_public_name(&self, _name: &str) -> Result<i64, IngestError> {
            let probe = self.probes.fetch_add(1, Ordering::SeqCst);
            Ok(if probe < self.collisions { 1 } else { 0 })
        }

        async fn insert(&self, _record: &FileRecord) -> Result<(), IngestError> {
            Ok(())
        }
    }

    #[test]
    fn compound_suffix_is_preserved_whole() {
        assert_eq!(allocator().extension("archive.tar.gz"), ".tar.gz");
        assert_eq!(allocator().extension("backup.tar.bz2"), ".tar.bz2");
    }

    #[test]
    fn plain_extension_keeps_case() {
        assert_eq!(allocator().extension("photo.JPG"), ".JPG");
    }

    #[test]
    fn no_dot_yields_empty_extension() {
        assert_eq!(allocator().extension("README"), "");
    }

    #[test]
    fn dotfile_yields_full_name_as_extension() {
        assert_eq!(allocator().extension(".bashrc"), ".bashrc");
    }

    #[tokio::test]
    async fn allocates_stem_with_extension() {
        let index = CollidingIndex::new(0);
        let name = allocator().allocate(&index, "photo.JPG").await.unwrap();

        assert!(name.ends_with(".JPG"));
        let stem = name.strip_suffix(".JPG").unwrap();
        assert_eq!(stem.len(), 8);
        assert!(stem.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[tokio::test]
    async fn redraws_until_free_name_found() {
        let index = CollidingIndex::new(3);
        let name = allocator().allocate(&index, "data.bin").await.unwrap();

        assert!(name.ends_with(".bin"));
        assert_eq!(index.probes.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn exhausted_budget_fails() {
        let index = CollidingIndex::new(u32::MAX);
        let err = allocator().allocate(&index, "data.bin").await.unwrap_err();

        assert!(matches!(
            err,
            IngestError::NameSpaceExhausted { attempts: 10 }
        ));
    }

    #[tokio::test]
    async fn zero_attempt_budget_fails_without_probing() {
        let index = CollidingIndex::new(u32::MAX);
        let allocator = NameAllocator::new(8, 0, vec![]);
        let err = allocator.allocate(&index, "data.bin").await.unwrap_err();

        assert!(matches!(err, IngestError::NameSpaceExhausted { attempts: 0 }));
        assert_eq!(index.probes.load(Ordering::SeqCst), 0);
    }
}
