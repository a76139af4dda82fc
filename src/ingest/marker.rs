//! Existence markers
//!
//! A zero-byte file per public name, written after a payload is durably
//! stored and indexed. The edge proxy checks this directory to answer
//! "does this name exist" without a round trip to object storage.

use std::path::PathBuf;

use super::types::IngestError;

/// Directory of zero-byte marker files keyed by public name.
#[derive(Debug, Clone)]
pub struct MarkerDir {
    dir: PathBuf,
}

impl MarkerDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the marker for `public_name`. Re-marking an existing name is a
    /// no-op, so the step is safe to retry.
    pub async fn mark(&self, public_name: &str) -> Result<(), IngestError> {
        let path = self.dir.join(public_name);
        tokio::fs::File::create(&path)
            .await
            .map_err(|e| IngestError::SignalWriteError(format!("{}: {e}", path.display())))?;
        Ok(())
    }
}
