//! Ingestion result and error types

use std::fmt;

/// Outcome of ingesting a single payload.
///
/// `public_name` is the externally visible identifier: it doubles as the
/// object-store key and the URL path segment, and it never changes once
/// assigned.
#[derive(Debug, Clone)]
pub struct IngestedFile {
    /// Hex-encoded SHA-256 of the payload bytes
    pub hash: String,

    /// Short random name plus preserved extension
    pub public_name: String,

    /// Payload size in bytes
    pub size: u64,
}

/// Which unique column an insert collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Fingerprint,
    PublicName,
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fingerprint => write!(f, "content fingerprint"),
            Self::PublicName => write!(f, "public name"),
        }
    }
}

/// Ingestion error kinds
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("File index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Duplicate {0} in file index")]
    DuplicateKey(DuplicateField),

    #[error("Object storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("No free public name after {attempts} attempts")]
    NameSpaceExhausted { attempts: u32 },

    #[error("Failed to write existence marker: {0}")]
    SignalWriteError(String),
}
