//! Stash Server Library
//!
//! Content-addressed file host: uploads are deduplicated by fingerprint,
//! stored in S3-compatible object storage under short random public names,
//! indexed in SQLite, and mirrored as zero-byte markers so the edge proxy
//! can answer existence checks locally.
//!
//! The main server binary is in main.rs.

pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod routes;
pub mod state;
pub mod storage;
