//! Storage module for S3-compatible backends
//!
//! Works against AWS S3 as well as MinIO and other path-style endpoints.

pub mod content_type;
mod s3_client;

pub use s3_client::S3Client;
