//! S3-compatible storage client
//!
//! Wraps the AWS SDK for the ingestion pipeline's object-store seam. Every
//! upload is bounded by a fixed timeout; a timeout or SDK error means the
//! object must be treated as not stored.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};

use crate::config::StorageConfig;
use crate::error::Result;
use crate::ingest::pipeline::ObjectStore;
use crate::ingest::types::IngestError;

use super::content_type;

/// S3-compatible storage client
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
    put_timeout: Duration,
}

impl S3Client {
    /// Create a new S3 client from configuration
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "stash-server",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);

        // Custom endpoints (MinIO and friends) need path-style addressing
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = Client::from_conf(builder.build());

        let bucket = config.bucket.clone();
        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    bucket,
                    e
                );
            }
        }

        Ok(Self {
            client,
            bucket,
            put_timeout: Duration::from_secs(config.put_timeout_secs),
        })
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload an object, bounded by the configured timeout.
    ///
    /// Dropping the returned future aborts the in-flight request, so an
    /// abandoned upload does not leak.
    pub async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> std::result::Result<(), IngestError> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send();

        match tokio::time::timeout(self.put_timeout, request).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(IngestError::StorageUnavailable(format!(
                "failed to put object {key}: {e}"
            ))),
            Err(_) => Err(IngestError::StorageUnavailable(format!(
                "put of {key} timed out after {:?}",
                self.put_timeout
            ))),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn store(&self, public_name: &str, payload: &[u8]) -> std::result::Result<(), IngestError> {
        let content_type = content_type::sniff(payload);
        self.put_object(public_name, payload.to_vec(), content_type)
            .await
    }
}
