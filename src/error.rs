//! HTTP-facing error types
//!
//! Every failure leaving the service is rendered as the wire-level failure
//! body: `{"success": false, "errorcode": <status>, "description": ...}`.
//! Malformed input maps to 400, pipeline failures to 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ingest::types::IngestError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wire-level failure body
#[derive(Debug, Serialize)]
pub struct FailureResponse {
    pub success: bool,
    pub errorcode: u16,
    pub description: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, description) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Ingest(e) => {
                tracing::error!("Ingestion failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ingest_description(e).to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "file index unavailable".to_string(),
                )
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal I/O failure".to_string(),
                )
            }
        };

        let body = Json(FailureResponse {
            success: false,
            errorcode: status.as_u16(),
            description,
        });

        (status, body).into_response()
    }
}

/// Client-facing description per error kind; details stay in the logs.
fn ingest_description(e: &IngestError) -> &'static str {
    match e {
        IngestError::IndexUnavailable(_) => "file index unavailable",
        IngestError::DuplicateKey(_) => "conflicting concurrent upload",
        IngestError::StorageUnavailable(_) => "object storage unavailable",
        IngestError::NameSpaceExhausted { .. } => "could not allocate a unique name",
        IngestError::SignalWriteError(_) => "failed to record upload",
    }
}
