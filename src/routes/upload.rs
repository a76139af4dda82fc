//! Upload route
//!
//! POST /upload accepts a multipart form with zero or more `files[]` parts,
//! runs each through the ingestion pipeline in order, and answers with the
//! aggregated result. The first failing file aborts the whole batch; no
//! partial-success response is produced.

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        State,
    },
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the upload router
pub fn router() -> Router<AppState> {
    Router::new().route("/upload", post(upload))
}

/// Wire-level success body
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub files: Vec<UploadedFile>,
}

/// One entry per uploaded part, in request order
#[derive(Debug, Serialize)]
pub struct UploadedFile {
    /// Content fingerprint of the payload
    pub hash: String,

    /// Client-supplied filename, echoed back
    pub name: String,

    /// Public URL the content is reachable under
    pub url: String,

    /// Payload size in bytes
    pub size: u64,
}

/// POST /upload
async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart =
        multipart.map_err(|e| AppError::BadRequest(format!("not a multipart upload: {e}")))?;

    let mut files = Vec::new();

    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?;
        let Some(field) = field else { break };

        if field.name() != Some("files[]") {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read file part: {e}")))?;

        let ingested = state.pipeline().ingest(&data, &original_name).await?;

        files.push(UploadedFile {
            url: format!("{}{}", state.config().ingest.url_prefix, ingested.public_name),
            hash: ingested.hash,
            name: original_name,
            size: ingested.size,
        });
    }

    Ok(Json(UploadResponse {
        success: true,
        files,
    }))
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use sqlx::SqlitePool;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::db::SqliteFileIndex;
    use crate::ingest::types::IngestError;
    use crate::ingest::{IngestionPipeline, MarkerDir, NameAllocator, ObjectStore};

    struct MemoryStore {
        puts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl MemoryStore {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                puts: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn put_count(&self) -> usize {
            self.puts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn store(
            &self,
            public_name: &str,
            _payload: &[u8],
        ) -> std::result::Result<(), IngestError> {
            if self.fail {
                return Err(IngestError::StorageUnavailable(
                    "simulated network error".to_string(),
                ));
            }
            self.puts.lock().unwrap().push(public_name.to_string());
            Ok(())
        }
    }

    async fn test_app(store: Arc<MemoryStore>, marker_dir: &Path) -> (Router, SqlitePool) {
        let pool = crate::db::create_pool("sqlite::memory:").await.unwrap();
        let pipeline = IngestionPipeline::new(
            Arc::new(SqliteFileIndex::new(pool.clone())),
            store,
            NameAllocator::new(8, 10, vec!["tar.gz".to_string()]),
            MarkerDir::new(marker_dir),
        );
        let state = AppState::new(Config::default(), pipeline);
        (router().with_state(state), pool)
    }

    const BOUNDARY: &str = "test-boundary-7db3a5";

    fn upload_request(parts: &[(&str, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (filename, data) in parts {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                     name=\"files[]\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn row_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn batch_of_two_files_gets_two_names_and_markers() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(false);
        let (app, pool) = test_app(store.clone(), dir.path()).await;

        let response = app
            .oneshot(upload_request(&[
                ("a.txt", b"content-aa".as_slice()),
                ("b.txt", b"content-bb".as_slice()),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["success"], serde_json::json!(true));

        let files = body["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert_ne!(files[0]["url"], files[1]["url"]);
        for entry in files {
            let url = entry["url"].as_str().unwrap();
            assert!(url.starts_with("https://files.example.com/"));
        }
        assert_eq!(files[0]["name"], "a.txt");
        assert_eq!(files[0]["size"], 10);

        assert_eq!(row_count(&pool).await, 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn repeated_upload_resolves_to_same_url_and_single_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(false);
        let (app, pool) = test_app(store.clone(), dir.path()).await;

        let first = app
            .clone()
            .oneshot(upload_request(&[("hello.txt", b"hello1234".as_slice())]))
            .await
            .unwrap();
        let second = app
            .oneshot(upload_request(&[("other-name.txt", b"hello1234".as_slice())]))
            .await
            .unwrap();

        let first_body = response_json(first).await;
        let second_body = response_json(second).await;

        assert_eq!(first_body["files"][0]["url"], second_body["files"][0]["url"]);
        assert_eq!(store.put_count(), 1);
        assert_eq!(row_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn storage_failure_aborts_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(true);
        let (app, pool) = test_app(store, dir.path()).await;

        let response = app
            .oneshot(upload_request(&[("doomed.txt", b"payload".as_slice())]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response_json(response).await;
        assert_eq!(body["success"], serde_json::json!(false));
        assert_eq!(body["errorcode"], serde_json::json!(500));
        assert_eq!(body["description"], "object storage unavailable");

        assert_eq!(row_count(&pool).await, 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn non_multipart_request_is_a_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(false);
        let (app, _pool) = test_app(store, dir.path()).await;

        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("not a form"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["success"], serde_json::json!(false));
        assert_eq!(body["errorcode"], serde_json::json!(400));
    }

    #[tokio::test]
    async fn empty_batch_succeeds_with_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(false);
        let (app, _pool) = test_app(store, dir.path()).await;

        let response = app.oneshot(upload_request(&[])).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["success"], serde_json::json!(true));
        assert_eq!(body["files"].as_array().unwrap().len(), 0);
    }
}
