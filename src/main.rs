//! Stash Server
//!
//! A content-addressed file host: clients POST files, identical content is
//! deduplicated, and each distinct file ends up in S3 under a short random
//! public name with its metadata in a local SQLite index.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stash_server::config::Config;
use stash_server::db::{self, SqliteFileIndex};
use stash_server::ingest::{IngestionPipeline, MarkerDir, NameAllocator};
use stash_server::routes;
use stash_server::state::AppState;
use stash_server::storage::S3Client;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check(State(_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stash_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    tracing::info!("Starting Stash Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("S3 bucket: {}", config.storage.bucket);
    tracing::info!("Marker directory: {}", config.paths.marker_dir.display());

    // Initialize S3 client
    let s3_client = S3Client::new(&config.storage)
        .await
        .context("failed to initialize S3 client")?;

    // Initialize database
    let db_pool = db::create_pool(&config.database.url)
        .await
        .context("failed to initialize database")?;
    tracing::info!("Database initialized at {}", config.database.url);

    // Wire up the ingestion pipeline
    let pipeline = IngestionPipeline::new(
        Arc::new(SqliteFileIndex::new(db_pool)),
        Arc::new(s3_client),
        NameAllocator::new(
            config.ingest.public_name_length,
            config.ingest.name_retries,
            config.ingest.compound_extensions.clone(),
        ),
        MarkerDir::new(&config.paths.marker_dir),
    );

    let max_upload_size = config.ingest.max_upload_size;
    let app_state = AppState::new(config.clone(), pipeline);

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .merge(routes::upload::router())
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    tracing::info!("Stash Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
