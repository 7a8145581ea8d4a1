//! Axum HTTP surface: shared state, router assembly, server lifecycle.

mod error;
mod routes_upload;
mod routes_videos;

pub use error::{AppError, AppResult};

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Json, Router};
use reelvault_db::pool::DbPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::storage::MediaStore;
use crate::upload::expiry::start_expiry_sweep;
use crate::upload::UploadPipeline;

/// Headroom on top of the file cap for multipart framing.
const UPLOAD_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppContext {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub store: Arc<dyn MediaStore>,
    pub pipeline: Arc<UploadPipeline>,
}

impl AppContext {
    pub fn new(config: Config, db: DbPool, store: Arc<dyn MediaStore>) -> Self {
        let pipeline = Arc::new(UploadPipeline::new(
            db.clone(),
            store.clone(),
            config.upload.clone(),
        ));
        Self {
            db,
            config: Arc::new(config),
            store,
            pipeline,
        }
    }
}

/// Build the application router.
///
/// All API routes live under `/api`; `/health` sits at the root.
pub fn create_router(ctx: AppContext) -> Router {
    let body_limit = ctx.config.upload.max_file_size_bytes as usize + UPLOAD_OVERHEAD_BYTES;

    let api = Router::new()
        .merge(routes_upload::routes())
        .merge(routes_videos::routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Run the server until a shutdown signal arrives.
///
/// Spawns the session expiry sweep alongside the listener and tears it
/// down when the server stops.
pub async fn start_server(
    config: Config,
    db: DbPool,
    store: Arc<dyn MediaStore>,
) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let ttl = Duration::from_secs(config.upload.session_ttl_secs);
    let interval = Duration::from_secs(config.upload.sweep_interval_secs);

    let ctx = AppContext::new(config, db.clone(), store.clone());
    let sweeper = start_expiry_sweep(db, store, ttl, interval);
    let app = create_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "reelvault listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
