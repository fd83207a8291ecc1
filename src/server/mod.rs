//! HTTP service.
//!
//! Routes:
//! - `GET /`            landing page with the upload form
//! - `POST /upload`     multipart form, redirects to the rendered SVG
//! - `POST /raw`        raw body, replies with the SVG URL as text
//! - `GET /view/<id>`   the stored SVG

pub mod error;
pub mod handlers;
pub mod routes;
pub mod template;

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::core::{ArtifactStore, RenderPipeline};

pub use error::ApiError;
pub use routes::{parse_view_path, view_path, GRAPH_FORM_FIELD, RAW_PATH, UPLOAD_PATH, VIEW_PATH};

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<RenderPipeline>,
    store: Arc<ArtifactStore>,
    cache_control: Arc<str>,
}

impl AppState {
    /// Create handler state; the store is the one the pipeline writes to
    pub fn new(pipeline: Arc<RenderPipeline>, cache_control: impl Into<Arc<str>>) -> Self {
        let store = Arc::clone(pipeline.store());
        Self {
            pipeline,
            store,
            cache_control: cache_control.into(),
        }
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn cache_control(&self) -> &str {
        &self.cache_control
    }
}

/// Build the router
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(routes::ROOT_PATH, get(handlers::index))
        .route(UPLOAD_PATH, post(handlers::upload))
        .route(RAW_PATH, post(handlers::raw))
        .route("/view/*name", get(handlers::view))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("Failed to read listener address")?;
    info!(%addr, "listening (http://localhost:{}/)", addr.port());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}
