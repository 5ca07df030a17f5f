//! certgen-server library - Certificate generator HTTP service
//!
//! Routes, application state, the batch generation pipeline, and the
//! rendering/PDF helpers live here; `main.rs` only wires startup.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod pdf;
pub mod pipeline;
pub mod render;
pub mod storage;

use render::fonts::FontLibrary;
use storage::StorageDirs;

/// Uploads (template images, CSV batches) may exceed axum's 2 MB default
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Storage root with `templates/` and `certificates/` subdirectories
    pub storage: StorageDirs,
    /// Stamping font, discovered at startup. `None` means no usable font
    /// was found; generation requests fail with 500 but every other
    /// endpoint still works.
    pub fonts: Option<Arc<FontLibrary>>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, storage: StorageDirs, fonts: Option<Arc<FontLibrary>>) -> Self {
        Self { db, storage, fonts }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/", get(api::root))
        .route("/events", post(api::create_event).get(api::list_events))
        .route("/events/:event_id", get(api::get_event).delete(api::delete_event))
        .route("/events/slug/:slug", get(api::get_event_by_slug))
        .route("/events/:event_id/generate", post(api::generate_certificates))
        .route("/events/:event_id/certificates", get(api::get_event_certificates))
        .route(
            "/events/:event_id/certificates/export",
            get(api::export_event_certificates),
        )
        .route("/certificates/download", post(api::download_certificate))
        .route("/certificates/verify/:certificate_id", get(api::verify_certificate))
        .route("/dashboard/stats", get(api::dashboard_stats));

    Router::new()
        .nest("/api", api)
        // Nesting does not match the trailing-slash form of the prefix
        // itself, so the banner is routed there explicitly
        .route("/api/", get(api::root))
        .merge(api::health_routes())
        .nest_service("/static", ServeDir::new(state.storage.root().to_path_buf()))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
