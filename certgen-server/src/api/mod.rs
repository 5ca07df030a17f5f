//! HTTP API handlers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use certgen_common::Error;
use serde_json::json;

mod certificates;
mod dashboard;
mod events;
mod generate;
mod health;

pub use certificates::{
    download_certificate, export_event_certificates, get_event_certificates, verify_certificate,
};
pub use dashboard::dashboard_stats;
pub use events::{
    create_event, delete_event, get_event, get_event_by_slug, list_events,
};
pub use generate::generate_certificates;
pub use health::health_routes;

/// GET /api/
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Certificate Generator API" }))
}

/// Handler-level error: maps the common taxonomy onto HTTP statuses with a
/// JSON `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::UnsupportedFormat(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Error::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Error::Io(e) => {
                tracing::error!("IO error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Error::Config(msg) | Error::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
