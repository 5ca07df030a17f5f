//! Certificate listing, export, download, and verification

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use certgen_common::db::Certificate;
use certgen_common::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ApiError;
use crate::db::{certificates, events};
use crate::{pdf, AppState};

/// GET /api/events/:event_id/certificates
pub async fn get_event_certificates(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> std::result::Result<Json<Vec<Certificate>>, ApiError> {
    let certificates = certificates::list_for_event(&state.db, &event_id).await?;
    Ok(Json(certificates))
}

/// Display format for exported timestamps
fn display_date(at: &DateTime<Utc>) -> String {
    at.format("%B %d, %Y %H:%M UTC").to_string()
}

/// GET /api/events/:event_id/certificates/export
///
/// CSV attachment with fixed columns, every field double-quoted. An event
/// with no certificates yet is a 404, not an empty file.
pub async fn export_event_certificates(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> std::result::Result<Response, ApiError> {
    let event = events::fetch_event(&state.db, &event_id).await?;
    let certs = certificates::list_for_event(&state.db, &event_id).await?;
    if certs.is_empty() {
        return Err(Error::NotFound("No certificates found for this event".to_string()).into());
    }

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    writer
        .write_record(["Name", "Email", "Generated At", "Certificate ID"])
        .map_err(|e| Error::Internal(format!("Failed to write CSV: {}", e)))?;
    for cert in &certs {
        writer
            .write_record([
                cert.name.as_str(),
                cert.email.as_str(),
                display_date(&cert.created_at).as_str(),
                cert.id.as_str(),
            ])
            .map_err(|e| Error::Internal(format!("Failed to write CSV: {}", e)))?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| Error::Internal(format!("Failed to write CSV: {}", e)))?;

    let disposition = format!("attachment; filename=\"{}_certificates.csv\"", event.slug);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Download request body. Unknown fields are rejected at the boundary.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadRequest {
    pub name: String,
    pub email: String,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "png".to_string()
}

/// POST /api/certificates/download
///
/// Locate a certificate by recipient (name case-insensitive, email
/// lower-cased) and stream it as the native raster or as a single-page
/// PDF sized exactly to the image.
pub async fn download_certificate(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> std::result::Result<Response, ApiError> {
    if request.name.trim().is_empty() || request.email.trim().is_empty() {
        return Err(Error::Validation("Name and email are required".to_string()).into());
    }

    let certificate = certificates::find_by_recipient(&state.db, &request.name, &request.email)
        .await?
        .ok_or_else(|| Error::NotFound("Certificate not found".to_string()))?;

    let path = state.storage.resolve(&certificate.certificate_path);
    let bytes = read_certificate_file(&path).await?;

    match request.format.as_str() {
        "png" => Ok(attachment_response(
            "image/png",
            &format!("{}_certificate.png", certificate.name),
            bytes,
        )),
        "pdf" => {
            let image = image::load_from_memory(&bytes).map_err(|e| {
                Error::Internal(format!("Failed to decode certificate image: {}", e))
            })?;
            let pdf_bytes = pdf::image_to_pdf(&image, &certificate.id)?;
            Ok(attachment_response(
                "application/pdf",
                &format!("{}_certificate.pdf", certificate.name),
                pdf_bytes,
            ))
        }
        other => Err(Error::UnsupportedFormat(other.to_string()).into()),
    }
}

async fn read_certificate_file(path: &std::path::Path) -> Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(Error::NotFound("Certificate file not found".to_string()))
        }
        Err(e) => Err(Error::Io(e)),
    }
}

fn attachment_response(content_type: &str, filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// Flattened certificate view for verification
#[derive(Debug, Serialize)]
pub struct VerifiedCertificate {
    pub id: String,
    pub name: String,
    pub email: String,
    pub event_name: String,
    pub event_slug: String,
    pub issued_at: DateTime<Utc>,
}

/// GET /api/certificates/verify/:certificate_id
///
/// An unknown id responds with a `valid: false` payload under a 404
/// status rather than a bare error.
pub async fn verify_certificate(
    State(state): State<AppState>,
    Path(certificate_id): Path<String>,
) -> std::result::Result<Response, ApiError> {
    let Some(certificate) = certificates::fetch_certificate(&state.db, &certificate_id).await?
    else {
        let body = Json(json!({ "valid": false, "error": "Certificate not found" }));
        return Ok((StatusCode::NOT_FOUND, body).into_response());
    };

    let event = events::fetch_event(&state.db, &certificate.event_id).await?;

    let body = Json(json!({
        "valid": true,
        "certificate": VerifiedCertificate {
            id: certificate.id,
            name: certificate.name,
            email: certificate.email,
            event_name: event.name,
            event_slug: event.slug,
            issued_at: certificate.created_at,
        },
    }));
    Ok(body.into_response())
}
