//! Batch generation endpoint

use axum::extract::{Multipart, Path, State};
use axum::Json;
use certgen_common::{Error, Result};
use serde::Serialize;

use super::ApiError;
use crate::db::events;
use crate::pipeline::{CertificateGenerator, RowError};
use crate::AppState;

/// Generation outcome as returned to the caller. `skipped` counts rows
/// whose recipient was already certified; without it a caller could not
/// tell "all new" from "mostly duplicates".
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub generated: u64,
    pub skipped: u64,
    pub errors: Vec<RowError>,
}

/// POST /api/events/:event_id/generate
///
/// Multipart upload carrying one CSV file of recipients.
pub async fn generate_certificates(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    multipart: Multipart,
) -> std::result::Result<Json<GenerateResponse>, ApiError> {
    let event = events::fetch_event(&state.db, &event_id).await?;

    let csv_bytes = read_csv_upload(multipart).await?;

    let fonts = state
        .fonts
        .clone()
        .ok_or_else(|| Error::Internal("No stamping font available on this server".to_string()))?;

    let generator = CertificateGenerator::new(state.db.clone(), state.storage.clone(), fonts);
    let outcome = generator.generate(&event, &csv_bytes).await?;

    Ok(Json(GenerateResponse {
        success: true,
        generated: outcome.generated,
        skipped: outcome.skipped,
        errors: outcome.errors,
    }))
}

/// Pull the CSV out of the multipart body: the `csv_file` field, or
/// failing that the first file field of any name.
async fn read_csv_upload(mut multipart: Multipart) -> Result<Vec<u8>> {
    let mut fallback = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Invalid multipart request: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        let is_file = field.file_name().is_some();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::Validation(format!("Failed to read CSV upload: {}", e)))?;

        if field_name == "csv_file" {
            return Ok(bytes.to_vec());
        }
        if is_file && fallback.is_none() {
            fallback = Some(bytes.to_vec());
        }
    }

    fallback.ok_or_else(|| Error::Validation("CSV file is required".to_string()))
}
