//! Event creation, lookup, and deletion

use axum::extract::{Multipart, Path, State};
use axum::Json;
use certgen_common::db::Event;
use certgen_common::{Error, Result};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::ApiError;
use crate::db::{certificates, events};
use crate::storage::StorageDirs;
use crate::AppState;

/// Allowed template image extensions
const TEMPLATE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Parsed multipart form for event creation
struct EventForm {
    name: String,
    template_filename: String,
    template_bytes: Vec<u8>,
    text_position_x: i64,
    text_position_y: i64,
    font_size: i64,
    font_color: String,
}

async fn read_event_form(mut multipart: Multipart) -> Result<EventForm> {
    let mut name = None;
    let mut template = None;
    let mut text_position_x = None;
    let mut text_position_y = None;
    let mut font_size = None;
    let mut font_color = None;

    while let Some(field) = next_field(&mut multipart).await? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "name" => name = Some(text_value(field, "name").await?),
            "template" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| Error::Validation("Template must be a file upload".to_string()))?;
                let bytes = field.bytes().await.map_err(|e| {
                    Error::Validation(format!("Failed to read template upload: {}", e))
                })?;
                template = Some((filename, bytes.to_vec()));
            }
            "text_position_x" => text_position_x = Some(int_value(field, "text_position_x").await?),
            "text_position_y" => text_position_y = Some(int_value(field, "text_position_y").await?),
            "font_size" => font_size = Some(int_value(field, "font_size").await?),
            "font_color" => font_color = Some(text_value(field, "font_color").await?),
            other => {
                return Err(Error::Validation(format!("Unknown field: {}", other)));
            }
        }
    }

    let (template_filename, template_bytes) =
        template.ok_or_else(|| Error::Validation("Template file is required".to_string()))?;

    Ok(EventForm {
        name: require(name, "name")?,
        template_filename,
        template_bytes,
        text_position_x: require(text_position_x, "text_position_x")?,
        text_position_y: require(text_position_y, "text_position_y")?,
        font_size: font_size.unwrap_or(60),
        font_color: font_color.unwrap_or_else(|| "#000000".to_string()),
    })
}

async fn next_field(multipart: &mut Multipart) -> Result<Option<axum::extract::multipart::Field<'_>>> {
    multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Invalid multipart request: {}", e)))
}

async fn text_value(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| Error::Validation(format!("Invalid value for '{}': {}", name, e)))
}

async fn int_value(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<i64> {
    let text = text_value(field, name).await?;
    text.trim()
        .parse()
        .map_err(|_| Error::Validation(format!("'{}' must be an integer", name)))
}

fn require<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| Error::Validation(format!("'{}' is required", name)))
}

fn template_extension(filename: &str) -> Result<String> {
    let extension = filename
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_lowercase();
    if TEMPLATE_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(Error::Validation(
            "Only PNG and JPEG files are allowed".to_string(),
        ))
    }
}

/// POST /api/events
///
/// Create a new event with its certificate template. The template lands
/// under `templates/` named by a fresh token; the event gets a unique slug
/// derived from its name.
pub async fn create_event(
    State(state): State<AppState>,
    multipart: Multipart,
) -> std::result::Result<Json<Event>, ApiError> {
    let form = read_event_form(multipart).await?;
    let extension = template_extension(&form.template_filename)?;

    let slug = events::unique_slug(&state.db, &form.name).await?;

    let token = Uuid::new_v4().to_string();
    let template_rel = StorageDirs::template_rel_path(&token, &extension);
    tokio::fs::write(state.storage.resolve(&template_rel), &form.template_bytes)
        .await
        .map_err(Error::Io)?;

    let event = Event::new(
        slug,
        form.name,
        template_rel,
        form.text_position_x,
        form.text_position_y,
        form.font_size,
        form.font_color,
    );
    events::insert_event(&state.db, &event).await?;

    info!(event_id = %event.id, slug = %event.slug, "Created event");
    Ok(Json(event))
}

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
) -> std::result::Result<Json<Vec<Event>>, ApiError> {
    let events = events::list_events(&state.db).await?;
    Ok(Json(events))
}

/// GET /api/events/:event_id
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> std::result::Result<Json<Event>, ApiError> {
    let event = events::fetch_event(&state.db, &event_id).await?;
    Ok(Json(event))
}

/// GET /api/events/slug/:slug
pub async fn get_event_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> std::result::Result<Json<Event>, ApiError> {
    let event = events::fetch_event_by_slug(&state.db, &slug).await?;
    Ok(Json(event))
}

/// Deletion summary
#[derive(Debug, Serialize)]
pub struct DeleteEventResponse {
    pub success: bool,
    pub certificates_deleted: usize,
}

/// DELETE /api/events/:event_id
///
/// Cascading delete: certificate image files, certificate rows (via the
/// foreign-key cascade), the template file, and the event row. Files are
/// removed before the rows so a failure cannot leave records pointing at
/// nothing; a missing file is logged and skipped, not fatal.
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> std::result::Result<Json<DeleteEventResponse>, ApiError> {
    let event = events::fetch_event(&state.db, &event_id).await?;
    let certs = certificates::list_for_event(&state.db, &event_id).await?;

    for cert in &certs {
        remove_file(&state, &cert.certificate_path).await;
    }
    remove_file(&state, &event.template_path).await;

    events::delete_event(&state.db, &event_id).await?;

    info!(
        event_id = %event_id,
        certificates = certs.len(),
        "Deleted event and its certificates"
    );
    Ok(Json(DeleteEventResponse {
        success: true,
        certificates_deleted: certs.len(),
    }))
}

async fn remove_file(state: &AppState, stored_path: &str) {
    let path = state.storage.resolve(stored_path);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove file");
        }
    }
}
