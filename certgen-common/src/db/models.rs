//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An admin-defined certificate campaign: template image plus stamp
/// position and style. Immutable once created; deletion cascades to its
/// certificates and the stored template file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: String,
    /// URL-safe identifier derived from `name`; unique across all events
    pub slug: String,
    pub name: String,
    /// Path relative to the storage root, e.g. `templates/<token>.png`
    pub template_path: String,
    /// Pixel coordinates of the recipient-name stamp within the template
    pub text_position_x: i64,
    pub text_position_y: i64,
    /// Requested stamp size in pixels; rendering snaps to a font tier
    pub font_size: i64,
    /// Hex RGB string, e.g. `#1a2b3c`; unparsable values render as black
    pub font_color: String,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(
        slug: String,
        name: String,
        template_path: String,
        text_position_x: i64,
        text_position_y: i64,
        font_size: i64,
        font_color: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            slug,
            name,
            template_path,
            text_position_x,
            text_position_y,
            font_size,
            font_color,
            created_at: Utc::now(),
        }
    }
}

/// One rendered, recipient-specific certificate tied to an event.
///
/// `email` is stored lower-cased so lookups are case-insensitive; the pair
/// (`event_id`, `email`) is unique, so a recipient receives at most one
/// certificate per event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Certificate {
    /// Also stamped as visible text on the rendered image
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub email: String,
    /// Path relative to the storage root, e.g. `certificates/<id>.png`
    pub certificate_path: String,
    pub created_at: DateTime<Utc>,
}

impl Certificate {
    /// The id is assigned by the caller because it names the rendered file
    /// and appears as visible text on the image before the record exists.
    pub fn new(
        id: String,
        event_id: String,
        name: String,
        email: String,
        certificate_path: String,
    ) -> Self {
        Self {
            id,
            event_id,
            name,
            email,
            certificate_path,
            created_at: Utc::now(),
        }
    }
}
