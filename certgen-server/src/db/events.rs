//! Event store queries

use certgen_common::db::Event;
use certgen_common::slug::{slugify, suffixed};
use certgen_common::{Error, Result};
use sqlx::SqlitePool;

/// Derive a slug for `name` that is unique across stored events.
///
/// On collision, numeric suffixes `-1`, `-2`, ... are probed in increasing
/// order and the first free one wins. A name with no usable characters is
/// a validation failure; an empty slug is never stored.
pub async fn unique_slug(pool: &SqlitePool, name: &str) -> Result<String> {
    let base = slugify(name);
    if base.is_empty() {
        return Err(Error::Validation(
            "Event name must contain at least one letter or digit".to_string(),
        ));
    }

    if !slug_exists(pool, &base).await? {
        return Ok(base);
    }

    let mut n = 1;
    loop {
        let candidate = suffixed(&base, n);
        if !slug_exists(pool, &candidate).await? {
            return Ok(candidate);
        }
        n += 1;
    }
}

async fn slug_exists(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let existing: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM events WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(existing.is_some())
}

pub async fn insert_event(pool: &SqlitePool, event: &Event) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO events (id, slug, name, template_path, text_position_x, text_position_y, font_size, font_color, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&event.id)
    .bind(&event.slug)
    .bind(&event.name)
    .bind(&event.template_path)
    .bind(event.text_position_x)
    .bind(event.text_position_y)
    .bind(event.font_size)
    .bind(&event.font_color)
    .bind(event.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_events(pool: &SqlitePool) -> Result<Vec<Event>> {
    let events = sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    Ok(events)
}

pub async fn fetch_event(pool: &SqlitePool, event_id: &str) -> Result<Event> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
        .bind(event_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("Event not found".to_string()))
}

pub async fn fetch_event_by_slug(pool: &SqlitePool, slug: &str) -> Result<Event> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("Event not found".to_string()))
}

/// Delete the event row; certificate rows go with it via the foreign-key
/// cascade. Callers must remove backing files first.
pub async fn delete_event(pool: &SqlitePool, event_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count_events(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn recent_events(pool: &SqlitePool, limit: i64) -> Result<Vec<Event>> {
    let events =
        sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY created_at DESC LIMIT ?")
            .bind(limit)
            .fetch_all(pool)
            .await?;
    Ok(events)
}
