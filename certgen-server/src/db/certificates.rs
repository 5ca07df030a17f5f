//! Certificate store queries

use certgen_common::db::Certificate;
use certgen_common::Result;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use std::collections::HashSet;

/// Emails already certified for an event, lower-cased. One query, not
/// per-row: this is the generation pipeline's dedup set.
pub async fn certified_emails(pool: &SqlitePool, event_id: &str) -> Result<HashSet<String>> {
    let emails: Vec<(String,)> =
        sqlx::query_as("SELECT email FROM certificates WHERE event_id = ?")
            .bind(event_id)
            .fetch_all(pool)
            .await?;
    Ok(emails.into_iter().map(|(email,)| email).collect())
}

/// Bulk-insert a batch of certificates.
///
/// Conflicts on (event_id, email) are dropped silently; the returned count
/// is the number of rows actually inserted, so a concurrent run that beat
/// us to a recipient is not double-counted.
pub async fn insert_certificates(pool: &SqlitePool, batch: &[Certificate]) -> Result<u64> {
    if batch.is_empty() {
        return Ok(0);
    }

    let mut builder = sqlx::QueryBuilder::new(
        "INSERT INTO certificates (id, event_id, name, email, certificate_path, created_at) ",
    );
    builder.push_values(batch, |mut row, cert| {
        row.push_bind(&cert.id)
            .push_bind(&cert.event_id)
            .push_bind(&cert.name)
            .push_bind(&cert.email)
            .push_bind(&cert.certificate_path)
            .push_bind(cert.created_at);
    });
    builder.push(" ON CONFLICT(event_id, email) DO NOTHING");

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// Of the given batch, the ids that actually landed in the store. Used
/// after a conflicted bulk insert to tell winners from dropped rows.
pub async fn existing_ids(pool: &SqlitePool, batch: &[Certificate]) -> Result<HashSet<String>> {
    if batch.is_empty() {
        return Ok(HashSet::new());
    }

    let mut builder = sqlx::QueryBuilder::new("SELECT id FROM certificates WHERE id IN (");
    let mut ids = builder.separated(", ");
    for cert in batch {
        ids.push_bind(&cert.id);
    }
    builder.push(")");

    let rows: Vec<(String,)> = builder.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub async fn list_for_event(pool: &SqlitePool, event_id: &str) -> Result<Vec<Certificate>> {
    let certificates = sqlx::query_as::<_, Certificate>(
        "SELECT * FROM certificates WHERE event_id = ? ORDER BY created_at",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;
    Ok(certificates)
}

pub async fn fetch_certificate(
    pool: &SqlitePool,
    certificate_id: &str,
) -> Result<Option<Certificate>> {
    let certificate =
        sqlx::query_as::<_, Certificate>("SELECT * FROM certificates WHERE id = ?")
            .bind(certificate_id)
            .fetch_optional(pool)
            .await?;
    Ok(certificate)
}

/// Locate a certificate by recipient. Name matching is case-insensitive
/// but otherwise exact; email is matched against its stored lower-cased
/// form.
pub async fn find_by_recipient(
    pool: &SqlitePool,
    name: &str,
    email: &str,
) -> Result<Option<Certificate>> {
    let certificate = sqlx::query_as::<_, Certificate>(
        "SELECT * FROM certificates WHERE name = ? COLLATE NOCASE AND email = ?",
    )
    .bind(name.trim())
    .bind(email.trim().to_lowercase())
    .fetch_optional(pool)
    .await?;
    Ok(certificate)
}

pub async fn count_certificates(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM certificates")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Per-event certificate totals for the dashboard
#[derive(Debug, Serialize, FromRow)]
pub struct EventCertificateCount {
    pub event_id: String,
    pub event_name: String,
    pub event_slug: String,
    pub count: i64,
}

pub async fn counts_by_event(pool: &SqlitePool) -> Result<Vec<EventCertificateCount>> {
    let counts = sqlx::query_as::<_, EventCertificateCount>(
        r#"
        SELECT c.event_id AS event_id,
               e.name AS event_name,
               e.slug AS event_slug,
               COUNT(*) AS count
        FROM certificates c
        JOIN events e ON e.id = c.event_id
        GROUP BY c.event_id
        ORDER BY count DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(counts)
}
