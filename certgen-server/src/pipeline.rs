//! Batch certificate generation pipeline
//!
//! Converts an uploaded CSV of recipients into rendered certificate images
//! and store records, without duplicating recipients:
//!
//! 1. Parse the CSV fully into ordered row records (header-driven,
//!    `name` and `email` columns required).
//! 2. Load the dedup set: every email already certified for the event,
//!    in one query.
//! 3. Build row-invariant rendering resources once (decoded template,
//!    parsed color, snapped font tier).
//! 4. Per row: trim; empty name/email is a recorded row error; a known
//!    email is a silent skip; otherwise render, save `<id>.png`, and
//!    buffer the record.
//! 5. Flush the buffer as one bulk insert every `INSERT_BATCH_SIZE` rows
//!    and once after the loop.
//!
//! Row failures never abort the batch; they accumulate in the outcome.
//! There is no cross-flush rollback: a crash mid-batch leaves flushed rows
//! persisted, and a re-run is safe because the dedup set (backed by the
//! store's unique (event_id, email) constraint) skips them.

use std::collections::HashSet;
use std::sync::Arc;

use certgen_common::db::{Certificate, Event};
use certgen_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::certificates;
use crate::render::fonts::FontLibrary;
use crate::render::CertificateStamper;
use crate::storage::StorageDirs;

/// Pending records are flushed as one bulk insert at this size
pub const INSERT_BATCH_SIZE: usize = 100;

/// One failed input row. Never fatal to the batch; returned to the caller
/// as data, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    /// 1-based data row number (header row not counted)
    pub row: usize,
    /// Raw row text as it appeared in the upload
    pub context: String,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row {}: {}", self.row, self.message)
    }
}

/// Result of one generation run
#[derive(Debug, Default)]
pub struct GenerationOutcome {
    /// Rows turned into persisted certificates
    pub generated: u64,
    /// Rows silently skipped because the recipient was already certified
    pub skipped: u64,
    pub errors: Vec<RowError>,
}

/// A parsed CSV data row, or the reason it could not be read
#[derive(Debug)]
struct CsvRow {
    row: usize,
    /// Raw comma-joined row text, kept for error reporting
    raw: String,
    data: std::result::Result<(String, String), String>,
}

/// Parse the whole CSV buffer into ordered rows.
///
/// The header row must carry `name` and `email` columns; anything else in
/// the header is ignored. Rows are kept in source order, with unreadable
/// rows represented as row-scoped failures rather than aborting the parse.
fn parse_recipients(csv_bytes: &[u8]) -> Result<Vec<CsvRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_bytes);

    let headers = reader
        .headers()
        .map_err(|e| Error::Validation(format!("Invalid CSV: {}", e)))?
        .clone();

    let name_idx = headers.iter().position(|h| h.trim() == "name");
    let email_idx = headers.iter().position(|h| h.trim() == "email");
    let (name_idx, email_idx) = match (name_idx, email_idx) {
        (Some(n), Some(e)) => (n, e),
        _ => {
            return Err(Error::Validation(
                "CSV must have 'name' and 'email' columns".to_string(),
            ))
        }
    };

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        let (raw, data) = match record {
            Ok(record) => {
                let raw = record.iter().collect::<Vec<_>>().join(",");
                let name = record.get(name_idx).unwrap_or("").to_string();
                let email = record.get(email_idx).unwrap_or("").to_string();
                (raw, Ok((name, email)))
            }
            Err(e) => (String::new(), Err(format!("Unreadable row: {}", e))),
        };
        rows.push(CsvRow { row, raw, data });
    }

    Ok(rows)
}

/// Batch certificate generator, one instance per generation request
pub struct CertificateGenerator {
    db: SqlitePool,
    storage: StorageDirs,
    fonts: Arc<FontLibrary>,
}

impl CertificateGenerator {
    pub fn new(db: SqlitePool, storage: StorageDirs, fonts: Arc<FontLibrary>) -> Self {
        Self { db, storage, fonts }
    }

    /// Run the pipeline for one event and CSV upload
    pub async fn generate(&self, event: &Event, csv_bytes: &[u8]) -> Result<GenerationOutcome> {
        let rows = parse_recipients(csv_bytes)?;
        info!(
            event_id = %event.id,
            rows = rows.len(),
            "Starting certificate generation"
        );

        let mut dedup: HashSet<String> =
            certificates::certified_emails(&self.db, &event.id).await?;

        // Row-invariant resources, loaded exactly once. A failure here
        // fails the whole request; nothing has been persisted yet.
        let template_path = self.storage.resolve(&event.template_path);
        let template = image::open(&template_path)
            .map_err(|e| {
                Error::Internal(format!(
                    "Failed to load template {}: {}",
                    template_path.display(),
                    e
                ))
            })?
            .to_rgba8();
        let stamper = CertificateStamper::new(event, template, self.fonts.font().clone());

        let mut outcome = GenerationOutcome::default();
        let mut pending: Vec<Certificate> = Vec::new();

        for row in rows {
            let (name, email) = match row.data {
                Ok(ref data) => (data.0.trim(), data.1.trim()),
                Err(message) => {
                    outcome.errors.push(RowError {
                        row: row.row,
                        context: row.raw,
                        message,
                    });
                    continue;
                }
            };

            if name.is_empty() || email.is_empty() {
                outcome.errors.push(RowError {
                    row: row.row,
                    context: row.raw.clone(),
                    message: "Missing name or email".to_string(),
                });
                continue;
            }

            let email = email.to_lowercase();
            if dedup.contains(&email) {
                outcome.skipped += 1;
                continue;
            }

            let certificate_id = Uuid::new_v4().to_string();
            let rel_path = StorageDirs::certificate_rel_path(&certificate_id);
            let rendered = stamper.render(name, &certificate_id);

            if let Err(e) = rendered.save(self.storage.resolve(&rel_path)) {
                warn!(row = row.row, error = %e, "Failed to save certificate image");
                outcome.errors.push(RowError {
                    row: row.row,
                    context: row.raw.clone(),
                    message: format!("Failed to save certificate: {}", e),
                });
                continue;
            }

            dedup.insert(email.clone());
            pending.push(Certificate::new(
                certificate_id,
                event.id.clone(),
                name.to_string(),
                email,
                rel_path,
            ));

            if pending.len() >= INSERT_BATCH_SIZE {
                self.flush(&mut pending, &mut outcome).await?;
            }
        }

        self.flush(&mut pending, &mut outcome).await?;

        info!(
            event_id = %event.id,
            generated = outcome.generated,
            skipped = outcome.skipped,
            errors = outcome.errors.len(),
            "Certificate generation finished"
        );
        Ok(outcome)
    }

    /// Flush pending records as one bulk insert.
    ///
    /// Rows dropped by the store's conflict handling were certified by a
    /// concurrent run after our dedup query; they count as skipped, not
    /// generated.
    async fn flush(
        &self,
        pending: &mut Vec<Certificate>,
        outcome: &mut GenerationOutcome,
    ) -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }

        let attempted = pending.len() as u64;
        let inserted = certificates::insert_certificates(&self.db, pending).await?;
        debug!(attempted, inserted, "Flushed certificate batch");

        if inserted < attempted {
            // A concurrent run certified some of these recipients between
            // our dedup query and this flush; their rendered files have no
            // owning record and must not linger on disk.
            let kept = certificates::existing_ids(&self.db, pending).await?;
            for cert in pending.iter().filter(|c| !kept.contains(&c.id)) {
                let path = self.storage.resolve(&cert.certificate_path);
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "Failed to remove orphaned certificate image");
                }
            }
        }

        outcome.generated += inserted;
        outcome.skipped += attempted - inserted;
        pending.clear();
        Ok(())
    }
}
