//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up
//! idempotently. Connection failure here is fatal to the caller: the HTTP
//! router is only built after the pool exists, so no request is ever
//! served against an unconnected store.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Options apply per pooled connection:
    // - foreign_keys so event deletion cascades to certificates
    // - WAL allows concurrent readers with one writer
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Schema creation is idempotent - safe to call on every startup
    create_events_table(&pool).await?;
    create_certificates_table(&pool).await?;

    Ok(pool)
}

async fn create_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            template_path TEXT NOT NULL,
            text_position_x INTEGER NOT NULL,
            text_position_y INTEGER NOT NULL,
            font_size INTEGER NOT NULL DEFAULT 60,
            font_color TEXT NOT NULL DEFAULT '#000000',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_certificates_table(pool: &SqlitePool) -> Result<()> {
    // UNIQUE(event_id, email) is the dedup guard of last resort: even if
    // two generation runs race past the in-memory dedup set, only one
    // insert per recipient can land.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS certificates (
            id TEXT PRIMARY KEY,
            event_id TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            certificate_path TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(event_id, email)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_certificates_event_id ON certificates(event_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
