//! certgen-server - Certificate generation web service
//!
//! An admin creates an event from a template image and stamp geometry,
//! uploads a CSV of recipients to generate personalized certificates in
//! bulk, and recipients retrieve or verify them later.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use certgen_common::config::{resolve_root_folder, DEFAULT_PORT};
use certgen_common::db::init_database;
use certgen_server::render::fonts::FontLibrary;
use certgen_server::storage::StorageDirs;
use certgen_server::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "certgen-server", about = "Certificate generation web service")]
struct Args {
    /// Storage root folder (overrides CERTGEN_ROOT and the config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// HTTP listen port
    #[arg(long, env = "CERTGEN_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// TrueType font used for stamping (overrides auto-discovery)
    #[arg(long, env = "CERTGEN_FONT")]
    font: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting certgen-server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), "CERTGEN_ROOT")?;
    let storage = StorageDirs::init(&root_folder)?;

    // Startup is the readiness gate: a database that cannot connect is
    // fatal, and no request is served before the pool exists.
    let db_path = root_folder.join("certgen.db");
    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let fonts = match FontLibrary::discover(args.font.as_deref())? {
        Some(library) => Some(Arc::new(library)),
        None => {
            warn!("No usable stamping font found; generation requests will fail until one is installed (set --font or CERTGEN_FONT)");
            None
        }
    };

    let state = AppState::new(pool, storage, fonts);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    info!("certgen-server listening on http://0.0.0.0:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
