//! Storage layout for templates and rendered certificates
//!
//! Everything lives under one root: `<root>/templates/` for uploaded
//! template images, `<root>/certificates/` for rendered output. Database
//! records store paths relative to the root.

use certgen_common::Result;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TEMPLATES_DIR: &str = "templates";
pub const CERTIFICATES_DIR: &str = "certificates";

/// Storage root with its two content subdirectories
#[derive(Debug, Clone)]
pub struct StorageDirs {
    root: PathBuf,
}

impl StorageDirs {
    /// Create the storage layout, creating directories as needed
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join(TEMPLATES_DIR))?;
        std::fs::create_dir_all(root.join(CERTIFICATES_DIR))?;
        info!("Storage root: {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative stored path for an uploaded template
    pub fn template_rel_path(token: &str, extension: &str) -> String {
        format!("{}/{}.{}", TEMPLATES_DIR, token, extension)
    }

    /// Relative stored path for a rendered certificate
    pub fn certificate_rel_path(certificate_id: &str) -> String {
        format!("{}/{}.png", CERTIFICATES_DIR, certificate_id)
    }

    /// Resolve a stored relative path to an absolute one.
    ///
    /// Historical records carried a leading `/static/` (the old mount
    /// prefix) or a bare leading slash; both still resolve.
    pub fn resolve(&self, stored: &str) -> PathBuf {
        let trimmed = stored.trim_start_matches('/');
        let trimmed = trimmed.strip_prefix("static/").unwrap_or(trimmed);
        self.root.join(trimmed)
    }
}
