//! Stamping font discovery and size tiers
//!
//! Certificates are stamped at one of four fixed pixel-size tiers rather
//! than at arbitrary sizes: an event's `font_size` snaps to the largest
//! tier that does not exceed it. The certificate-ID footer always uses the
//! smallest tier.

use ab_glyph::{FontArc, PxScale};
use certgen_common::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Fixed stamping tiers in pixels, ascending
pub const SCALE_TIERS: [f32; 4] = [16.0, 32.0, 64.0, 128.0];

/// Fixed tier for the `Certificate ID: ...` footer stamp
pub const ID_STAMP_SCALE: f32 = 16.0;

/// Common sans-serif font locations, checked in order
const CANDIDATE_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

/// A loaded TrueType font shared by all generation requests
pub struct FontLibrary {
    font: FontArc,
    source: PathBuf,
}

impl FontLibrary {
    /// Load a font from an explicit path
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| Error::Config(format!("Failed to parse font {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded stamping font");
        Ok(Self {
            font,
            source: path.to_path_buf(),
        })
    }

    /// Discover a usable font.
    ///
    /// An explicit path (CLI/env override) that fails to load is a hard
    /// configuration error; otherwise the candidate list is scanned and
    /// `None` means nothing usable was found - the server still starts,
    /// but generation requests will fail.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<Self>> {
        if let Some(path) = explicit {
            return Self::load(path).map(Some);
        }

        for candidate in CANDIDATE_PATHS {
            let path = Path::new(candidate);
            if !path.exists() {
                continue;
            }
            match Self::load(path) {
                Ok(library) => {
                    info!("Using stamping font: {}", path.display());
                    return Ok(Some(library));
                }
                Err(e) => {
                    warn!("Skipping unusable font {}: {}", path.display(), e);
                }
            }
        }

        Ok(None)
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Snap a requested pixel size to the largest tier not exceeding it,
/// falling back to the smallest tier for sizes below all tiers.
pub fn tier_for_size(font_size: i64) -> PxScale {
    let requested = font_size as f32;
    let tier = SCALE_TIERS
        .iter()
        .rev()
        .find(|t| **t <= requested)
        .copied()
        .unwrap_or(SCALE_TIERS[0]);
    PxScale::from(tier)
}
