//! Image to single-page PDF conversion
//!
//! A downloaded certificate can be delivered as a PDF whose single page is
//! sized exactly to the source image's pixel dimensions: zero margins, no
//! scaling, no extra pages.

use certgen_common::{Error, Result};
use image::{DynamicImage, ImageFormat};
use printpdf::{ImageTransform, Mm, PdfDocument};
use std::io::{BufWriter, Cursor};

/// Render DPI tying pixel dimensions to physical page size. Page math and
/// image placement must use the same value or the image no longer fills
/// the page edge to edge.
const RENDER_DPI: f32 = 96.0;

const MM_PER_INCH: f32 = 25.4;

/// Physical page dimension for a pixel count at the render DPI
pub fn px_to_mm(px: u32) -> Mm {
    Mm(px as f32 * MM_PER_INCH / RENDER_DPI)
}

/// Flatten a raster image into a one-page PDF document
pub fn image_to_pdf(image: &DynamicImage, title: &str) -> Result<Vec<u8>> {
    let width = image.width();
    let height = image.height();

    let (doc, page, layer) =
        PdfDocument::new(title, px_to_mm(width), px_to_mm(height), "certificate");
    let layer_ref = doc.get_page(page).get_layer(layer);

    // Flatten to RGB8; alpha is meaningless on a full-bleed page. The PDF
    // library bundles its own copy of the image decoder, so the bitmap
    // crosses that boundary as encoded PNG bytes.
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(image.to_rgb8())
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| Error::Internal(format!("Failed to encode certificate image: {}", e)))?;
    let embedded = printpdf::image_crate::load_from_memory(&png)
        .map_err(|e| Error::Internal(format!("Failed to embed certificate image: {}", e)))?;
    let pdf_image = printpdf::Image::from_dynamic_image(&embedded);
    pdf_image.add_to_layer(
        layer_ref,
        ImageTransform {
            dpi: Some(RENDER_DPI),
            ..Default::default()
        },
    );

    let mut bytes = Vec::new();
    doc.save(&mut BufWriter::new(&mut bytes))
        .map_err(|e| Error::Internal(format!("Failed to write PDF: {}", e)))?;
    Ok(bytes)
}
