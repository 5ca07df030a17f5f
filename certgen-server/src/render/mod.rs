//! Certificate image rendering
//!
//! Stamps a recipient name at the event's configured position and the
//! certificate ID in the bottom-right corner of a cloned template bitmap.

pub mod fonts;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use certgen_common::db::Event;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

/// Pixels between the ID stamp's right edge and the image's right edge
const ID_MARGIN_RIGHT: i32 = 30;
/// Pixels between the ID stamp's bottom and the image's bottom edge
const ID_MARGIN_BOTTOM: i32 = 40;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Parse a `#RRGGBB` hex string into an opaque color.
///
/// Anything unparsable falls back to opaque black rather than failing the
/// batch.
pub fn parse_hex_color(hex: &str) -> Rgba<u8> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 {
        return BLACK;
    }
    match (
        u8::from_str_radix(&digits[0..2], 16),
        u8::from_str_radix(&digits[2..4], 16),
        u8::from_str_radix(&digits[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => Rgba([r, g, b, 255]),
        _ => BLACK,
    }
}

/// Advance width of `text` at `scale`, in pixels
pub fn text_width(font: &FontArc, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut previous = None;
    for c in text.chars() {
        let glyph = scaled.glyph_id(c);
        if let Some(prev) = previous {
            width += scaled.kern(prev, glyph);
        }
        width += scaled.h_advance(glyph);
        previous = Some(glyph);
    }
    width
}

/// Row-invariant rendering resources, built once per generation batch:
/// the decoded template, the parsed stamp color, and the snapped font tier.
pub struct CertificateStamper {
    template: RgbaImage,
    font: FontArc,
    color: Rgba<u8>,
    name_scale: PxScale,
    name_x: i32,
    name_y: i32,
}

impl CertificateStamper {
    pub fn new(event: &Event, template: RgbaImage, font: FontArc) -> Self {
        Self {
            template,
            font,
            color: parse_hex_color(&event.font_color),
            name_scale: fonts::tier_for_size(event.font_size),
            name_x: event.text_position_x as i32,
            name_y: event.text_position_y as i32,
        }
    }

    /// Clone the template and stamp one recipient's certificate:
    /// name left/top-aligned at the configured position, then
    /// `Certificate ID: <id>` right-aligned above the bottom edge.
    pub fn render(&self, recipient: &str, certificate_id: &str) -> RgbaImage {
        let mut img = self.template.clone();

        draw_text_mut(
            &mut img,
            self.color,
            self.name_x,
            self.name_y,
            self.name_scale,
            &self.font,
            recipient,
        );

        let label = format!("Certificate ID: {}", certificate_id);
        let id_scale = PxScale::from(fonts::ID_STAMP_SCALE);
        let label_width = text_width(&self.font, id_scale, &label);
        let label_height = self.font.as_scaled(id_scale).height();

        let x = img.width() as i32 - ID_MARGIN_RIGHT - label_width.ceil() as i32;
        let y = img.height() as i32 - ID_MARGIN_BOTTOM - label_height.ceil() as i32;

        draw_text_mut(&mut img, BLACK, x.max(0), y.max(0), id_scale, &self.font, &label);

        img
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fonts::FontLibrary;

    #[test]
    fn parses_valid_hex_color() {
        assert_eq!(parse_hex_color("#1a2b3c"), Rgba([0x1a, 0x2b, 0x3c, 255]));
        assert_eq!(parse_hex_color("FF0000"), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn unparsable_color_falls_back_to_black() {
        assert_eq!(parse_hex_color(""), BLACK);
        assert_eq!(parse_hex_color("#fff"), BLACK);
        assert_eq!(parse_hex_color("#zzzzzz"), BLACK);
        assert_eq!(parse_hex_color("not a color"), BLACK);
    }

    #[test]
    fn stamping_changes_pixels() {
        let Ok(Some(library)) = FontLibrary::discover(None) else {
            eprintln!("Skipping test: no system font found");
            return;
        };

        let event = Event::new(
            "stamp-test".to_string(),
            "Stamp Test".to_string(),
            "templates/ignored.png".to_string(),
            10,
            10,
            32,
            "#ff0000".to_string(),
        );
        let template = RgbaImage::from_pixel(400, 200, Rgba([255, 255, 255, 255]));
        let stamper = CertificateStamper::new(&event, template.clone(), library.font().clone());

        let rendered = stamper.render("Ada Lovelace", "abc-123");
        assert_eq!(rendered.dimensions(), template.dimensions());
        assert_ne!(rendered.as_raw(), template.as_raw(), "Stamp should alter the bitmap");
    }

    #[test]
    fn wider_text_measures_wider() {
        let Ok(Some(library)) = FontLibrary::discover(None) else {
            eprintln!("Skipping test: no system font found");
            return;
        };

        let scale = PxScale::from(32.0);
        let short = text_width(library.font(), scale, "Hi");
        let long = text_width(library.font(), scale, "Hi there, certificate");
        assert!(long > short);
        assert!(short > 0.0);
    }
}
