//! Overlay rendering.
//!
//! Stages describe what to draw as a list of [`DrawItem`]s. The
//! [`OverlayRenderer`] paints them, in order, onto a fully transparent layer
//! the size of the base image, then alpha-composites that layer onto a copy
//! of the base and re-encodes the result in the base image's format.
//!
//! ```
//! use image::Rgba;
//! use imgvis::ir::Point;
//! use imgvis::render::DrawItem;
//!
//! let item = DrawItem::shape(
//!     vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(4.0, 4.0)],
//!     Some(Rgba([255, 0, 0, 255])),
//!     None,
//! );
//! assert!(matches!(item, DrawItem::Shape { .. }));
//! ```

pub mod draw;

use image::{DynamicImage, Rgba, RgbaImage};

use crate::codec;
use crate::error::ImgvisError;
use crate::font::TextRasterizer;
use crate::ir::{Image, Point, Rect};
use crate::mask::PackedMask;
use crate::text::TextPlacement;

/// Where a text item goes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextAnchor {
    /// Anchored to a reference rectangle with a placement code.
    Placed {
        reference: Rect,
        placement: TextPlacement,
    },
    /// Top-left corner of the text at a fixed position.
    At { x: i32, y: i32 },
}

impl TextAnchor {
    fn origin(&self, width: u32, height: u32) -> (i32, i32) {
        match self {
            TextAnchor::Placed {
                reference,
                placement,
            } => placement.anchor(reference, saturating_i32(width), saturating_i32(height)),
            TextAnchor::At { x, y } => (*x, *y),
        }
    }
}

fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Whether a box starting at (x, y) and reaching `reach` pixels right and
/// down can touch a `width` x `height` layer.
fn overlaps(x: i32, y: i32, reach: i64, width: u32, height: u32) -> bool {
    let (x, y) = (i64::from(x), i64::from(y));
    x + reach >= 0 && y + reach >= 0 && x < i64::from(width) && y < i64::from(height)
}

/// One thing to draw on the overlay layer.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawItem {
    /// A closed polygon with optional outline and fill.
    Shape {
        points: Vec<Point>,
        outline: Option<Rgba<u8>>,
        fill: Option<Rgba<u8>>,
    },
    /// A line of text, optionally on a background box.
    ///
    /// The box spans `(x - margin, y - margin)` to
    /// `(x + w + 2 * margin, y + h + 2 * margin)` (inclusive), where
    /// `(x, y)` is the text origin and `w` x `h` the measured text size.
    Text {
        text: String,
        anchor: TextAnchor,
        color: Rgba<u8>,
        background: Option<Rgba<u8>>,
        margin: i32,
    },
    /// A 1-bit mask painted in a single color.
    Mask { mask: PackedMask, color: Rgba<u8> },
}

impl DrawItem {
    pub fn shape(points: Vec<Point>, outline: Option<Rgba<u8>>, fill: Option<Rgba<u8>>) -> Self {
        DrawItem::Shape {
            points,
            outline,
            fill,
        }
    }

    pub fn mask(mask: PackedMask, color: Rgba<u8>) -> Self {
        DrawItem::Mask { mask, color }
    }
}

/// Paints draw items and merges them into images.
pub struct OverlayRenderer<'a> {
    thickness: u32,
    font: Option<&'a dyn TextRasterizer>,
}

impl<'a> OverlayRenderer<'a> {
    /// Creates a renderer drawing outlines `thickness` pixels wide. Text
    /// items are skipped when no font is given.
    pub fn new(thickness: u32, font: Option<&'a dyn TextRasterizer>) -> Self {
        Self { thickness, font }
    }

    /// Paints `items` in order onto a transparent `width` x `height` layer.
    pub fn draw_layer(&self, width: u32, height: u32, items: &[DrawItem]) -> RgbaImage {
        let mut layer = RgbaImage::new(width, height);
        for item in items {
            self.draw_item(&mut layer, item);
        }
        layer
    }

    fn draw_item(&self, layer: &mut RgbaImage, item: &DrawItem) {
        match item {
            DrawItem::Shape {
                points,
                outline,
                fill,
            } => {
                if let Some(fill) = fill {
                    draw::fill_polygon(layer, points, *fill);
                }
                if let Some(outline) = outline {
                    draw::draw_outline(layer, points, *outline, self.thickness);
                }
            }
            DrawItem::Text {
                text,
                anchor,
                color,
                background,
                margin,
            } => {
                let Some(font) = self.font else {
                    log::debug!("No font available, skipping text '{}'", text);
                    return;
                };
                let (w, h) = font.text_size(text);
                let (x, y) = anchor.origin(w, h);
                if let Some(background) = background {
                    let (w, h) = (saturating_i32(w), saturating_i32(h));
                    let margin2 = margin.saturating_mul(2);
                    draw::fill_rect(
                        layer,
                        x.saturating_sub(*margin),
                        y.saturating_sub(*margin),
                        x.saturating_add(w).saturating_add(margin2),
                        y.saturating_add(h).saturating_add(margin2),
                        *background,
                    );
                }
                if overlaps(x, y, i64::from(w.max(h)), layer.width(), layer.height()) {
                    font.draw_text(layer, *color, x, y, text);
                } else {
                    log::debug!("Text '{}' at ({}, {}) is off the layer", text, x, y);
                }
            }
            DrawItem::Mask { mask, color } => draw::paint_mask(layer, mask, *color),
        }
    }

    /// Renders `items` over `base` and returns a new image in the same
    /// format. `base` itself is left untouched.
    ///
    /// # Errors
    /// Returns an error if the base image cannot be decoded or the result
    /// cannot be encoded.
    pub fn render(&self, base: &Image, items: &[DrawItem]) -> Result<Image, ImgvisError> {
        let pixels = codec::decode(base)?;
        let layer = self.draw_layer(pixels.width(), pixels.height(), items);
        let merged = merge_layer(&pixels, &layer);
        let data = codec::encode(&merged, base.format)?;
        Ok(Image::new(
            base.file_name.clone(),
            data,
            base.format,
            merged.width(),
            merged.height(),
        ))
    }
}

/// Alpha-composites `layer` onto a copy of `base`, keeping the base's color
/// type.
pub fn merge_layer(base: &DynamicImage, layer: &RgbaImage) -> DynamicImage {
    let mut merged = base.to_rgba8();
    draw::composite(&mut merged, layer);
    codec::restore_color_type(merged, base.color())
}
