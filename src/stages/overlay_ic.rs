//! Classification overlay: writes the image's label at a fixed position.

use serde::Deserialize;

use super::{stage_font, Processor};
use crate::colors::{self, parse_rgb};
use crate::error::ImgvisError;
use crate::font::{FontResolver, TextRasterizer, DEFAULT_FONT_FAMILY};
use crate::ir::ClassificationInstance;
use crate::render::{DrawItem, OverlayRenderer, TextAnchor};

/// Options of the classification overlay.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlayIcOptions {
    /// Top-left corner of the text as `X,Y`.
    pub position: String,
    pub font_family: String,
    pub font_size: f32,
    /// Text color as `R,G,B`.
    pub font_color: String,
    pub fill_background: bool,
    /// Background color as `R,G,B`.
    pub background_color: String,
    /// Margin of the background box around the text.
    pub background_margin: i32,
}

impl Default for OverlayIcOptions {
    fn default() -> Self {
        Self {
            position: "5,5".to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: 14.0,
            font_color: "255,255,255".to_string(),
            fill_background: false,
            background_color: "0,0,0".to_string(),
            background_margin: 2,
        }
    }
}

/// Parses an `X,Y` position.
pub fn parse_position(spec: &str) -> Result<(i32, i32), ImgvisError> {
    let invalid = || ImgvisError::InvalidPosition(spec.to_string());
    let (x, y) = spec.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok((x, y))
}

pub struct OverlayIc {
    position: (i32, i32),
    font_color: image::Rgba<u8>,
    background: Option<image::Rgba<u8>>,
    margin: i32,
    font: Option<Box<dyn TextRasterizer>>,
}

impl OverlayIc {
    /// Creates the stage.
    ///
    /// # Errors
    /// Returns an error for an invalid position or color.
    pub fn new(options: OverlayIcOptions, fonts: &dyn FontResolver) -> Result<Self, ImgvisError> {
        let position = parse_position(&options.position)?;
        let font_color = colors::with_alpha(parse_rgb(&options.font_color)?, 255);
        let background = if options.fill_background {
            Some(colors::with_alpha(parse_rgb(&options.background_color)?, 255))
        } else {
            None
        };
        Ok(Self {
            position,
            font_color,
            background,
            margin: options.background_margin,
            font: stage_font(fonts, &options.font_family, options.font_size),
        })
    }

    fn draw_item(&self, label: &str) -> DrawItem {
        let (x, y) = self.position;
        DrawItem::Text {
            text: label.to_string(),
            anchor: TextAnchor::At { x, y },
            color: self.font_color,
            background: self.background,
            margin: self.margin,
        }
    }
}

impl Processor<ClassificationInstance> for OverlayIc {
    fn process(&mut self, element: ClassificationInstance) -> Result<ClassificationInstance, ImgvisError> {
        let item = self.draw_item(&element.label);
        let renderer = OverlayRenderer::new(1, self.font.as_deref());
        let image = renderer.render(&element.image, &[item])?;
        Ok(ClassificationInstance {
            image,
            label: element.label,
        })
    }
}
