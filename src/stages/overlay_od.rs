//! Object-detection overlay: outlines, fills and labels for located objects.

use std::collections::BTreeSet;

use serde::Deserialize;

use super::{stage_font, Processor};
use crate::colors::{self, parse_color_table, text_color_for, ColorRegistry, TEXT_COLOR_THRESHOLD};
use crate::error::ImgvisError;
use crate::font::{FontResolver, TextRasterizer, DEFAULT_FONT_FAMILY};
use crate::ir::ObjectDetectionInstance;
use crate::render::{DrawItem, OverlayRenderer, TextAnchor};
use crate::shape::points_for;
use crate::text::{TextFormatter, TextPlacement, LABEL_PLACEHOLDER};

/// Options of the object-detection overlay.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlayOdOptions {
    /// Labels to draw; empty draws all.
    pub labels: Vec<String>,
    /// Metadata key holding the label.
    pub label_key: String,
    /// Label text template; empty disables text.
    pub text_format: String,
    /// `V,H` placement of the text relative to the object's rectangle.
    pub text_placement: String,
    pub font_family: String,
    pub font_size: f32,
    /// Decimals for float metadata in the text.
    pub num_decimals: usize,
    /// Custom colors as blank-separated `R,G,B` triplets, by label ordinal.
    pub colors: String,
    /// Outline width in pixels; below 1 disables the outline.
    pub outline_thickness: i32,
    /// Alpha of the outline. The label text background shares it, so it is
    /// only opaque at the default of 255.
    pub outline_alpha: u8,
    pub fill: bool,
    pub fill_alpha: u8,
    /// Give every object its own color instead of one per label.
    pub vary_colors: bool,
    /// Draw the bounding box even when a polygon is present.
    pub force_bbox: bool,
}

impl Default for OverlayOdOptions {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            label_key: "type".to_string(),
            text_format: LABEL_PLACEHOLDER.to_string(),
            text_placement: "T,L".to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: 14.0,
            num_decimals: 3,
            colors: String::new(),
            outline_thickness: 3,
            outline_alpha: 255,
            fill: false,
            fill_alpha: 128,
            vary_colors: false,
            force_bbox: false,
        }
    }
}

/// Draws the located objects of each element onto its image.
pub struct OverlayOd {
    options: OverlayOdOptions,
    accepted: Option<BTreeSet<String>>,
    formatter: TextFormatter,
    placement: TextPlacement,
    registry: ColorRegistry,
    font: Option<Box<dyn TextRasterizer>>,
}

impl OverlayOd {
    /// Creates the stage.
    ///
    /// # Errors
    /// Returns an error for an invalid text placement or color table.
    pub fn new(options: OverlayOdOptions, fonts: &dyn FontResolver) -> Result<Self, ImgvisError> {
        let placement: TextPlacement = options.text_placement.parse()?;
        let registry = ColorRegistry::new(parse_color_table(&options.colors)?);
        let formatter = TextFormatter::new(options.text_format.clone(), options.num_decimals);
        let font = if formatter.is_enabled() {
            stage_font(fonts, &options.font_family, options.font_size)
        } else {
            None
        };
        let accepted = (!options.labels.is_empty())
            .then(|| options.labels.iter().cloned().collect::<BTreeSet<_>>());
        Ok(Self {
            options,
            accepted,
            formatter,
            placement,
            registry,
            font,
        })
    }

    /// The colors assigned so far.
    pub fn registry(&self) -> &ColorRegistry {
        &self.registry
    }

    /// Builds the draw items for one element.
    pub fn draw_items(&mut self, element: &ObjectDetectionInstance) -> Vec<DrawItem> {
        let mut items = Vec::new();
        for (i, object) in element.annotations.iter().enumerate() {
            let label = object.label(&self.options.label_key);
            if let Some(accepted) = &self.accepted {
                if !accepted.contains(&label) {
                    continue;
                }
            }
            self.registry.register_label(&label);
            let color_key = if self.options.vary_colors {
                format!("object-{i}")
            } else {
                label.clone()
            };
            let color = self.registry.color_for(&color_key);
            let outline = colors::with_alpha(color, self.options.outline_alpha);

            items.push(DrawItem::shape(
                points_for(object, self.options.force_bbox),
                (self.options.outline_thickness >= 1).then_some(outline),
                self.options
                    .fill
                    .then(|| colors::with_alpha(color, self.options.fill_alpha)),
            ));

            if self.formatter.is_enabled() {
                let text_color = text_color_for(color, TEXT_COLOR_THRESHOLD);
                items.push(DrawItem::Text {
                    text: self.formatter.expand(&label, &object.metadata),
                    anchor: TextAnchor::Placed {
                        reference: object.rect,
                        placement: self.placement,
                    },
                    color: colors::with_alpha(text_color, 255),
                    background: Some(outline),
                    margin: 0,
                });
            }
        }
        items
    }
}

impl Processor<ObjectDetectionInstance> for OverlayOd {
    fn process(
        &mut self,
        element: ObjectDetectionInstance,
    ) -> Result<ObjectDetectionInstance, ImgvisError> {
        let items = self.draw_items(&element);
        let thickness = self.options.outline_thickness.max(0) as u32;
        let renderer = OverlayRenderer::new(thickness, self.font.as_deref());
        let image = renderer.render(&element.image, &items)?;
        Ok(ObjectDetectionInstance {
            image,
            annotations: element.annotations,
        })
    }
}
