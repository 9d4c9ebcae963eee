//! Segmentation overlay: paints each label's mask in its color.

use std::collections::BTreeSet;

use serde::Deserialize;

use super::Processor;
use crate::colors::{self, parse_color_table, ColorRegistry};
use crate::error::ImgvisError;
use crate::ir::SegmentationInstance;
use crate::mask::decompress_layers;
use crate::render::{DrawItem, OverlayRenderer};

/// Options of the segmentation overlay.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlayIsOptions {
    /// Labels to draw; empty draws all.
    pub labels: Vec<String>,
    /// Alpha of the painted masks.
    pub alpha: u8,
    /// Custom colors as blank-separated `R,G,B` triplets, by position in the
    /// element's label list.
    pub colors: String,
}

impl Default for OverlayIsOptions {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            alpha: 64,
            colors: String::new(),
        }
    }
}

pub struct OverlayIs {
    options: OverlayIsOptions,
    accepted: Option<BTreeSet<String>>,
    registry: ColorRegistry,
}

impl OverlayIs {
    /// Creates the stage.
    ///
    /// # Errors
    /// Returns an error for an invalid color table.
    pub fn new(options: OverlayIsOptions) -> Result<Self, ImgvisError> {
        let registry = ColorRegistry::new(parse_color_table(&options.colors)?);
        let accepted = (!options.labels.is_empty())
            .then(|| options.labels.iter().cloned().collect::<BTreeSet<_>>());
        Ok(Self {
            options,
            accepted,
            registry,
        })
    }

    pub fn registry(&self) -> &ColorRegistry {
        &self.registry
    }

    /// Builds one mask item per drawn label, in label order.
    pub fn draw_items(&mut self, element: &SegmentationInstance) -> Vec<DrawItem> {
        self.registry.set_label_order(&element.annotations.labels);
        decompress_layers(&element.annotations)
            .into_iter()
            .filter(|(label, _)| {
                self.accepted
                    .as_ref()
                    .map_or(true, |accepted| accepted.contains(label))
            })
            .map(|(label, mask)| {
                let color = self.registry.color_for(&label);
                DrawItem::mask(mask, colors::with_alpha(color, self.options.alpha))
            })
            .collect()
    }
}

impl Processor<SegmentationInstance> for OverlayIs {
    fn process(&mut self, element: SegmentationInstance) -> Result<SegmentationInstance, ImgvisError> {
        let items = self.draw_items(&element);
        if items.is_empty() {
            return Ok(element);
        }
        let image = OverlayRenderer::new(1, None).render(&element.image, &items)?;
        Ok(SegmentationInstance {
            image,
            annotations: element.annotations,
        })
    }
}
