//! Overlay sink: draws the outlines of all objects of a stream onto one
//! canvas and writes it as a PNG at the end.

use std::path::PathBuf;

use image::{DynamicImage, Rgba, RgbaImage};
use log::{error, info, warn};
use serde::Deserialize;

use super::Sink;
use crate::codec;
use crate::colors::parse_rgba;
use crate::error::ImgvisError;
use crate::ir::{ImageFormat, LocatedObject, ObjectDetectionInstance, Point};
use crate::render::draw;
use crate::shape::points_for;

/// Options of the overlay sink.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlaySinkOptions {
    /// Shape color as `R,G,B,A`.
    pub color: String,
    /// Canvas color as `R,G,B,A`.
    pub background_color: String,
    /// Canvas size as `W,H`; every image's shapes are scaled to it. Empty
    /// keeps the image coordinates.
    pub scale_to: String,
    /// PNG file to write.
    pub output: PathBuf,
}

impl Default for OverlaySinkOptions {
    fn default() -> Self {
        Self {
            color: "255,0,0,64".to_string(),
            background_color: "255,255,255,255".to_string(),
            scale_to: String::new(),
            output: PathBuf::from("./overlay.png"),
        }
    }
}

/// Parses a `W,H` canvas size. Returns `None` (and logs) when malformed.
fn parse_scale_to(spec: &str) -> Option<(u32, u32)> {
    if spec.trim().is_empty() {
        return None;
    }
    let parts: Vec<Option<u32>> = spec.split(',').map(|p| p.trim().parse().ok()).collect();
    match parts.as_slice() {
        [Some(w), Some(h)] if *w > 0 && *h > 0 => Some((*w, *h)),
        _ => {
            error!("'scale_to' requires the format 'width,height' but received: {}", spec);
            None
        }
    }
}

pub struct OverlaySink {
    color: Rgba<u8>,
    background: Rgba<u8>,
    scale_to: Option<(u32, u32)>,
    output: PathBuf,
    canvas: Option<RgbaImage>,
}

impl OverlaySink {
    /// Creates the sink.
    ///
    /// # Errors
    /// Returns an error for invalid colors. A malformed `scale_to` only
    /// disables scaling.
    pub fn new(options: OverlaySinkOptions) -> Result<Self, ImgvisError> {
        Ok(Self {
            color: parse_rgba(&options.color)?,
            background: parse_rgba(&options.background_color)?,
            scale_to: parse_scale_to(&options.scale_to),
            output: options.output,
            canvas: None,
        })
    }

    /// The canvas drawn so far, if any element was consumed.
    pub fn canvas(&self) -> Option<&RgbaImage> {
        self.canvas.as_ref()
    }

    /// Makes sure the canvas exists and, without scaling, is at least
    /// `width` x `height`.
    fn prepare_canvas(&mut self, width: u32, height: u32) -> &mut RgbaImage {
        let background = self.background;
        let canvas = match (self.canvas.take(), self.scale_to) {
            (None, Some((w, h))) => RgbaImage::from_pixel(w, h, background),
            (None, None) => RgbaImage::from_pixel(width, height, background),
            (Some(canvas), None) if width > canvas.width() || height > canvas.height() => {
                let mut grown = RgbaImage::from_pixel(
                    width.max(canvas.width()),
                    height.max(canvas.height()),
                    background,
                );
                image::imageops::replace(&mut grown, &canvas, 0, 0);
                grown
            }
            (Some(canvas), _) => canvas,
        };
        self.canvas.insert(canvas)
    }

    fn scaled_outline(object: &LocatedObject, scale_x: f64, scale_y: f64) -> Vec<Point> {
        points_for(object, false)
            .iter()
            .map(|p| {
                let scaled = p.scaled(scale_x, scale_y);
                Point::new(scaled.x.trunc(), scaled.y.trunc())
            })
            .collect()
    }
}

impl Sink<ObjectDetectionInstance> for OverlaySink {
    fn consume(&mut self, element: &ObjectDetectionInstance) -> Result<(), ImgvisError> {
        let (width, height) = element.image.size();
        let color = self.color;
        let scale_to = self.scale_to;
        let canvas = self.prepare_canvas(width, height);
        let (scale_x, scale_y) = match scale_to {
            Some(_) if width > 0 && height > 0 => (
                canvas.width() as f64 / width as f64,
                canvas.height() as f64 / height as f64,
            ),
            _ => (1.0, 1.0),
        };
        for object in &element.annotations {
            let points = Self::scaled_outline(object, scale_x, scale_y);
            draw::draw_outline(canvas, &points, color, 1);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ImgvisError> {
        let Some(canvas) = self.canvas.take() else {
            warn!("No overlay generated");
            return Ok(());
        };
        let data = codec::encode(&DynamicImage::ImageRgba8(canvas), ImageFormat::Png)?;
        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.output, data)?;
        info!("Wrote overlay to {}", self.output.display());
        Ok(())
    }
}
