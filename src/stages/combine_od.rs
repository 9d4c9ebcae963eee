//! Combination of object detections across the frames of a stream.
//!
//! The first element seeds the running set and passes through unchanged.
//! Each later element is matched against the running set by polygon IoU;
//! matched pairs are merged by union or intersection, leftovers from both
//! sides are kept, and the result becomes the new running set.

use log::{debug, warn};
use serde::Deserialize;

use super::Processor;
use crate::error::ImgvisError;
use crate::ir::{LocatedObject, MetaValue, ObjectDetectionInstance, Point, Rect};
use crate::matching::{combine_polygons, CombineMode, PolygonMatcher, DEFAULT_MIN_IOU};
use crate::shape::region_for;

/// Metadata key recording the frame an object was last updated in.
pub const STREAM_INDEX: &str = "stream_index";

/// Options of the combination stage.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CombineOdOptions {
    /// Minimum IoU for two objects to be considered the same.
    pub min_iou: f64,
    /// `intersect` or `union`.
    pub combination: String,
}

impl Default for CombineOdOptions {
    fn default() -> Self {
        Self {
            min_iou: DEFAULT_MIN_IOU,
            combination: CombineMode::default().to_string(),
        }
    }
}

/// Rounds values within floating-point noise of an integer.
fn snap(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < 1e-6 {
        rounded
    } else {
        value
    }
}

/// Builds the object for a combined region.
///
/// The region is an extent, so its right and bottom edges lie one past the
/// last covered pixel. Vertices beyond the rectangle are pulled back onto
/// it, which leaves the attached polygon in pixel-vertex form with the same
/// bounds as the rectangle.
fn object_from_polygon(points: Vec<Point>, stream_index: i64) -> LocatedObject {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in &points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let rect = Rect::from_extent(snap(min_x), snap(min_y), snap(max_x), snap(max_y));
    let (right, bottom) = (rect.right as f64, rect.bottom as f64);
    let outline: Vec<Point> = points
        .iter()
        .map(|p| Point::new(snap(p.x).min(right), snap(p.y).min(bottom)))
        .collect();
    LocatedObject::new(rect)
        .with_polygon(outline)
        .with_meta(STREAM_INDEX, stream_index)
}

pub struct CombineOd {
    matcher: PolygonMatcher,
    combination: String,
    running: Option<Vec<LocatedObject>>,
    stream_index: i64,
}

impl CombineOd {
    pub fn new(options: CombineOdOptions) -> Self {
        Self {
            matcher: PolygonMatcher::new(options.min_iou),
            combination: options.combination,
            running: None,
            stream_index: 0,
        }
    }

    /// The running combined set; `None` before the first element.
    pub fn running(&self) -> Option<&[LocatedObject]> {
        self.running.as_deref()
    }

    /// Index of the last element processed (0 for the first).
    pub fn stream_index(&self) -> i64 {
        self.stream_index
    }

    /// Folds `new` into the running set `old` and returns the new set.
    ///
    /// # Errors
    /// Returns an error if the combination mode is not supported.
    fn combine(
        &self,
        old: &[LocatedObject],
        new: &[LocatedObject],
    ) -> Result<Vec<LocatedObject>, ImgvisError> {
        let mode: CombineMode = self.combination.parse()?;
        let old_regions: Vec<Vec<Point>> = old.iter().map(region_for).collect();
        let new_regions: Vec<Vec<Point>> = new.iter().map(region_for).collect();

        let mut combined = Vec::with_capacity(old.len() + new.len());
        for record in self.matcher.match_sets(&old_regions, &new_regions) {
            match (record.old, record.new) {
                (Some(o), Some(n)) => {
                    debug!("Combining old {} with new {} (IoU {:.3})", o, n, record.iou);
                    match combine_polygons(&new_regions[n], &old_regions[o], mode) {
                        Ok(Some(points)) => {
                            let mut object = object_from_polygon(points, self.stream_index);
                            for (key, value) in &new[n].metadata {
                                object.metadata.entry(key.clone()).or_insert_with(|| value.clone());
                            }
                            combined.push(object);
                        }
                        Ok(None) => warn!("Combination of old {} and new {} is empty, skipping", o, n),
                        Err(err) => warn!("Failed to combine old {} and new {}, skipping: {}", o, n, err),
                    }
                }
                (Some(o), None) => {
                    let mut object = old[o].clone();
                    object
                        .metadata
                        .insert(STREAM_INDEX.to_string(), MetaValue::Int(self.stream_index));
                    combined.push(object);
                }
                (None, Some(n)) => combined.push(new[n].clone()),
                (None, None) => {}
            }
        }
        Ok(combined)
    }
}

impl Processor<ObjectDetectionInstance> for CombineOd {
    fn process(
        &mut self,
        element: ObjectDetectionInstance,
    ) -> Result<ObjectDetectionInstance, ImgvisError> {
        let Some(old) = self.running.take() else {
            self.running = Some(element.annotations.clone());
            return Ok(element);
        };

        self.stream_index += 1;
        let combined = match self.combine(&old, &element.annotations) {
            Ok(combined) => combined,
            Err(err) => {
                self.running = Some(old);
                return Err(err);
            }
        };
        self.running = Some(combined.clone());
        Ok(ObjectDetectionInstance {
            image: element.image,
            annotations: combined,
        })
    }
}
