//! Stream element model for the imgvis stages.
//!
//! Every stage consumes and produces one of the instance types defined here:
//! an [`Image`] paired with the annotations for one domain (object
//! detection, segmentation or classification).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::meta::MetaValue;
use super::point::{Point, Polygon};
use super::rect::Rect;
use crate::error::ImgvisError;
use crate::mask::PackedMask;

/// Label used for objects that carry no label metadata.
pub const DEFAULT_LABEL: &str = "object";

/// Encoded image formats understood by the codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    Gif,
    Tiff,
    WebP,
}

impl ImageFormat {
    /// Determines the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "bmp" => Some(ImageFormat::Bmp),
            "gif" => Some(ImageFormat::Gif),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }
}

/// An encoded image travelling through the stream.
///
/// Stages never modify `data` in place; rendering produces a new `Image`
/// wrapping freshly encoded bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    /// Filename of the image (relative to the stream's image directory).
    pub file_name: String,

    /// Encoded image bytes.
    pub data: Vec<u8>,

    /// Format of `data`.
    pub format: ImageFormat,

    /// Width of the image in pixels.
    pub width: u32,

    /// Height of the image in pixels.
    pub height: u32,
}

impl Image {
    /// Creates a new image from already encoded bytes.
    pub fn new(
        file_name: impl Into<String>,
        data: Vec<u8>,
        format: ImageFormat,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            data,
            format,
            width,
            height,
        }
    }

    /// Returns the image dimensions as `(width, height)`.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A labelled region: a rectangle, optionally refined by a polygon, plus
/// free-form metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocatedObject {
    /// Bounding rectangle in inclusive pixel coordinates.
    pub rect: Rect,

    /// Optional outline of the object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Polygon>,

    /// Metadata such as the label, scores or the combiner's stream index.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, MetaValue>,
}

impl LocatedObject {
    /// Creates a rectangle-only object without metadata.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            polygon: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Attaches a polygon to the object.
    pub fn with_polygon(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.polygon = Some(points.into_iter().collect());
        self
    }

    /// Adds a metadata entry to the object.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns true if the object carries a non-empty polygon.
    pub fn has_polygon(&self) -> bool {
        self.polygon.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Returns the label stored under `label_key`, or [`DEFAULT_LABEL`].
    pub fn label(&self, label_key: &str) -> String {
        self.metadata
            .get(label_key)
            .map(|v| v.to_string())
            .unwrap_or_else(|| DEFAULT_LABEL.to_string())
    }
}

/// A per-pixel matrix of 1-based label indices (0 is background), stored
/// row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexMatrix {
    width: u32,
    height: u32,
    indices: Vec<u16>,
}

impl IndexMatrix {
    /// Creates a matrix from row-major indices.
    ///
    /// # Errors
    /// Returns an error if `indices` does not hold exactly `width * height` cells.
    pub fn new(width: u32, height: u32, indices: Vec<u16>) -> Result<Self, ImgvisError> {
        let expected = width as usize * height as usize;
        if indices.len() != expected {
            return Err(ImgvisError::InvalidSegmentation(format!(
                "index matrix has {} cells, expected {}x{} = {}",
                indices.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            indices,
        })
    }

    /// Creates a matrix from a list of rows.
    ///
    /// # Errors
    /// Returns an error if the rows have differing lengths.
    pub fn from_rows(rows: &[Vec<u16>]) -> Result<Self, ImgvisError> {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
        if let Some((y, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() as u32 != width)
        {
            return Err(ImgvisError::InvalidSegmentation(format!(
                "row {} has {} cells, expected {}",
                y,
                row.len(),
                width
            )));
        }
        Self::new(width, height, rows.concat())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the index at pixel (x, y).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u16 {
        self.indices[y as usize * self.width as usize + x as usize]
    }

    /// Returns one row of indices.
    #[inline]
    pub fn row(&self, y: u32) -> &[u16] {
        let start = y as usize * self.width as usize;
        &self.indices[start..start + self.width as usize]
    }
}

/// The two upstream representations of segmentation layers.
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentationLayers {
    /// One index matrix covering all labels.
    Indexed(IndexMatrix),
    /// Already expanded 1-bit masks, keyed by label.
    Masks(BTreeMap<String, PackedMask>),
}

/// Segmentation annotation for one image.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationAnnotation {
    /// Labels in priority order; label `i` owns index `i + 1`.
    pub labels: Vec<String>,
    pub layers: SegmentationLayers,
}

/// Object detection stream element.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectDetectionInstance {
    pub image: Image,
    /// Objects in z-order (later entries draw on top).
    pub annotations: Vec<LocatedObject>,
}

/// Image segmentation stream element.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationInstance {
    pub image: Image,
    pub annotations: SegmentationAnnotation,
}

/// Image classification stream element.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationInstance {
    pub image: Image,
    pub label: String,
}
