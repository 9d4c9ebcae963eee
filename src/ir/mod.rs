//! Data model for annotation stream elements.
//!
//! Images travel through the stages as encoded bytes plus a format tag, and
//! annotations use one coordinate convention throughout: integer, inclusive
//! pixel rectangles and floating-point polygon vertices, both with the
//! origin at the top-left corner.
//!
//! # Example
//!
//! ```
//! use imgvis::ir::{LocatedObject, Point, Rect};
//!
//! let cat = LocatedObject::new(Rect::new(0, 0, 10, 10))
//!     .with_meta("type", "cat")
//!     .with_meta("conf", 0.98);
//! let outline = LocatedObject::new(Rect::new(2, 2, 6, 6))
//!     .with_polygon([Point::new(2.0, 2.0), Point::new(6.0, 2.0), Point::new(4.0, 6.0)]);
//!
//! assert_eq!(cat.label("type"), "cat");
//! assert!(outline.has_polygon());
//! ```

pub mod io_json;
mod meta;
mod model;
mod point;
mod rect;

pub use meta::MetaValue;
pub use model::{
    ClassificationInstance, Image, ImageFormat, IndexMatrix, LocatedObject,
    ObjectDetectionInstance, SegmentationAnnotation, SegmentationInstance, SegmentationLayers,
    DEFAULT_LABEL,
};
pub use point::{Point, Polygon};
pub use rect::Rect;
