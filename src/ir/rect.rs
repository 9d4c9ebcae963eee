//! Axis-aligned rectangles in inclusive pixel coordinates.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle given by its left, top, right and bottom
/// pixel coordinates. Both corners are inclusive, so a rectangle with
/// `left == right` is one pixel wide.
///
/// Note: the constructor does NOT enforce `left <= right`; malformed
/// rectangles can be represented and are rendered as whatever the
/// corner points describe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Creates a rectangle from its inclusive corner coordinates.
    #[inline]
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Returns the smallest rectangle covering the given continuous bounds.
    ///
    /// The bounds are treated as a pixel extent: `max_x`/`max_y` lie on the
    /// far edge of the last covered pixel, so they are rounded up and then
    /// made inclusive.
    pub fn from_extent(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(
            min_x.floor() as i32,
            min_y.floor() as i32,
            (max_x.ceil() - 1.0) as i32,
            (max_y.ceil() - 1.0) as i32,
        )
    }
}
