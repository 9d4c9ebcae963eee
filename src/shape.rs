//! Turning located objects into point lists.

use crate::ir::{LocatedObject, Point, Rect};

/// Returns the four corners of `rect`: top-left, top-right, bottom-right,
/// bottom-left.
pub fn rect_corners(rect: &Rect) -> Vec<Point> {
    corners(
        rect.left as f64,
        rect.top as f64,
        rect.right as f64,
        rect.bottom as f64,
    )
}

fn corners(l: f64, t: f64, r: f64, b: f64) -> Vec<Point> {
    vec![
        Point::new(l, t),
        Point::new(r, t),
        Point::new(r, b),
        Point::new(l, b),
    ]
}

/// Returns the points to draw for `object`.
///
/// The polygon is used verbatim (not closed) when present, unless
/// `force_bbox` is set; otherwise the rectangle corners are returned in
/// clockwise order so the quadrilateral never self-intersects.
pub fn points_for(object: &LocatedObject, force_bbox: bool) -> Vec<Point> {
    match &object.polygon {
        Some(polygon) if !polygon.is_empty() && !force_bbox => polygon.points.clone(),
        _ => rect_corners(&object.rect),
    }
}

/// Returns the area covered by `object` as a polygon, for overlap and
/// set computations.
///
/// A rectangle covers whole pixels, so its region extends to the far edge
/// of its last row and column: `(left, top)` to `(right + 1, bottom + 1)`.
pub fn region_for(object: &LocatedObject) -> Vec<Point> {
    match &object.polygon {
        Some(polygon) if !polygon.is_empty() => polygon.points.clone(),
        _ => {
            let rect = object.rect;
            corners(
                rect.left as f64,
                rect.top as f64,
                rect.right as f64 + 1.0,
                rect.bottom as f64 + 1.0,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> LocatedObject {
        LocatedObject::new(Rect::new(0, 0, 10, 10)).with_polygon([
            Point::new(5.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ])
    }

    #[test]
    fn test_polygon_points_preserved() {
        let points = points_for(&triangle(), false);
        assert_eq!(
            points,
            vec![Point::new(5.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)]
        );
    }

    #[test]
    fn test_force_bbox_uses_clockwise_corners() {
        let points = points_for(&triangle(), true);
        assert_eq!(
            points,
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ]
        );
    }

    #[test]
    fn test_rectangle_only_object() {
        let object = LocatedObject::new(Rect::new(2, 3, 7, 9));
        assert_eq!(points_for(&object, false), rect_corners(&object.rect));
    }

    #[test]
    fn test_region_covers_whole_pixels() {
        let object = LocatedObject::new(Rect::new(0, 0, 9, 9));
        assert_eq!(
            region_for(&object),
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ]
        );
        assert_eq!(region_for(&triangle()), points_for(&triangle(), false));
    }

    #[test]
    fn test_region_of_extreme_rect() {
        let object = LocatedObject::new(Rect::new(i32::MIN, 0, i32::MAX, i32::MAX));
        let region = region_for(&object);
        assert_eq!(region[0], Point::new(i32::MIN as f64, 0.0));
        assert_eq!(region[2], Point::new(i32::MAX as f64 + 1.0, i32::MAX as f64 + 1.0));
    }
}
