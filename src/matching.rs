//! Polygon overlap, matching and set operations.
//!
//! Geometry failures (too few vertices, non-finite coordinates, or a panic
//! inside the boolean-operation engine on invalid input) are reported as
//! [`GeometryError`] and never abort a whole frame: the matcher treats a
//! failed pair as not overlapping.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use log::warn;
use thiserror::Error;

use crate::error::ImgvisError;
use crate::ir::Point;

/// Default minimum IoU for two polygons to be considered the same object.
pub const DEFAULT_MIN_IOU: f64 = 0.7;

/// Why a geometric computation could not be carried out.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("polygon needs at least 3 finite vertices, got {0}")]
    TooFewVertices(usize),

    #[error("polygon operation failed: {0}")]
    OperationFailed(String),
}

fn to_polygon(points: &[Point]) -> Result<Polygon<f64>, GeometryError> {
    let coords: Vec<Coord<f64>> = points
        .iter()
        .filter(|p| p.is_finite())
        .map(|p| Coord { x: p.x, y: p.y })
        .collect();
    if coords.len() < 3 || coords.len() != points.len() {
        return Err(GeometryError::TooFewVertices(coords.len()));
    }
    Ok(Polygon::new(LineString::new(coords), vec![]))
}

/// Runs a boolean operation, turning a panic in the geometry engine into an
/// error.
fn guarded<F>(operation: F) -> Result<MultiPolygon<f64>, GeometryError>
where
    F: FnOnce() -> MultiPolygon<f64>,
{
    panic::catch_unwind(AssertUnwindSafe(operation)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        GeometryError::OperationFailed(message)
    })
}

/// Intersection over union of two closed polygons.
///
/// Returns 0 when the polygons do not overlap.
///
/// # Errors
/// Returns an error if either polygon is degenerate or the geometry engine
/// fails on it.
pub fn iou(a: &[Point], b: &[Point]) -> Result<f64, GeometryError> {
    let a = to_polygon(a)?;
    let b = to_polygon(b)?;
    let intersection = guarded(|| a.intersection(&b))?.unsigned_area();
    if intersection <= 0.0 {
        return Ok(0.0);
    }
    let union = guarded(|| a.union(&b))?.unsigned_area();
    if union <= 0.0 {
        return Ok(0.0);
    }
    Ok((intersection / union).min(1.0))
}

/// How matched polygons are merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CombineMode {
    Union,
    #[default]
    Intersect,
}

impl FromStr for CombineMode {
    type Err = ImgvisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(CombineMode::Union),
            "intersect" => Ok(CombineMode::Intersect),
            other => Err(ImgvisError::UnsupportedCombination(other.to_string())),
        }
    }
}

impl fmt::Display for CombineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombineMode::Union => write!(f, "union"),
            CombineMode::Intersect => write!(f, "intersect"),
        }
    }
}

/// Merges two polygons with `mode`.
///
/// Returns `Ok(None)` when the result is empty. When the result falls apart
/// into several polygons only the first one is kept. The returned outline
/// is not closed.
///
/// # Errors
/// Returns an error if either polygon is degenerate or the geometry engine
/// fails on it.
pub fn combine_polygons(
    a: &[Point],
    b: &[Point],
    mode: CombineMode,
) -> Result<Option<Vec<Point>>, GeometryError> {
    let a = to_polygon(a)?;
    let b = to_polygon(b)?;
    let combined = match mode {
        CombineMode::Union => guarded(|| a.union(&b))?,
        CombineMode::Intersect => guarded(|| a.intersection(&b))?,
    };
    if combined.0.len() > 1 {
        warn!(
            "Combined geometry has {} parts, keeping only the first",
            combined.0.len()
        );
    }
    let Some(first) = combined.0.into_iter().next() else {
        return Ok(None);
    };
    let mut points: Vec<Point> = first
        .exterior()
        .coords()
        .map(|c| Point::new(c.x, c.y))
        .collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return Ok(None);
    }
    Ok(Some(points))
}

/// One row of a matching: a matched pair, or a leftover from either side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchRecord {
    pub old: Option<usize>,
    pub new: Option<usize>,
    pub iou: f64,
}

impl MatchRecord {
    pub fn is_match(&self) -> bool {
        self.old.is_some() && self.new.is_some()
    }
}

/// Greedy one-to-one matcher over polygon sets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolygonMatcher {
    min_iou: f64,
}

impl Default for PolygonMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_IOU)
    }
}

impl PolygonMatcher {
    pub fn new(min_iou: f64) -> Self {
        Self { min_iou }
    }

    pub fn min_iou(&self) -> f64 {
        self.min_iou
    }

    /// Matches `new` polygons against `old` ones.
    ///
    /// Pairs are visited with `new` in the outer loop and `old` in the inner
    /// loop; the first pair reaching the minimum IoU wins and both sides are
    /// consumed. The result lists matches in the order found, then leftover
    /// `old` indices, then leftover `new` indices (both ascending, with an
    /// IoU of 0).
    pub fn match_sets(&self, old: &[Vec<Point>], new: &[Vec<Point>]) -> Vec<MatchRecord> {
        let mut old_taken = vec![false; old.len()];
        let mut new_taken = vec![false; new.len()];
        let mut records = Vec::new();

        for (ni, new_points) in new.iter().enumerate() {
            for (oi, old_points) in old.iter().enumerate() {
                if old_taken[oi] {
                    continue;
                }
                let overlap = match iou(new_points, old_points) {
                    Ok(value) => value,
                    Err(err) => {
                        warn!("Could not compute IoU of new {} and old {}: {}", ni, oi, err);
                        0.0
                    }
                };
                if overlap > 0.0 && overlap >= self.min_iou {
                    old_taken[oi] = true;
                    new_taken[ni] = true;
                    records.push(MatchRecord {
                        old: Some(oi),
                        new: Some(ni),
                        iou: overlap,
                    });
                    break;
                }
            }
        }

        records.extend(
            old_taken
                .iter()
                .enumerate()
                .filter(|(_, taken)| !**taken)
                .map(|(oi, _)| MatchRecord {
                    old: Some(oi),
                    new: None,
                    iou: 0.0,
                }),
        );
        records.extend(
            new_taken
                .iter()
                .enumerate()
                .filter(|(_, taken)| !**taken)
                .map(|(ni, _)| MatchRecord {
                    old: None,
                    new: Some(ni),
                    iou: 0.0,
                }),
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(left: f64, top: f64, right: f64, bottom: f64) -> Vec<Point> {
        vec![
            Point::new(left, top),
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ]
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_iou_basic_properties() {
        let a = square(0.0, 0.0, 11.0, 11.0);
        let b = square(1.0, 1.0, 12.0, 12.0);
        let far = square(50.0, 50.0, 60.0, 60.0);

        assert!(approx(iou(&a, &a).expect("self iou"), 1.0));
        assert!(approx(iou(&a, &b).expect("iou"), 100.0 / 142.0));
        assert!(approx(iou(&a, &b).expect("iou"), iou(&b, &a).expect("iou")));
        assert_eq!(iou(&a, &far).expect("disjoint iou"), 0.0);
    }

    #[test]
    fn test_iou_rejects_degenerate_polygons() {
        let line = vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)];
        assert_eq!(
            iou(&line, &square(0.0, 0.0, 1.0, 1.0)),
            Err(GeometryError::TooFewVertices(2))
        );
        let nan = vec![
            Point::new(0.0, 0.0),
            Point::new(f64::NAN, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        ];
        assert!(iou(&nan, &square(0.0, 0.0, 1.0, 1.0)).is_err());
    }

    #[test]
    fn test_combine_modes() {
        let a = square(0.0, 0.0, 11.0, 11.0);
        let b = square(1.0, 1.0, 12.0, 12.0);

        let inter = combine_polygons(&a, &b, CombineMode::Intersect)
            .expect("intersect")
            .expect("non-empty");
        let xs: Vec<f64> = inter.iter().map(|p| p.x).collect();
        assert_eq!(xs.iter().cloned().fold(f64::INFINITY, f64::min), 1.0);
        assert_eq!(xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 11.0);

        let union = combine_polygons(&a, &b, CombineMode::Union)
            .expect("union")
            .expect("non-empty");
        let ys: Vec<f64> = union.iter().map(|p| p.y).collect();
        assert_eq!(ys.iter().cloned().fold(f64::INFINITY, f64::min), 0.0);
        assert_eq!(ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 12.0);
    }

    #[test]
    fn test_disjoint_intersection_is_empty() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let b = square(5.0, 5.0, 6.0, 6.0);
        assert_eq!(combine_polygons(&a, &b, CombineMode::Intersect), Ok(None));
    }

    #[test]
    fn test_parse_combine_mode() {
        assert_eq!("union".parse::<CombineMode>().expect("union"), CombineMode::Union);
        assert_eq!(CombineMode::default().to_string(), "intersect");
        assert!(matches!(
            "xor".parse::<CombineMode>(),
            Err(ImgvisError::UnsupportedCombination(mode)) if mode == "xor"
        ));
    }

    #[test]
    fn test_match_sets_orders_records() {
        let old = vec![square(0.0, 0.0, 10.0, 10.0), square(100.0, 100.0, 110.0, 110.0)];
        let new = vec![
            square(200.0, 200.0, 210.0, 210.0),
            square(100.0, 100.0, 110.0, 110.0),
        ];
        let records = PolygonMatcher::default().match_sets(&old, &new);

        let pairs: Vec<(Option<usize>, Option<usize>)> =
            records.iter().map(|r| (r.old, r.new)).collect();
        assert_eq!(pairs, vec![(Some(1), Some(1)), (Some(0), None), (None, Some(0))]);
        assert!(approx(records[0].iou, 1.0));
        assert_eq!(records[1].iou, 0.0);
    }

    #[test]
    fn test_match_is_one_to_one_and_first_found_wins() {
        let old = vec![square(0.0, 0.0, 10.0, 10.0), square(0.0, 0.0, 10.0, 10.0)];
        let new = vec![square(0.0, 0.0, 10.0, 10.0), square(0.0, 0.0, 10.0, 10.0)];
        let records = PolygonMatcher::new(0.5).match_sets(&old, &new);
        let pairs: Vec<(Option<usize>, Option<usize>)> =
            records.iter().map(|r| (r.old, r.new)).collect();
        assert_eq!(pairs, vec![(Some(0), Some(0)), (Some(1), Some(1))]);
        assert!(records.iter().all(MatchRecord::is_match));
    }

    #[test]
    fn test_threshold_is_inclusive_and_failures_are_isolated() {
        let old = vec![vec![Point::new(0.0, 0.0)], square(0.0, 0.0, 10.0, 10.0)];
        let new = vec![square(0.0, 0.0, 10.0, 10.0)];
        let records = PolygonMatcher::new(0.99).match_sets(&old, &new);
        assert_eq!(records[0].old, Some(1));
        assert_eq!(records[0].new, Some(0));
        assert_eq!(records[1], MatchRecord { old: Some(0), new: None, iou: 0.0 });
    }
}
