#![allow(dead_code)]

use imgvis::ir::Point;
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const EPS_IOU: f64 = 1e-9;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A boolean pixel matrix as (width, height, row-major pixels).
pub fn arb_bool_matrix(max_side: u32) -> impl Strategy<Value = (u32, u32, Vec<bool>)> {
    (1..=max_side, 1..=max_side).prop_flat_map(|(w, h)| {
        proptest::collection::vec(any::<bool>(), (w * h) as usize)
            .prop_map(move |pixels| (w, h, pixels))
    })
}

/// An index matrix as (labels, rows) with indices in `0..=labels`.
pub fn arb_index_matrix(
    max_labels: usize,
    max_side: usize,
) -> impl Strategy<Value = (Vec<String>, Vec<Vec<u16>>)> {
    (1..=max_labels, 1..=max_side, 1..=max_side).prop_flat_map(|(labels, w, h)| {
        let names: Vec<String> = (0..labels).map(|i| format!("label-{i}")).collect();
        proptest::collection::vec(proptest::collection::vec(0..=labels as u16, w), h)
            .prop_map(move |rows| (names.clone(), rows))
    })
}

/// Axis-aligned rectangle corners with integer coordinates and positive area.
pub fn arb_box(max_coord: i32) -> impl Strategy<Value = Vec<Point>> {
    (0..max_coord, 0..max_coord, 1..max_coord, 1..max_coord).prop_map(|(x, y, w, h)| {
        let (l, t, r, b) = (x as f64, y as f64, (x + w) as f64, (y + h) as f64);
        vec![
            Point::new(l, t),
            Point::new(r, t),
            Point::new(r, b),
            Point::new(l, b),
        ]
    })
}

/// Simple triangle with positive area.
pub fn arb_triangle(max_coord: i32) -> impl Strategy<Value = Vec<Point>> {
    (0..max_coord, 0..max_coord, 1..max_coord, 1..max_coord).prop_map(|(x, y, w, h)| {
        vec![
            Point::new(x as f64, y as f64),
            Point::new((x + w) as f64, y as f64),
            Point::new(x as f64, (y + h) as f64),
        ]
    })
}

/// Shifts every point by (dx, dy).
pub fn translate(points: &[Point], dx: f64, dy: f64) -> Vec<Point> {
    points.iter().map(|p| Point::new(p.x + dx, p.y + dy)).collect()
}
