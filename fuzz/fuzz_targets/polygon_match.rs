//! Fuzz target for polygon matching and combination.
//!
//! Arbitrary (possibly degenerate or self-intersecting) polygons must never
//! make the matcher or the set operations panic.

#![no_main]

use imgvis::ir::Point;
use imgvis::matching::{combine_polygons, CombineMode, PolygonMatcher};
use libfuzzer_sys::fuzz_target;

fn polygons(data: &[u8]) -> Vec<Vec<Point>> {
    data.split(|b| *b == 0xff)
        .map(|chunk| {
            chunk
                .chunks_exact(2)
                .map(|xy| Point::new(xy[0] as f64, xy[1] as f64))
                .collect()
        })
        .collect()
}

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 {
        return;
    }
    let (left, right) = data.split_at(data.len() / 2);
    let old = polygons(left);
    let new = polygons(right);

    let records = PolygonMatcher::new(0.5).match_sets(&old, &new);
    for record in records.iter().filter(|r| r.is_match()) {
        if let (Some(o), Some(n)) = (record.old, record.new) {
            let _ = combine_polygons(&new[n], &old[o], CombineMode::Union);
            let _ = combine_polygons(&new[n], &old[o], CombineMode::Intersect);
        }
    }
});
