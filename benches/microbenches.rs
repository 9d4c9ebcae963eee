//! Criterion microbenches for imgvis mask and polygon handling.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - expanding an index matrix into per-label masks (decompress_layers)
//! - polygon matching by IoU (PolygonMatcher::match_sets)
//! - painting a layer of shapes (OverlayRenderer::draw_layer)

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use image::Rgba;
use imgvis::ir::{IndexMatrix, Point, SegmentationAnnotation, SegmentationLayers};
use imgvis::mask::decompress_layers;
use imgvis::matching::PolygonMatcher;
use imgvis::render::{DrawItem, OverlayRenderer};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

/// Four labels laid out as vertical stripes with some background.
fn striped_annotation() -> SegmentationAnnotation {
    let indices: Vec<u16> = (0..HEIGHT)
        .flat_map(|_| (0..WIDTH).map(|x| ((x / 37) % 5) as u16))
        .collect();
    SegmentationAnnotation {
        labels: vec!["sky".into(), "tree".into(), "road".into(), "car".into()],
        layers: SegmentationLayers::Indexed(
            IndexMatrix::new(WIDTH, HEIGHT, indices).expect("valid index matrix"),
        ),
    }
}

/// A grid of `n` x `n` axis-aligned boxes, shifted by `offset`.
fn box_grid(n: usize, offset: f64) -> Vec<Vec<Point>> {
    let mut boxes = Vec::with_capacity(n * n);
    for row in 0..n {
        for col in 0..n {
            let (l, t) = (col as f64 * 30.0 + offset, row as f64 * 30.0 + offset);
            boxes.push(vec![
                Point::new(l, t),
                Point::new(l + 20.0, t),
                Point::new(l + 20.0, t + 20.0),
                Point::new(l, t + 20.0),
            ]);
        }
    }
    boxes
}

/// Benchmark mask decompression of a VGA-sized index matrix.
fn bench_decompress_layers(c: &mut Criterion) {
    let annotation = striped_annotation();

    let mut group = c.benchmark_group("mask");
    group.throughput(Throughput::Elements(WIDTH as u64 * HEIGHT as u64));

    group.bench_function("decompress_layers", |b| {
        b.iter(|| {
            let layers = decompress_layers(black_box(&annotation));
            black_box(layers)
        })
    });

    group.finish();
}

/// Benchmark greedy IoU matching between two slightly shifted box grids.
fn bench_match_sets(c: &mut Criterion) {
    let old = box_grid(6, 0.0);
    let new = box_grid(6, 1.0);
    let matcher = PolygonMatcher::default();

    let mut group = c.benchmark_group("matching");
    group.throughput(Throughput::Elements((old.len() * new.len()) as u64));

    group.bench_function("match_sets", |b| {
        b.iter(|| {
            let records = matcher.match_sets(black_box(&old), black_box(&new));
            black_box(records)
        })
    });

    group.finish();
}

/// Benchmark painting outlined and filled shapes onto a layer.
fn bench_draw_layer(c: &mut Criterion) {
    let items: Vec<DrawItem> = box_grid(10, 5.0)
        .into_iter()
        .map(|points| {
            DrawItem::shape(
                points,
                Some(Rgba([255, 0, 0, 255])),
                Some(Rgba([255, 0, 0, 128])),
            )
        })
        .collect();
    let renderer = OverlayRenderer::new(3, None);

    let mut group = c.benchmark_group("render");
    group.throughput(Throughput::Elements(items.len() as u64));

    group.bench_function("draw_layer", |b| {
        b.iter(|| {
            let layer = renderer.draw_layer(WIDTH, HEIGHT, black_box(&items));
            black_box(layer)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_decompress_layers,
    bench_match_sets,
    bench_draw_layer,
);
criterion_main!(benches);
