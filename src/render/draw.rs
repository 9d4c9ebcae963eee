//! Drawing primitives on RGBA layers.
//!
//! All primitives replace the pixels they touch; blending happens only when
//! a finished layer is composited onto its base image.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point as PixelPoint;

use crate::ir::Point;
use crate::mask::PackedMask;

/// Coordinates are clamped to +/- this many pixels before rasterizing.
const COORD_LIMIT: f64 = (1 << 20) as f64;

fn clamp_coord(value: f64) -> f64 {
    value.clamp(-COORD_LIMIT, COORD_LIMIT)
}

fn to_pixel(point: &Point) -> PixelPoint<i32> {
    PixelPoint::new(
        clamp_coord(point.x).round() as i32,
        clamp_coord(point.y).round() as i32,
    )
}

fn to_line_end(point: &Point) -> (f32, f32) {
    (clamp_coord(point.x) as f32, clamp_coord(point.y) as f32)
}

/// Converts points to pixel positions, dropping consecutive duplicates and a
/// repeated closing point.
fn distinct_pixels(points: &[Point]) -> Vec<PixelPoint<i32>> {
    let mut pixels: Vec<PixelPoint<i32>> = Vec::with_capacity(points.len());
    for point in points.iter().filter(|p| p.is_finite()) {
        let pixel = to_pixel(point);
        if pixels.last() != Some(&pixel) {
            pixels.push(pixel);
        }
    }
    while pixels.len() > 1 && pixels.first() == pixels.last() {
        pixels.pop();
    }
    pixels
}

/// Fills the area enclosed by the closed polygon `points`.
///
/// Polygons with fewer than three distinct vertices enclose nothing and are
/// skipped.
pub fn fill_polygon(canvas: &mut RgbaImage, points: &[Point], color: Rgba<u8>) {
    let pixels = distinct_pixels(points);
    if pixels.len() < 3 {
        return;
    }
    draw_polygon_mut(canvas, &pixels, color);
}

/// Draws the closed outline of `points` with lines `thickness` pixels wide.
///
/// A thickness of 0 draws nothing.
pub fn draw_outline(canvas: &mut RgbaImage, points: &[Point], color: Rgba<u8>, thickness: u32) {
    if thickness == 0 {
        return;
    }
    let points: Vec<&Point> = points.iter().filter(|p| p.is_finite()).collect();
    if points.is_empty() {
        return;
    }
    let edges = points.iter().zip(points.iter().cycle().skip(1));
    if thickness == 1 {
        for (from, to) in edges {
            draw_line_segment_mut(canvas, to_line_end(from), to_line_end(to), color);
        }
        return;
    }

    let half = thickness as f64 / 2.0;
    let radius = (thickness as i32 - 1) / 2;
    for (from, to) in edges {
        draw_thick_segment(canvas, from, to, half, color);
    }
    // Round joints so consecutive segments meet without notches.
    if radius > 0 {
        for point in &points {
            let center = to_pixel(point);
            draw_filled_circle_mut(canvas, (center.x, center.y), radius, color);
        }
    }
}

fn draw_thick_segment(canvas: &mut RgbaImage, from: &Point, to: &Point, half: f64, color: Rgba<u8>) {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let length = dx.hypot(dy);
    if length == 0.0 {
        return;
    }
    let (nx, ny) = (-dy / length * half, dx / length * half);
    let quad = [
        Point::new(from.x + nx, from.y + ny),
        Point::new(to.x + nx, to.y + ny),
        Point::new(to.x - nx, to.y - ny),
        Point::new(from.x - nx, from.y - ny),
    ];
    let pixels = distinct_pixels(&quad);
    match pixels.len() {
        0 => {}
        1 | 2 => draw_line_segment_mut(canvas, to_line_end(from), to_line_end(to), color),
        _ => draw_polygon_mut(canvas, &pixels, color),
    }
}

/// Fills the inclusive rectangle `(left, top)-(right, bottom)`, clipped to
/// the canvas.
pub fn fill_rect(canvas: &mut RgbaImage, left: i32, top: i32, right: i32, bottom: i32, color: Rgba<u8>) {
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);
    let x0 = (left as i64).max(0);
    let y0 = (top as i64).max(0);
    let x1 = (right as i64).min(width - 1);
    let y1 = (bottom as i64).min(height - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Paints every set pixel of `mask` in `color`. Mask pixels outside the
/// canvas are ignored.
pub fn paint_mask(canvas: &mut RgbaImage, mask: &PackedMask, color: Rgba<u8>) {
    let width = mask.width().min(canvas.width());
    let height = mask.height().min(canvas.height());
    for y in 0..height {
        for x in 0..width {
            if mask.get(x, y) {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

/// Blends `top` over `bottom` (straight alpha, source-over).
#[inline]
pub fn blend_over(bottom: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    let top_alpha = top[3] as u32;
    match top_alpha {
        0 => return bottom,
        255 => return top,
        _ => {}
    }
    let bottom_alpha = bottom[3] as u32;
    // Resulting alpha, scaled by 255.
    let out_alpha = top_alpha * 255 + bottom_alpha * (255 - top_alpha);
    if out_alpha == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| {
        let value = top[i] as u32 * top_alpha * 255 + bottom[i] as u32 * bottom_alpha * (255 - top_alpha);
        ((value + out_alpha / 2) / out_alpha) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        ((out_alpha + 127) / 255) as u8,
    ])
}

/// Composites `layer` onto `base`, both anchored at the top-left corner.
pub fn composite(base: &mut RgbaImage, layer: &RgbaImage) {
    let width = base.width().min(layer.width());
    let height = base.height().min(layer.height());
    for y in 0..height {
        for x in 0..width {
            let top = *layer.get_pixel(x, y);
            if top[3] == 0 {
                continue;
            }
            let pixel = base.get_pixel_mut(x, y);
            *pixel = blend_over(*pixel, top);
        }
    }
}
