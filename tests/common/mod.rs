#![allow(dead_code)]

use std::fs;
use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage};
use imgvis::font::{FontResolver, TextRasterizer};
use imgvis::ImgvisError;

pub fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let pixels = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    imgvis::codec::encode(&pixels, imgvis::ir::ImageFormat::Png).expect("encode png")
}

pub fn write_png(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, png_bytes(width, height, color)).expect("write png file");
}

pub fn write_text(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, content).expect("write text file");
}

/// Draws each character as a solid 5x8 block so tests do not depend on
/// installed fonts.
pub struct SolidFont;

pub const SOLID_GLYPH: (u32, u32) = (5, 8);

impl TextRasterizer for SolidFont {
    fn text_size(&self, text: &str) -> (u32, u32) {
        (text.chars().count() as u32 * SOLID_GLYPH.0, SOLID_GLYPH.1)
    }

    fn draw_text(&self, canvas: &mut image::RgbaImage, color: image::Rgba<u8>, x: i32, y: i32, text: &str) {
        let (w, h) = self.text_size(text);
        for dy in 0..h as i32 {
            for dx in 0..w as i32 {
                let (px, py) = (x + dx, y + dy);
                if px >= 0 && py >= 0 && (px as u32) < canvas.width() && (py as u32) < canvas.height() {
                    canvas.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

pub struct SolidFonts;

impl FontResolver for SolidFonts {
    fn resolve(&self, _family: &str, _size: f32) -> Result<Box<dyn TextRasterizer>, ImgvisError> {
        Ok(Box::new(SolidFont))
    }
}
