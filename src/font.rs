//! Font lookup and text rasterization.
//!
//! Stages only need to measure and draw text; both go through the
//! [`TextRasterizer`] trait. Fonts are looked up by family name through a
//! [`FontResolver`], and [`load_font`] falls back to
//! [`DEFAULT_FONT_FAMILY`] when the requested family is not available.

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use log::{debug, warn};
use walkdir::WalkDir;

use crate::error::ImgvisError;

/// Family used when the requested one cannot be resolved.
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

/// Measures and draws single-line text.
pub trait TextRasterizer {
    /// Returns the `(width, height)` of `text` in pixels.
    fn text_size(&self, text: &str) -> (u32, u32);

    /// Draws `text` with its top-left corner at (x, y).
    fn draw_text(&self, canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, text: &str);
}

/// Resolves a font family and size to a rasterizer.
pub trait FontResolver {
    fn resolve(&self, family: &str, size: f32) -> Result<Box<dyn TextRasterizer>, ImgvisError>;
}

/// Resolves `family`, falling back to [`DEFAULT_FONT_FAMILY`] with a warning.
///
/// # Errors
/// Returns an error only if the fallback family cannot be resolved either.
pub fn load_font(
    resolver: &dyn FontResolver,
    family: &str,
    size: f32,
) -> Result<Box<dyn TextRasterizer>, ImgvisError> {
    match resolver.resolve(family, size) {
        Ok(font) => Ok(font),
        Err(err) => {
            warn!(
                "Failed to instantiate font family '{}', falling back on '{}': {}",
                family, DEFAULT_FONT_FAMILY, err
            );
            resolver.resolve(DEFAULT_FONT_FAMILY, size)
        }
    }
}

/// A TrueType/OpenType font at a fixed pixel size.
pub struct TrueTypeFont {
    font: FontVec,
    scale: PxScale,
}

impl TrueTypeFont {
    /// Loads a font from its file contents.
    pub fn from_bytes(data: Vec<u8>, size: f32) -> Option<Self> {
        let font = FontVec::try_from_vec(data).ok()?;
        Some(Self {
            font,
            scale: PxScale::from(size),
        })
    }

    /// Loads a font file.
    pub fn from_file(path: &Path, size: f32) -> Result<Self, ImgvisError> {
        let data = fs::read(path)?;
        Self::from_bytes(data, size).ok_or_else(|| ImgvisError::FontUnavailable {
            family: path.display().to_string(),
        })
    }
}

impl TextRasterizer for TrueTypeFont {
    fn text_size(&self, text: &str) -> (u32, u32) {
        text_size(self.scale, &self.font, text)
    }

    fn draw_text(&self, canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, text: &str) {
        draw_text_mut(canvas, color, x, y, self.scale, &self.font, text);
    }
}

/// Looks fonts up by file name in the usual system font directories.
///
/// A family matches a font file when their names agree after dropping case,
/// backslash escapes and punctuation, e.g. `DejaVu Sans` matches
/// `DejaVuSans.ttf`. The generic families `sans-serif`, `serif` and
/// `monospace` map to a list of common concrete families. A family may also
/// be given as a path to a font file.
#[derive(Clone, Debug)]
pub struct SystemFonts {
    search_dirs: Vec<PathBuf>,
}

impl Default for SystemFonts {
    fn default() -> Self {
        let mut search_dirs = vec![
            PathBuf::from("/usr/share/fonts"),
            PathBuf::from("/usr/local/share/fonts"),
            PathBuf::from("/Library/Fonts"),
            PathBuf::from("/System/Library/Fonts"),
            PathBuf::from("C:\\Windows\\Fonts"),
        ];
        if let Some(home) = std::env::var_os("HOME") {
            let home = PathBuf::from(home);
            search_dirs.push(home.join(".fonts"));
            search_dirs.push(home.join(".local/share/fonts"));
        }
        Self { search_dirs }
    }
}

fn normalize_family(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn family_candidates(family: &str) -> Vec<String> {
    let normalized = normalize_family(family);
    let aliases: &[&str] = match normalized.as_str() {
        "sansserif" | "sans" => &[
            "dejavusans",
            "liberationsans",
            "arial",
            "helvetica",
            "freesans",
            "notosans",
        ],
        "serif" => &[
            "dejavuserif",
            "liberationserif",
            "timesnewroman",
            "freeserif",
            "notoserif",
        ],
        "monospace" | "mono" => &[
            "dejavusansmono",
            "liberationmono",
            "couriernew",
            "freemono",
            "notosansmono",
        ],
        _ => &[],
    };
    if aliases.is_empty() {
        vec![normalized]
    } else {
        aliases.iter().map(|a| a.to_string()).collect()
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf"))
        .unwrap_or(false)
}

impl SystemFonts {
    /// Searches only the given directories.
    pub fn with_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    /// Returns the font file for `family`, if one is installed.
    pub fn find(&self, family: &str) -> Option<PathBuf> {
        let direct = Path::new(family);
        if is_font_file(direct) && direct.is_file() {
            return Some(direct.to_path_buf());
        }

        let files: Vec<PathBuf> = self
            .search_dirs
            .iter()
            .filter(|dir| dir.is_dir())
            .flat_map(|dir| {
                WalkDir::new(dir)
                    .follow_links(true)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(Result::ok)
            })
            .filter(|entry| entry.file_type().is_file() && is_font_file(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        family_candidates(family).into_iter().find_map(|candidate| {
            files
                .iter()
                .find(|path| {
                    path.file_stem()
                        .and_then(|s| s.to_str())
                        .map(|s| normalize_family(s) == candidate)
                        .unwrap_or(false)
                })
                .cloned()
        })
    }
}

impl FontResolver for SystemFonts {
    fn resolve(&self, family: &str, size: f32) -> Result<Box<dyn TextRasterizer>, ImgvisError> {
        let path = self.find(family).ok_or_else(|| ImgvisError::FontUnavailable {
            family: family.to_string(),
        })?;
        debug!("Resolved font family '{}' to {}", family, path.display());
        Ok(Box::new(TrueTypeFont::from_file(&path, size)?))
    }
}
