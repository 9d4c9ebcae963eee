//! Stable per-label color assignment.
//!
//! A [`ColorRegistry`] hands out one RGB color per label for the lifetime of
//! a stage instance. Colors come from a fixed palette (the X11 named colors
//! minus the ones that are too light or too dark to read against), drawn in
//! order and wrapping around when exhausted, unless a custom color table
//! covers the label's ordinal.

mod tables;

use std::collections::HashMap;

use image::{Rgb, Rgba};

use crate::error::ImgvisError;
use tables::{DARK_COLORS, LIGHT_COLORS, X11_COLORS};

/// Default brightness threshold used by [`text_color_for`].
pub const TEXT_COLOR_THRESHOLD: f64 = 128.0;

/// Converts a `0xRRGGBB` value into a color.
#[inline]
pub const fn hex_rgb(value: u32) -> Rgb<u8> {
    Rgb([(value >> 16) as u8, (value >> 8) as u8, value as u8])
}

/// Returns the default palette in X11 listing order.
///
/// Duplicate entries of the X11 list are kept, so the palette cycle is
/// the same regardless of which colors happen to be aliases.
pub fn default_palette(no_light: bool, no_dark: bool) -> Vec<Rgb<u8>> {
    X11_COLORS
        .iter()
        .filter(|c| !(no_light && LIGHT_COLORS.contains(c)))
        .filter(|c| !(no_dark && DARK_COLORS.contains(c)))
        .map(|&c| hex_rgb(c))
        .collect()
}

/// Perceived (YIQ) brightness of a color, in `0.0..=255.0`.
#[inline]
pub fn perceived_brightness(color: Rgb<u8>) -> f64 {
    let [r, g, b] = color.0;
    (r as f64 * 299.0 + g as f64 * 587.0 + b as f64 * 114.0) / 1000.0
}

/// Picks black or white text for legibility on top of `background`.
pub fn text_color_for(background: Rgb<u8>, threshold: f64) -> Rgb<u8> {
    if perceived_brightness(background) >= threshold {
        Rgb([0, 0, 0])
    } else {
        Rgb([255, 255, 255])
    }
}

/// Adds an alpha channel to a color.
#[inline]
pub fn with_alpha(color: Rgb<u8>, alpha: u8) -> Rgba<u8> {
    let [r, g, b] = color.0;
    Rgba([r, g, b, alpha])
}

fn parse_channels<const N: usize>(spec: &str) -> Result<[u8; N], ImgvisError> {
    let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(ImgvisError::InvalidColor(spec.to_string()));
    }
    let mut channels = [0u8; N];
    for (slot, part) in channels.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| ImgvisError::InvalidColor(spec.to_string()))?;
    }
    Ok(channels)
}

/// Parses an `R,G,B` byte triplet.
pub fn parse_rgb(spec: &str) -> Result<Rgb<u8>, ImgvisError> {
    parse_channels::<3>(spec).map(Rgb)
}

/// Parses an `R,G,B,A` byte quadruplet.
pub fn parse_rgba(spec: &str) -> Result<Rgba<u8>, ImgvisError> {
    parse_channels::<4>(spec).map(Rgba)
}

/// Parses a blank-separated list of `R,G,B` triplets. An empty string
/// yields an empty table.
pub fn parse_color_table(spec: &str) -> Result<Vec<Rgb<u8>>, ImgvisError> {
    spec.split_whitespace().map(parse_rgb).collect()
}

/// Remembers the color assigned to each label.
///
/// Labels are never evicted; the registry only grows until it is dropped
/// together with its stage.
#[derive(Clone, Debug)]
pub struct ColorRegistry {
    palette: Vec<Rgb<u8>>,
    next_default: usize,
    custom: Vec<Rgb<u8>>,
    ordinals: HashMap<String, usize>,
    assigned: HashMap<String, Rgb<u8>>,
}

impl Default for ColorRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ColorRegistry {
    /// Creates a registry over the default palette with an optional custom
    /// color table (indexed by label ordinal).
    pub fn new(custom: Vec<Rgb<u8>>) -> Self {
        Self {
            palette: default_palette(true, true),
            next_default: 0,
            custom,
            ordinals: HashMap::new(),
            assigned: HashMap::new(),
        }
    }

    /// Records `label` as seen, giving it the next ordinal if it is new.
    /// Returns the label's ordinal.
    pub fn register_label(&mut self, label: &str) -> usize {
        let next = self.ordinals.len();
        *self.ordinals.entry(label.to_string()).or_insert(next)
    }

    /// Replaces the label ordinals with the positions in `labels`.
    ///
    /// Already assigned colors are kept.
    pub fn set_label_order(&mut self, labels: &[String]) {
        self.ordinals = labels
            .iter()
            .enumerate()
            .map(|(index, label)| (label.clone(), index))
            .collect();
    }

    /// Returns the color for `key`, assigning one on first use.
    pub fn color_for(&mut self, key: &str) -> Rgb<u8> {
        if let Some(color) = self.assigned.get(key) {
            return *color;
        }
        let custom = self
            .ordinals
            .get(key)
            .and_then(|&ordinal| self.custom.get(ordinal))
            .copied();
        let color = match custom {
            Some(color) => color,
            None => self.next_default_color(),
        };
        self.assigned.insert(key.to_string(), color);
        color
    }

    /// Returns true if a color has been assigned to `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.assigned.contains_key(key)
    }

    /// Returns the number of assigned colors.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    /// Returns true if no color has been assigned yet.
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    /// Returns the default palette used by this registry.
    pub fn palette(&self) -> &[Rgb<u8>] {
        &self.palette
    }

    fn next_default_color(&mut self) -> Rgb<u8> {
        if self.next_default >= self.palette.len() {
            self.next_default = 0;
        }
        let color = self.palette[self.next_default];
        self.next_default += 1;
        color
    }
}
