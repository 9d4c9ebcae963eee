//! 1-bit-per-pixel label masks.
//!
//! Masks are packed row by row. Each row is right-padded with zero bits to
//! a multiple of 8 columns, and within a byte the most significant bit is
//! the leftmost pixel of its group of 8.

use crate::error::ImgvisError;
use crate::ir::{IndexMatrix, SegmentationAnnotation, SegmentationLayers};

/// A packed 1-bit mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Number of bytes per packed row.
#[inline]
pub fn row_stride(width: u32) -> usize {
    (width as usize).div_ceil(8)
}

impl PackedMask {
    /// Creates an all-clear mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; row_stride(width) * height as usize],
        }
    }

    /// Wraps already packed bytes.
    ///
    /// # Errors
    /// Returns an error if `data` is not exactly `height` rows of packed bytes.
    pub fn from_bytes(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImgvisError> {
        let expected = row_stride(width) * height as usize;
        if data.len() != expected {
            return Err(ImgvisError::InvalidSegmentation(format!(
                "packed mask has {} bytes, expected {} for {}x{}",
                data.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Packs a row-major boolean matrix.
    ///
    /// # Panics
    /// Panics if `pixels.len() != width * height`.
    pub fn from_bools(width: u32, height: u32, pixels: &[bool]) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize,
            "pixel count must equal width * height"
        );
        let mut mask = Self::new(width, height);
        if width == 0 {
            return mask;
        }
        for (i, _) in pixels.iter().enumerate().filter(|(_, set)| **set) {
            let x = (i % width as usize) as u32;
            let y = (i / width as usize) as u32;
            mask.set(x, y);
        }
        mask
    }

    /// Expands the mask back into a row-major boolean matrix, dropping the
    /// padding bits.
    pub fn to_bools(&self) -> Vec<bool> {
        let mut pixels = Vec::with_capacity(self.width as usize * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                pixels.push(self.get(x, y));
            }
        }
        pixels
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The packed bytes, row by row.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn locate(&self, x: u32, y: u32) -> (usize, u8) {
        let byte = y as usize * row_stride(self.width) + x as usize / 8;
        (byte, 0x80 >> (x % 8))
    }

    /// Returns whether pixel (x, y) is set.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        let (byte, bit) = self.locate(x, y);
        self.data[byte] & bit != 0
    }

    /// Sets pixel (x, y).
    #[inline]
    pub fn set(&mut self, x: u32, y: u32) {
        let (byte, bit) = self.locate(x, y);
        self.data[byte] |= bit;
    }

    /// The packed bytes with the padding bits of each row cleared.
    fn pixel_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        let stride = row_stride(self.width).max(1);
        let last = match self.width % 8 {
            0 => 0xFF,
            used => 0xFFu8 << (8 - used),
        };
        self.data
            .iter()
            .enumerate()
            .map(move |(i, b)| if i % stride == stride - 1 { b & last } else { *b })
    }

    /// Returns true if no pixel is set. Padding bits are ignored.
    pub fn is_clear(&self) -> bool {
        self.pixel_bytes().all(|b| b == 0)
    }

    /// Number of set pixels.
    pub fn count_set(&self) -> usize {
        self.pixel_bytes().map(|b| b.count_ones() as usize).sum()
    }
}

/// Builds the mask of pixels whose index equals `index`.
pub fn mask_for_index(matrix: &IndexMatrix, index: u16) -> PackedMask {
    let mut mask = PackedMask::new(matrix.width(), matrix.height());
    for y in 0..matrix.height() {
        for (x, cell) in matrix.row(y).iter().enumerate() {
            if *cell == index {
                mask.set(x as u32, y);
            }
        }
    }
    mask
}

/// Expands a segmentation annotation into one mask per label.
///
/// Labels keep their priority order; labels without any pixel are left
/// out. Masks of the pre-expanded representation are passed through for
/// the labels they cover.
pub fn decompress_layers(annotation: &SegmentationAnnotation) -> Vec<(String, PackedMask)> {
    match &annotation.layers {
        SegmentationLayers::Indexed(matrix) => annotation
            .labels
            .iter()
            .enumerate()
            .filter_map(|(i, label)| {
                let index = u16::try_from(i + 1).ok()?;
                let mask = mask_for_index(matrix, index);
                (!mask.is_clear()).then(|| (label.clone(), mask))
            })
            .collect(),
        SegmentationLayers::Masks(masks) => annotation
            .labels
            .iter()
            .filter_map(|label| {
                let mask = masks.get(label)?;
                (!mask.is_clear()).then(|| (label.clone(), mask.clone()))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_bit_order_is_msb_first() {
        let mut pixels = vec![false; 10];
        pixels[0] = true;
        pixels[7] = true;
        pixels[8] = true;
        let mask = PackedMask::from_bools(10, 1, &pixels);
        assert_eq!(mask.as_bytes(), &[0b1000_0001, 0b1000_0000]);
    }

    #[test]
    fn test_rows_are_padded_to_whole_bytes() {
        // 3 columns → 1 byte per row, 5 unused low bits.
        let pixels = [true, false, true, false, true, true];
        let mask = PackedMask::from_bools(3, 2, &pixels);
        assert_eq!(mask.as_bytes(), &[0b1010_0000, 0b0110_0000]);
        assert_eq!(mask.to_bools(), pixels.to_vec());
        assert_eq!(mask.count_set(), 4);
    }

    #[test]
    fn test_from_bytes_validates_length() {
        assert!(PackedMask::from_bytes(9, 2, vec![0; 4]).is_ok());
        assert!(PackedMask::from_bytes(9, 2, vec![0; 3]).is_err());
    }

    #[test]
    fn test_padding_bits_are_not_pixels() {
        // 3 columns: only the top 3 bits of each row byte are pixels.
        let mask = PackedMask::from_bytes(3, 2, vec![0b0001_1111, 0b0000_0001]).expect("mask");
        assert!(mask.is_clear());
        assert_eq!(mask.count_set(), 0);

        let mask = PackedMask::from_bytes(11, 1, vec![0b0000_0000, 0b0101_1111]).expect("mask");
        assert_eq!(mask.count_set(), 1);
        assert!(!mask.is_clear());

        let annotation = SegmentationAnnotation {
            labels: vec!["road".into()],
            layers: SegmentationLayers::Masks(BTreeMap::from([(
                "road".to_string(),
                PackedMask::from_bytes(3, 1, vec![0b0000_0111]).expect("mask"),
            )])),
        };
        assert!(decompress_layers(&annotation).is_empty());
    }

    #[test]
    fn test_decompress_indexed_skips_empty_labels() {
        let matrix = IndexMatrix::from_rows(&[vec![0, 1, 1], vec![3, 3, 0]]).expect("matrix");
        let annotation = SegmentationAnnotation {
            labels: vec!["sky".into(), "tree".into(), "road".into()],
            layers: SegmentationLayers::Indexed(matrix),
        };

        let layers = decompress_layers(&annotation);
        let names: Vec<&str> = layers.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(names, vec!["sky", "road"]);
        assert_eq!(layers[0].1.to_bools(), vec![false, true, true, false, false, false]);
        assert_eq!(layers[1].1.to_bools(), vec![false, false, false, true, true, false]);
    }

    #[test]
    fn test_decompress_masks_follows_label_order() {
        let mut masks = BTreeMap::new();
        masks.insert("b".to_string(), PackedMask::from_bools(2, 1, &[true, false]));
        masks.insert("a".to_string(), PackedMask::from_bools(2, 1, &[false, true]));
        masks.insert("empty".to_string(), PackedMask::new(2, 1));
        let annotation = SegmentationAnnotation {
            labels: vec!["b".into(), "empty".into(), "a".into()],
            layers: SegmentationLayers::Masks(masks),
        };

        let names: Vec<String> = decompress_layers(&annotation)
            .into_iter()
            .map(|(l, _)| l)
            .collect();
        assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    }
}
