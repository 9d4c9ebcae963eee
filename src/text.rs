//! Label text templates and text anchoring.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ImgvisError;
use crate::ir::{MetaValue, Rect};

/// Placeholder replaced by the object's label.
pub const LABEL_PLACEHOLDER: &str = "{label}";

/// Expands `{label}` and `{key}` placeholders in label templates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextFormatter {
    template: String,
    num_decimals: usize,
}

impl TextFormatter {
    pub fn new(template: impl Into<String>, num_decimals: usize) -> Self {
        Self {
            template: template.into(),
            num_decimals,
        }
    }

    /// An empty template disables text output altogether.
    pub fn is_enabled(&self) -> bool {
        !self.template.is_empty()
    }

    /// Expands the template for one object.
    ///
    /// Floats are printed with the configured number of decimals, all other
    /// values in their plain form. Placeholders without a matching key stay
    /// as they are.
    pub fn expand(&self, label: &str, metadata: &BTreeMap<String, MetaValue>) -> String {
        let mut result = self.template.replace(LABEL_PLACEHOLDER, label);
        for (key, value) in metadata {
            let placeholder = format!("{{{key}}}");
            if !result.contains(&placeholder) {
                continue;
            }
            let text = match value {
                MetaValue::Float(v) => format!("{:.*}", self.num_decimals, v),
                other => other.to_string(),
            };
            result = result.replace(&placeholder, &text);
        }
        result
    }
}

/// Vertical text anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vertical {
    Top,
    Center,
    Bottom,
}

/// Horizontal text anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Horizontal {
    Left,
    Center,
    Right,
}

/// Where to put a label relative to its reference rectangle, written as
/// `V,H` with `V` one of `T`/`C`/`B` and `H` one of `L`/`C`/`R`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextPlacement {
    pub vertical: Vertical,
    pub horizontal: Horizontal,
}

impl Default for TextPlacement {
    fn default() -> Self {
        Self {
            vertical: Vertical::Top,
            horizontal: Horizontal::Left,
        }
    }
}

impl FromStr for TextPlacement {
    type Err = ImgvisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ImgvisError::InvalidTextPlacement(s.to_string());
        let upper = s.trim().to_ascii_uppercase();
        let (v, h) = upper.split_once(',').ok_or_else(invalid)?;
        let vertical = match v.trim() {
            "T" => Vertical::Top,
            "C" => Vertical::Center,
            "B" => Vertical::Bottom,
            _ => return Err(invalid()),
        };
        let horizontal = match h.trim() {
            "L" => Horizontal::Left,
            "C" => Horizontal::Center,
            "R" => Horizontal::Right,
            _ => return Err(invalid()),
        };
        Ok(Self {
            vertical,
            horizontal,
        })
    }
}

impl fmt::Display for TextPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = match self.vertical {
            Vertical::Top => 'T',
            Vertical::Center => 'C',
            Vertical::Bottom => 'B',
        };
        let h = match self.horizontal {
            Horizontal::Left => 'L',
            Horizontal::Center => 'C',
            Horizontal::Right => 'R',
        };
        write!(f, "{v},{h}")
    }
}

impl TextPlacement {
    /// Returns the top-left corner of a `width` x `height` text box anchored
    /// to `rect`. The result is clamped to the `i32` range.
    pub fn anchor(&self, rect: &Rect, width: i32, height: i32) -> (i32, i32) {
        let (left, top) = (i64::from(rect.left), i64::from(rect.top));
        let (right, bottom) = (i64::from(rect.right), i64::from(rect.bottom));
        let (width, height) = (i64::from(width), i64::from(height));
        let x = match self.horizontal {
            Horizontal::Left => left,
            Horizontal::Center => left + (right - left - width).div_euclid(2),
            Horizontal::Right => right - width,
        };
        let y = match self.vertical {
            Vertical::Top => top,
            Vertical::Center => top + (bottom - top - height).div_euclid(2),
            Vertical::Bottom => bottom - height,
        };
        (clamp_i32(x), clamp_i32(y))
    }
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(entries: &[(&str, MetaValue)]) -> BTreeMap<String, MetaValue> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_expand_float_with_decimals() {
        let formatter = TextFormatter::new("{label} ({conf})", 2);
        let meta = metadata(&[("conf", MetaValue::Float(0.98765))]);
        assert_eq!(formatter.expand("dog", &meta), "dog (0.99)");
    }

    #[test]
    fn test_expand_plain_values() {
        let formatter = TextFormatter::new("{label}: {id} {ok} {who}", 3);
        let meta = metadata(&[
            ("id", MetaValue::Int(7)),
            ("ok", MetaValue::Bool(true)),
            ("who", MetaValue::Text("annotator".into())),
            ("unused", MetaValue::Float(1.0)),
        ]);
        assert_eq!(formatter.expand("cat", &meta), "cat: 7 true annotator");
    }

    #[test]
    fn test_unknown_placeholders_are_left_alone() {
        let formatter = TextFormatter::new("{label} {missing}", 3);
        assert_eq!(formatter.expand("cat", &BTreeMap::new()), "cat {missing}");
    }

    #[test]
    fn test_default_decimals() {
        let formatter = TextFormatter::new("{score}", 3);
        let meta = metadata(&[("score", MetaValue::Float(0.5))]);
        assert_eq!(formatter.expand("x", &meta), "0.500");
        assert!(!TextFormatter::new("", 3).is_enabled());
    }

    #[test]
    fn test_parse_placement() {
        let placement: TextPlacement = "b,r".parse().expect("placement");
        assert_eq!(placement.vertical, Vertical::Bottom);
        assert_eq!(placement.horizontal, Horizontal::Right);
        assert_eq!(placement.to_string(), "B,R");
        assert_eq!("T,L".parse::<TextPlacement>().expect("default"), TextPlacement::default());
    }

    #[test]
    fn test_invalid_placement_is_rejected() {
        for spec in ["X,L", "T,Q", "T", "", "T,L,C"] {
            assert!(
                matches!(spec.parse::<TextPlacement>(), Err(ImgvisError::InvalidTextPlacement(_))),
                "expected '{spec}' to be rejected"
            );
        }
    }

    #[test]
    fn test_anchor_positions() {
        let rect = Rect::new(10, 20, 50, 60);
        let at = |spec: &str| spec.parse::<TextPlacement>().expect("placement").anchor(&rect, 10, 6);
        assert_eq!(at("T,L"), (10, 20));
        assert_eq!(at("C,C"), (25, 37));
        assert_eq!(at("B,R"), (40, 54));
    }

    #[test]
    fn test_anchor_clamps_extreme_rects() {
        let placement = |spec: &str| spec.parse::<TextPlacement>().expect("placement");
        let wide = Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(placement("C,C").anchor(&wide, 10, 6), (-6, -4));
        let far = Rect::new(i32::MAX, i32::MAX, i32::MAX, i32::MAX);
        assert_eq!(placement("B,R").anchor(&far, 10, 6), (i32::MAX - 10, i32::MAX - 6));
        let low = Rect::new(i32::MIN, i32::MIN, i32::MIN, i32::MIN);
        assert_eq!(placement("B,R").anchor(&low, 10, 6), (i32::MIN, i32::MIN));
    }
}
