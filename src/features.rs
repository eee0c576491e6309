//! Fixed-shape numeric features derived from a base16 palette.
//!
//! Every feature depends only on the 16 slot colors, so two extractions of
//! the same palette are bit-identical.

use crate::color::Hsl;
use crate::error::{KeyKind, UnknownKeyError};
use crate::palette::{Palette, Slot};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named component of a [`FeatureVector`].
///
/// Declaration order is lexicographic by [`Feature::name`]; rule learning
/// iterates in this order, which makes its tie-break deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Feature {
    /// HSL lightness of `base00`.
    BgLightness,
    /// Lightness of `base05` minus lightness of `base00`.
    Contrast,
    /// Red vs brown.
    Dist08To0F,
    /// Orange vs yellow.
    Dist09To0A,
    /// Green vs cyan.
    Dist0BTo0C,
    /// Blue vs cyan.
    Dist0DTo0C,
    /// Blue vs purple.
    Dist0DTo0E,
    Hue0B,
    Hue0C,
    Hue0D,
    Sat08,
    /// Saturation of `base09` minus `base0A`.
    Sat09Vs0A,
    Sat0B,
    /// Saturation of `base0B` minus `base0C`.
    Sat0BVs0C,
    Sat0D,
    /// Fraction of accent slots with a warm hue.
    WarmRatio,
}

impl Feature {
    pub const ALL: [Feature; 16] = [
        Self::BgLightness,
        Self::Contrast,
        Self::Dist08To0F,
        Self::Dist09To0A,
        Self::Dist0BTo0C,
        Self::Dist0DTo0C,
        Self::Dist0DTo0E,
        Self::Hue0B,
        Self::Hue0C,
        Self::Hue0D,
        Self::Sat08,
        Self::Sat09Vs0A,
        Self::Sat0B,
        Self::Sat0BVs0C,
        Self::Sat0D,
        Self::WarmRatio,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::BgLightness => "bg_lightness",
            Self::Contrast => "contrast",
            Self::Dist08To0F => "dist_08_0f",
            Self::Dist09To0A => "dist_09_0a",
            Self::Dist0BTo0C => "dist_0b_0c",
            Self::Dist0DTo0C => "dist_0d_0c",
            Self::Dist0DTo0E => "dist_0d_0e",
            Self::Hue0B => "hue_0b",
            Self::Hue0C => "hue_0c",
            Self::Hue0D => "hue_0d",
            Self::Sat08 => "sat_08",
            Self::Sat09Vs0A => "sat_09_vs_0a",
            Self::Sat0B => "sat_0b",
            Self::Sat0BVs0C => "sat_0b_vs_0c",
            Self::Sat0D => "sat_0d",
            Self::WarmRatio => "warm_ratio",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = UnknownKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|feature| feature.name() == normalized)
            .ok_or_else(|| UnknownKeyError::new(KeyKind::Feature, s))
    }
}

impl TryFrom<String> for Feature {
    type Error = UnknownKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Feature> for String {
    fn from(value: Feature) -> Self {
        value.name().to_string()
    }
}

/// Feature values for one palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; 16],
}

impl FeatureVector {
    pub fn extract(palette: &Palette) -> Self {
        let hsl = |slot: Slot| -> Hsl { palette.get(slot).to_hsl() };
        let dist = |a: Slot, b: Slot| palette.get(a).distance(palette.get(b));

        let warm = Slot::ACCENTS
            .iter()
            .filter(|slot| is_warm_hue(hsl(**slot).hue))
            .count();

        let mut values = [0.0; 16];
        let mut set = |feature: Feature, value: f64| values[feature.index()] = value;
        set(Feature::BgLightness, hsl(Slot::Base00).lightness);
        set(
            Feature::Contrast,
            hsl(Slot::Base05).lightness - hsl(Slot::Base00).lightness,
        );
        set(Feature::Dist08To0F, dist(Slot::Base08, Slot::Base0F));
        set(Feature::Dist09To0A, dist(Slot::Base09, Slot::Base0A));
        set(Feature::Dist0BTo0C, dist(Slot::Base0B, Slot::Base0C));
        set(Feature::Dist0DTo0C, dist(Slot::Base0D, Slot::Base0C));
        set(Feature::Dist0DTo0E, dist(Slot::Base0D, Slot::Base0E));
        set(Feature::Hue0B, hsl(Slot::Base0B).hue);
        set(Feature::Hue0C, hsl(Slot::Base0C).hue);
        set(Feature::Hue0D, hsl(Slot::Base0D).hue);
        set(Feature::Sat08, hsl(Slot::Base08).saturation);
        set(
            Feature::Sat09Vs0A,
            hsl(Slot::Base09).saturation - hsl(Slot::Base0A).saturation,
        );
        set(Feature::Sat0B, hsl(Slot::Base0B).saturation);
        set(
            Feature::Sat0BVs0C,
            hsl(Slot::Base0B).saturation - hsl(Slot::Base0C).saturation,
        );
        set(Feature::Sat0D, hsl(Slot::Base0D).saturation);
        set(
            Feature::WarmRatio,
            warm as f64 / Slot::ACCENTS.len() as f64,
        );

        Self { values }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.iter().map(move |f| (*f, self.get(*f)))
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(Feature::ALL.len()))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.name(), &value)?;
        }
        map.end()
    }
}

/// Hues in `[0, 60)` or `(300, 360]` count as warm.
fn is_warm_hue(hue: f64) -> bool {
    hue < 60.0 || hue > 300.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::testsupport::{gruvbox_dark_hard, palette_with};

    #[test]
    fn feature_order_is_lexicographic_by_name() {
        let names: Vec<&str> = Feature::ALL.iter().map(|f| f.name()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn feature_names_parse_back() {
        for feature in Feature::ALL {
            assert_eq!(feature.name().parse::<Feature>().unwrap(), feature);
        }
        assert!("dist_0b_0d".parse::<Feature>().is_err());
    }

    #[test]
    fn extraction_is_deterministic() {
        let palette = gruvbox_dark_hard();
        let a = FeatureVector::extract(&palette);
        let b = FeatureVector::extract(&palette);
        for feature in Feature::ALL {
            assert_eq!(a.get(feature).to_bits(), b.get(feature).to_bits());
        }
    }

    #[test]
    fn identical_green_and_cyan_have_zero_distance() {
        let green = Rgb::new(0x8e, 0xc0, 0x7c);
        let palette = palette_with(&[(Slot::Base0B, green), (Slot::Base0C, green)]);
        let features = FeatureVector::extract(&palette);
        assert_eq!(features.get(Feature::Dist0BTo0C), 0.0);
        assert_eq!(features.get(Feature::Sat0BVs0C), 0.0);
    }

    #[test]
    fn gruvbox_distances_match_hand_computation() {
        let features = FeatureVector::extract(&gruvbox_dark_hard());
        // b8bb26 vs 8ec07c: (42, -5, -86)
        let expected = (42.0f64 * 42.0 + 5.0 * 5.0 + 86.0 * 86.0).sqrt();
        assert!((features.get(Feature::Dist0BTo0C) - expected).abs() < 1e-9);
        // 83a598 vs 8ec07c: (-11, -27, 28)
        let expected = (11.0f64 * 11.0 + 27.0 * 27.0 + 28.0 * 28.0).sqrt();
        assert!((features.get(Feature::Dist0DTo0C) - expected).abs() < 1e-9);
    }

    #[test]
    fn warm_ratio_counts_red_orange_and_magenta_hues() {
        let palette = palette_with(&[
            (Slot::Base08, Rgb::new(255, 0, 0)),   // 0
            (Slot::Base09, Rgb::new(255, 128, 0)), // ~30
            (Slot::Base0A, Rgb::new(255, 255, 0)), // 60, not warm
            (Slot::Base0B, Rgb::new(0, 255, 0)),
            (Slot::Base0C, Rgb::new(0, 255, 255)),
            (Slot::Base0D, Rgb::new(0, 0, 255)),
            (Slot::Base0E, Rgb::new(128, 0, 255)), // ~270
            (Slot::Base0F, Rgb::new(255, 0, 128)), // ~330
        ]);
        let features = FeatureVector::extract(&palette);
        assert_eq!(features.get(Feature::WarmRatio), 3.0 / 8.0);
    }

    #[test]
    fn contrast_is_foreground_minus_background_lightness() {
        let palette = palette_with(&[
            (Slot::Base00, Rgb::new(0, 0, 0)),
            (Slot::Base05, Rgb::new(255, 255, 255)),
        ]);
        let features = FeatureVector::extract(&palette);
        assert_eq!(features.get(Feature::BgLightness), 0.0);
        assert_eq!(features.get(Feature::Contrast), 100.0);
    }

    #[test]
    fn serializes_as_named_map() {
        let features = FeatureVector::extract(&gruvbox_dark_hard());
        let value = serde_json::to_value(features).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 16);
        assert!(map.contains_key("dist_0b_0c"));
        assert!(map.contains_key("warm_ratio"));
    }
}
