//! RGB color values plus the hex, HSL, and distance math every other module
//! builds on.
//!
//! Distance is plain Euclidean distance in 0..255 RGB space. It is not
//! perceptual, and the acceptance thresholds used elsewhere are tuned for
//! exactly this metric.

use crate::error::ColorFormatError;
use std::fmt;
use std::str::FromStr;

/// One 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        rgb_to_hex(self.r, self.g, self.b)
    }

    /// Euclidean distance to `other` in RGB space.
    pub fn distance(self, other: Rgb) -> f64 {
        let dr = f64::from(self.r) - f64::from(other.r);
        let dg = f64::from(self.g) - f64::from(other.g);
        let db = f64::from(self.b) - f64::from(other.b);
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// HSL triple: hue in `[0, 360)`, saturation and lightness in `[0, 100]`.
    pub fn to_hsl(self) -> Hsl {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let sum = max + min;
        let lightness = sum / 2.0;
        if min == max {
            return Hsl {
                hue: 0.0,
                saturation: 0.0,
                lightness: lightness * 100.0,
            };
        }

        let delta = max - min;
        let saturation = if lightness <= 0.5 {
            delta / sum
        } else {
            delta / (2.0 - sum)
        };

        let rc = (max - r) / delta;
        let gc = (max - g) / delta;
        let bc = (max - b) / delta;
        let sector = if r == max {
            bc - gc
        } else if g == max {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };
        let hue = (sector / 6.0).rem_euclid(1.0);

        Hsl {
            hue: hue * 360.0,
            saturation: saturation * 100.0,
            lightness: lightness * 100.0,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (r, g, b) = hex_to_rgb(s)?;
        Ok(Self { r, g, b })
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Hue/saturation/lightness, degrees and percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

/// Parse `#rrggbb` or `rrggbb` (any case, surrounding whitespace ignored).
pub fn hex_to_rgb(hex: &str) -> Result<(u8, u8, u8), ColorFormatError> {
    let trimmed = hex.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if digits.chars().count() != 6 {
        return Err(ColorFormatError::WrongLength {
            input: hex.to_string(),
            digits: digits.chars().count(),
        });
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorFormatError::InvalidDigit {
            input: hex.to_string(),
        });
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| ColorFormatError::InvalidDigit {
            input: hex.to_string(),
        })
    };
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Euclidean RGB distance between two hex colors.
pub fn rgb_distance(c1: &str, c2: &str) -> Result<f64, ColorFormatError> {
    let a: Rgb = c1.parse()?;
    let b: Rgb = c2.parse()?;
    Ok(a.distance(b))
}

pub fn hex_to_hsl(hex: &str) -> Result<Hsl, ColorFormatError> {
    Ok(hex.parse::<Rgb>()?.to_hsl())
}

/// True when `a` and `b` are strictly closer than `tolerance`.
pub fn colors_match(a: Rgb, b: Rgb, tolerance: f64) -> bool {
    a.distance(b) < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn hex_to_rgb_accepts_hash_and_bare_forms() {
        assert_eq!(hex_to_rgb("#fb4934").unwrap(), (0xfb, 0x49, 0x34));
        assert_eq!(hex_to_rgb("FB4934").unwrap(), (0xfb, 0x49, 0x34));
        assert_eq!(hex_to_rgb("  #B8BB26 ").unwrap(), (0xb8, 0xbb, 0x26));
    }

    #[test]
    fn hex_to_rgb_rejects_wrong_length() {
        let err = hex_to_rgb("#fff").unwrap_err();
        assert_eq!(
            err,
            ColorFormatError::WrongLength {
                input: "#fff".into(),
                digits: 3
            }
        );
        assert!(hex_to_rgb("").is_err());
        assert!(hex_to_rgb("#1234567").is_err());
    }

    #[test]
    fn hex_to_rgb_rejects_non_hex_and_multibyte_input() {
        assert!(matches!(
            hex_to_rgb("#zz0000"),
            Err(ColorFormatError::InvalidDigit { .. })
        ));
        assert!(matches!(
            hex_to_rgb("#é0000"),
            Err(ColorFormatError::InvalidDigit { .. })
        ));
    }

    #[test]
    fn rgb_displays_lowercase_hex() {
        let c: Rgb = "#FE8019".parse().unwrap();
        assert_eq!(c.to_string(), "#fe8019");
        assert_eq!(rgb_to_hex(0, 15, 255), "#000fff");
    }

    #[test]
    fn distance_is_zero_for_identical_and_symmetric() {
        assert_close(rgb_distance("#83a598", "#83a598").unwrap(), 0.0);
        let ab = rgb_distance("#000000", "#030404").unwrap();
        let ba = rgb_distance("#030404", "#000000").unwrap();
        assert_close(ab, (9.0f64 + 16.0 + 16.0).sqrt());
        assert_close(ab, ba);
    }

    #[test]
    fn distance_black_to_white() {
        assert_close(
            rgb_distance("#000000", "#ffffff").unwrap(),
            (3.0f64 * 255.0 * 255.0).sqrt(),
        );
    }

    #[test]
    fn hsl_of_primaries() {
        let red = hex_to_hsl("#ff0000").unwrap();
        assert_close(red.hue, 0.0);
        assert_close(red.saturation, 100.0);
        assert_close(red.lightness, 50.0);

        let green = hex_to_hsl("#00ff00").unwrap();
        assert_close(green.hue, 120.0);

        let blue = hex_to_hsl("#0000ff").unwrap();
        assert_close(blue.hue, 240.0);

        let magenta = hex_to_hsl("#ff00ff").unwrap();
        assert_close(magenta.hue, 300.0);
    }

    #[test]
    fn hsl_of_grey_is_achromatic() {
        let grey = hex_to_hsl("#808080").unwrap();
        assert_close(grey.hue, 0.0);
        assert_close(grey.saturation, 0.0);
        assert_close(grey.lightness, 128.0 / 255.0 * 100.0);
    }

    #[test]
    fn hsl_saturation_switches_formula_above_half_lightness() {
        // #ff8080: max 1.0, min 0.50196, l > 0.5
        let pink = hex_to_hsl("#ff8080").unwrap();
        let min = 128.0 / 255.0;
        assert_close(pink.saturation, (1.0 - min) / (2.0 - 1.0 - min) * 100.0);
        assert_close(pink.hue, 0.0);
    }

    #[test]
    fn hsl_hue_wraps_into_range_for_red_dominant_with_blue() {
        // r max, b > g gives a negative sector that must wrap.
        let c = hex_to_hsl("#ff0080").unwrap();
        assert!(c.hue > 300.0 && c.hue < 360.0, "hue {}", c.hue);
    }

    #[test]
    fn colors_match_is_strict() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(3, 4, 0);
        assert!(!colors_match(a, b, 5.0));
        assert!(colors_match(a, b, 5.01));
    }

    #[test]
    fn serde_uses_hex_strings() {
        let c = Rgb::new(0xd3, 0x86, 0x9b);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#d3869b\"");
        let back: Rgb = serde_json::from_str("\"#D3869B\"").unwrap();
        assert_eq!(back, c);
        assert!(serde_json::from_str::<Rgb>("\"#d3869\"").is_err());
    }

    #[cfg(feature = "fuzz-tests")]
    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn hex_round_trips(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
                prop_assert_eq!(hex_to_rgb(&rgb_to_hex(r, g, b)).unwrap(), (r, g, b));
            }

            #[test]
            fn distance_is_symmetric_and_zero_on_self(
                a in any::<(u8, u8, u8)>(),
                b in any::<(u8, u8, u8)>()
            ) {
                let a = Rgb::new(a.0, a.1, a.2);
                let b = Rgb::new(b.0, b.1, b.2);
                prop_assert_eq!(a.distance(a), 0.0);
                prop_assert_eq!(a.distance(b), b.distance(a));
            }

            #[test]
            fn hsl_stays_in_range(c in any::<(u8, u8, u8)>()) {
                let hsl = Rgb::new(c.0, c.1, c.2).to_hsl();
                prop_assert!(hsl.hue >= 0.0 && hsl.hue < 360.0);
                prop_assert!(hsl.saturation >= 0.0 && hsl.saturation <= 100.0 + 1e-9);
                prop_assert!(hsl.lightness >= 0.0 && hsl.lightness <= 100.0 + 1e-9);
            }
        }
    }
}
