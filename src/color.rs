//! Colors and their array form
//!
//! Colors are persisted in definition and preference files as plain
//! arrays of three (RGB) or four (RGBA) numbers in the 0.0-1.0 range.
//! That is more readable than an opaque encoding, at the cost that
//! colors without an RGB representation (pattern colors) only survive
//! approximately.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tolerance used when comparing color components
pub const COMPONENT_EPSILON: f64 = 1e-9;

/// An RGBA color with components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 4]")]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    /// Opaque color
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    /// Color with explicit alpha
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Components in array order: red, green, blue, alpha
    pub fn to_array(&self) -> [f64; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }

    /// Build a color from three or four components
    ///
    /// Three components imply full opacity. Components are clamped to
    /// 0.0..=1.0; any other length, or a non-finite component, is rejected.
    pub fn from_array(components: &[f64]) -> Result<Self> {
        if let Some(bad) = components.iter().find(|c| !c.is_finite()) {
            return Err(Error::InvalidColor(format!("non-finite component {}", bad)));
        }
        let c = |i: usize| components[i].clamp(0.0, 1.0);
        match components.len() {
            3 => Ok(Color::rgb(c(0), c(1), c(2))),
            4 => Ok(Color::rgba(c(0), c(1), c(2), c(3))),
            n => Err(Error::InvalidColor(format!(
                "expected 3 or 4 components, got {}",
                n
            ))),
        }
    }

    /// Compare two colors component-wise within `COMPONENT_EPSILON`
    pub fn approx_eq(&self, other: &Color) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .all(|(a, b)| (a - b).abs() <= COMPONENT_EPSILON)
    }

    /// 8-bit RGB triple, alpha ignored (for terminal output)
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.red), q(self.green), q(self.blue))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl TryFrom<Vec<f64>> for Color {
    type Error = Error;

    fn try_from(components: Vec<f64>) -> Result<Self> {
        Color::from_array(&components)
    }
}

impl From<Color> for [f64; 4] {
    fn from(color: Color) -> Self {
        color.to_array()
    }
}

/// A color as a host toolkit might hand it over
///
/// Only `Pattern` has no exact RGB representation.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeColor {
    Rgb(Color),
    /// Calibrated white level
    Gray { white: f64, alpha: f64 },
    /// Hue, saturation and brightness, each in 0.0..=1.0
    Hsb {
        hue: f64,
        saturation: f64,
        brightness: f64,
        alpha: f64,
    },
    /// Image-based color; `average` is what it looks like from afar
    Pattern { name: String, average: Color },
}

impl NativeColor {
    /// Exact RGB representation, if the color has one
    pub fn to_rgb(&self) -> Option<Color> {
        match self {
            NativeColor::Rgb(color) => Some(*color),
            NativeColor::Gray { white, alpha } => Some(Color::rgba(*white, *white, *white, *alpha)),
            NativeColor::Hsb {
                hue,
                saturation,
                brightness,
                alpha,
            } => Some(hsb_to_rgb(*hue, *saturation, *brightness, *alpha)),
            NativeColor::Pattern { .. } => None,
        }
    }

    /// Whether `to_rgb` is lossless for this color
    pub fn is_rgb_representable(&self) -> bool {
        self.to_rgb().is_some()
    }
}

impl From<Color> for NativeColor {
    fn from(color: Color) -> Self {
        NativeColor::Rgb(color)
    }
}

/// Convert a color to RGB if needed and return its [R, G, B, A] components
///
/// Pattern colors fall back to their average color; that is an
/// approximation, not an error.
pub fn to_array(color: &NativeColor) -> [f64; 4] {
    match color.to_rgb() {
        Some(rgb) => rgb.to_array(),
        None => {
            if let NativeColor::Pattern { name, average } = color {
                log::debug!("pattern color '{}' stored as its average RGB value", name);
                average.to_array()
            } else {
                Color::BLACK.to_array()
            }
        }
    }
}

/// Build an RGB(A) color from a three or four element array
pub fn from_array(components: &[f64]) -> Result<NativeColor> {
    Color::from_array(components).map(NativeColor::Rgb)
}

fn hsb_to_rgb(hue: f64, saturation: f64, brightness: f64, alpha: f64) -> Color {
    let s = saturation.clamp(0.0, 1.0);
    let v = brightness.clamp(0.0, 1.0);
    if s == 0.0 {
        return Color::rgba(v, v, v, alpha);
    }
    let h = (hue.rem_euclid(1.0)) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match sector as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Color::rgba(r, g, b, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_round_trip() {
        let samples = [
            Color::rgb(0.0, 0.0, 0.0),
            Color::rgb(1.0, 0.5, 0.25),
            Color::rgba(0.1, 0.2, 0.3, 0.4),
            Color::rgba(0.333, 0.666, 0.999, 0.0),
        ];
        for color in samples {
            let native = NativeColor::Rgb(color);
            let back = from_array(&to_array(&native)).unwrap();
            assert_eq!(back, native);
        }
    }

    #[test]
    fn test_three_components_are_opaque() {
        let color = Color::from_array(&[0.2, 0.4, 0.6]).unwrap();
        assert_eq!(color.alpha, 1.0);
        assert_eq!(to_array(&NativeColor::Rgb(color))[3], 1.0);
    }

    #[test]
    fn test_gray_and_hsb_convert_to_rgb() {
        let gray = NativeColor::Gray {
            white: 0.5,
            alpha: 1.0,
        };
        assert_eq!(to_array(&gray), [0.5, 0.5, 0.5, 1.0]);

        let red = NativeColor::Hsb {
            hue: 0.0,
            saturation: 1.0,
            brightness: 1.0,
            alpha: 1.0,
        };
        let back = Color::from_array(&to_array(&red)).unwrap();
        assert!(back.approx_eq(&Color::rgb(1.0, 0.0, 0.0)));

        let blue = NativeColor::Hsb {
            hue: 2.0 / 3.0,
            saturation: 1.0,
            brightness: 1.0,
            alpha: 0.5,
        };
        assert!(Color::from_array(&to_array(&blue))
            .unwrap()
            .approx_eq(&Color::rgba(0.0, 0.0, 1.0, 0.5)));
    }

    #[test]
    fn test_pattern_round_trip_is_lossy() {
        let pattern = NativeColor::Pattern {
            name: "stripes".to_string(),
            average: Color::rgb(0.5, 0.5, 0.5),
        };
        assert!(!pattern.is_rgb_representable());
        let back = from_array(&to_array(&pattern)).unwrap();
        assert_ne!(back, pattern);
        assert_eq!(back, NativeColor::Rgb(Color::rgb(0.5, 0.5, 0.5)));
    }

    #[test]
    fn test_from_array_rejects_bad_input() {
        assert!(Color::from_array(&[]).is_err());
        assert!(Color::from_array(&[0.1, 0.2]).is_err());
        assert!(Color::from_array(&[0.1, 0.2, 0.3, 0.4, 0.5]).is_err());
        assert!(Color::from_array(&[f64::NAN, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_from_array_clamps() {
        let color = Color::from_array(&[1.5, -0.5, 0.5]).unwrap();
        assert_eq!(color, Color::rgb(1.0, 0.0, 0.5));
    }

    #[test]
    fn test_toml_array_form() {
        #[derive(Deserialize, Serialize)]
        struct Holder {
            color: Color,
        }

        let holder: Holder = toml::from_str("color = [1.0, 0.0, 0.5]").unwrap();
        assert_eq!(holder.color, Color::rgb(1.0, 0.0, 0.5));

        let written = toml::to_string(&holder).unwrap();
        let reread: Holder = toml::from_str(&written).unwrap();
        assert_eq!(reread.color, holder.color);

        assert!(toml::from_str::<Holder>("color = [1.0]").is_err());
    }

    #[test]
    fn test_to_rgb8() {
        assert_eq!(Color::rgb(1.0, 0.0, 0.5).to_rgb8(), (255, 0, 128));
    }
}
