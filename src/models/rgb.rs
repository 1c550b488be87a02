//! RGB and RGBA color values used by the symbology and the surfaces.

// Allow small types passed by reference for API consistency
#![allow(clippy::trivially_copy_pass_by_ref)]
// Allow intentional type casts for color math
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// RGB color value with hex string representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl RgbColor {
    /// Creates a new `RgbColor` from individual channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Converts the color to a hex string in the format "#RRGGBB" (uppercase).
    ///
    /// # Examples
    ///
    /// ```
    /// use riskgis::models::RgbColor;
    ///
    /// assert_eq!(RgbColor::new(255, 77, 79).to_hex(), "#FF4D4F");
    /// ```
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Adds an alpha channel.
    #[must_use]
    pub const fn with_alpha(self, a: f64) -> Rgba {
        Rgba { rgb: self, a }
    }

    /// Converts the color to a Ratatui Color for terminal rendering.
    #[cfg(feature = "ratatui")]
    #[must_use]
    pub const fn to_ratatui_color(&self) -> ratatui::style::Color {
        ratatui::style::Color::Rgb(self.r, self.g, self.b)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// RGB color with a floating point alpha channel.
///
/// The alpha is kept as `f64` so that a layer opacity survives the trip
/// through the symbology unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Hue channels
    #[serde(flatten)]
    pub rgb: RgbColor,
    /// Alpha in `[0, 1]`
    pub a: f64,
}

impl Rgba {
    /// Creates a color from channels and alpha.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            rgb: RgbColor::new(r, g, b),
            a,
        }
    }

    /// Returns the same hue with the alpha multiplied by `factor`.
    #[must_use]
    pub fn scale_alpha(self, factor: f64) -> Self {
        Self {
            rgb: self.rgb,
            a: (self.a * factor).clamp(0.0, 1.0),
        }
    }

    /// Composites this color over an opaque background.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskgis::models::{RgbColor, Rgba};
    ///
    /// let half_red = Rgba::new(255, 0, 0, 0.5);
    /// assert_eq!(half_red.over(RgbColor::new(0, 0, 0)), RgbColor::new(128, 0, 0));
    /// ```
    #[must_use]
    pub fn over(&self, background: RgbColor) -> RgbColor {
        let a = self.a.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 {
            (f64::from(fg) * a + f64::from(bg) * (1.0 - a))
                .round()
                .clamp(0.0, 255.0) as u8
        };
        RgbColor::new(
            mix(self.rgb.r, background.r),
            mix(self.rgb.g, background.g),
            mix(self.rgb.b, background.b),
        )
    }

    /// CSS `rgba()` notation.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.rgb.r, self.rgb.g, self.rgb.b, self.a)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_css())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex() {
        assert_eq!(RgbColor::new(255, 0, 0).to_hex(), "#FF0000");
        assert_eq!(RgbColor::new(0, 128, 255).to_hex(), "#0080FF");
        assert_eq!(RgbColor::new(0, 0, 0).to_hex(), "#000000");
    }

    #[test]
    fn test_scale_alpha() {
        let color = Rgba::new(10, 20, 30, 0.7);
        let fill = color.scale_alpha(0.3);
        assert_eq!(fill.rgb, color.rgb);
        assert!((fill.a - 0.21).abs() < 1e-12);

        // Clamped to one
        assert_eq!(Rgba::new(0, 0, 0, 0.8).scale_alpha(2.0).a, 1.0);
    }

    #[test]
    fn test_over_extremes() {
        let bg = RgbColor::new(20, 40, 60);
        let fg = RgbColor::new(200, 100, 0);
        assert_eq!(fg.with_alpha(1.0).over(bg), fg);
        assert_eq!(fg.with_alpha(0.0).over(bg), bg);
    }

    #[test]
    fn test_rgba_serializes_flat() {
        let json = serde_json::to_value(Rgba::new(1, 2, 3, 0.5)).unwrap();
        assert_eq!(json, serde_json::json!({"r": 1, "g": 2, "b": 3, "a": 0.5}));
    }

    #[test]
    fn test_css() {
        assert_eq!(Rgba::new(255, 77, 79, 0.7).to_css(), "rgba(255, 77, 79, 0.7)");
        assert_eq!(Rgba::new(0, 0, 0, 1.0).to_string(), "rgba(0, 0, 0, 1)");
    }
}
