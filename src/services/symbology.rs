//! Risk-driven symbology: colors, fill alpha and marker sizes.
//!
//! Hue comes from a single palette keyed by risk level; polygon fills reuse
//! the stroke hue at a reduced alpha.

use serde::Serialize;

use crate::config::SymbologyConfig;
use crate::models::{LayerType, RgbColor, RiskLevel, RiskPoint, Rgba};

/// Level I color (red).
pub const MAJOR_COLOR: RgbColor = RgbColor::new(0xFF, 0x4D, 0x4F);
/// Level II color (orange).
pub const HIGH_COLOR: RgbColor = RgbColor::new(0xFA, 0x8C, 0x16);
/// Level III color (yellow).
pub const MODERATE_COLOR: RgbColor = RgbColor::new(0xFA, 0xDB, 0x14);
/// Level IV color (blue).
pub const LOW_COLOR: RgbColor = RgbColor::new(0x18, 0x90, 0xFF);
/// Color for unrecognized risk levels.
pub const NEUTRAL_COLOR: RgbColor = RgbColor::new(0x8C, 0x8C, 0x8C);

/// Default marker size.
pub const BASE_POINT_SIZE: f64 = 10.0;
/// Default marker size for exceeding morphology points.
pub const EXCEEDING_POINT_SIZE: f64 = 15.0;
/// Default fill alpha relative to the stroke.
pub const FILL_ALPHA_FACTOR: f64 = 0.3;

/// Palette hue for a raw risk level.
#[must_use]
pub const fn hue_for(risk_level: i64) -> RgbColor {
    match RiskLevel::from_raw(risk_level) {
        Some(RiskLevel::Major) => MAJOR_COLOR,
        Some(RiskLevel::High) => HIGH_COLOR,
        Some(RiskLevel::Moderate) => MODERATE_COLOR,
        Some(RiskLevel::Low) => LOW_COLOR,
        None => NEUTRAL_COLOR,
    }
}

/// Clamps an opacity into `[0, 1]`; NaN becomes fully transparent.
#[must_use]
pub fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        0.0
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

/// Stroke/marker color for a risk level at the given opacity.
///
/// # Examples
///
/// ```
/// use riskgis::services::symbology::color_for;
///
/// let color = color_for(1, 0.7);
/// assert_eq!(color.rgb.to_hex(), "#FF4D4F");
/// assert_eq!(color.a, 0.7);
///
/// // Unknown levels are gray, out-of-range opacity is clamped
/// assert_eq!(color_for(7, 3.0).rgb.to_hex(), "#8C8C8C");
/// assert_eq!(color_for(7, 3.0).a, 1.0);
/// ```
#[must_use]
pub fn color_for(risk_level: i64, opacity: f64) -> Rgba {
    hue_for(risk_level).with_alpha(clamp_opacity(opacity))
}

/// Marker size with the default constants.
#[must_use]
pub fn size_for(layer_type: LayerType, point: &RiskPoint) -> f64 {
    Symbology::default().size_for(layer_type, point)
}

/// Styling rules parameterized by configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Symbology {
    base_point_size: f64,
    exceeding_point_size: f64,
    fill_alpha_factor: f64,
}

impl Default for Symbology {
    fn default() -> Self {
        Self {
            base_point_size: BASE_POINT_SIZE,
            exceeding_point_size: EXCEEDING_POINT_SIZE,
            fill_alpha_factor: FILL_ALPHA_FACTOR,
        }
    }
}

impl From<&SymbologyConfig> for Symbology {
    fn from(config: &SymbologyConfig) -> Self {
        Self {
            base_point_size: config.base_point_size,
            exceeding_point_size: config.exceeding_point_size,
            fill_alpha_factor: config.fill_alpha_factor.clamp(0.0, 1.0),
        }
    }
}

impl Symbology {
    /// Stroke and marker color.
    #[must_use]
    pub fn stroke(&self, risk_level: i64, opacity: f64) -> Rgba {
        color_for(risk_level, opacity)
    }

    /// Polygon fill color: same hue, alpha scaled by the fill factor.
    #[must_use]
    pub fn fill(&self, risk_level: i64, opacity: f64) -> Rgba {
        color_for(risk_level, opacity).scale_alpha(self.fill_alpha_factor)
    }

    /// Marker size; exceeding morphology points are enlarged.
    #[must_use]
    pub fn size_for(&self, layer_type: LayerType, point: &RiskPoint) -> f64 {
        if layer_type == LayerType::Morphology && point.is_exceeding() {
            self.exceeding_point_size
        } else {
            self.base_point_size
        }
    }

    /// Largest marker size this symbology produces.
    #[must_use]
    pub fn max_point_size(&self) -> f64 {
        self.base_point_size.max(self.exceeding_point_size)
    }
}

/// One row of the risk-level legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    /// Raw level
    pub level: i64,
    /// Display label
    pub label: &'static str,
    /// Palette color
    pub color: RgbColor,
}

/// Legend for all recognized risk levels, most severe first.
#[must_use]
pub fn legend() -> Vec<LegendEntry> {
    RiskLevel::ALL
        .iter()
        .map(|level| LegendEntry {
            level: level.as_raw(),
            label: level.label(),
            color: hue_for(level.as_raw()),
        })
        .collect()
}
