//! Risk layer and monitoring point data structures.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of monitoring data a layer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    /// Surface deformation monitoring (settlement, displacement)
    Deformation,
    /// Over-excavation / boundary overstep detection
    Overstep,
    /// Slope morphology measurements checked against design values
    Morphology,
}

impl LayerType {
    /// Returns the lowercase identifier used in layer files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deformation => "deformation",
            Self::Overstep => "overstep",
            Self::Morphology => "morphology",
        }
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal risk severity, 1 being the most severe.
///
/// Layers store the raw integer so that out-of-range values coming from
/// upstream systems still render (with the neutral color).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskLevel {
    /// Level I, major risk (red)
    Major = 1,
    /// Level II, high risk (orange)
    High = 2,
    /// Level III, moderate risk (yellow)
    Moderate = 3,
    /// Level IV, low risk (blue)
    Low = 4,
}

impl RiskLevel {
    /// All recognized levels, most severe first.
    pub const ALL: [Self; 4] = [Self::Major, Self::High, Self::Moderate, Self::Low];

    /// Converts a raw level, returning `None` outside 1..=4.
    #[must_use]
    pub const fn from_raw(level: i64) -> Option<Self> {
        match level {
            1 => Some(Self::Major),
            2 => Some(Self::High),
            3 => Some(Self::Moderate),
            4 => Some(Self::Low),
            _ => None,
        }
    }

    /// Human-readable label shown in tooltips and the legend.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Major => "Level I (major risk)",
            Self::High => "Level II (high risk)",
            Self::Moderate => "Level III (moderate risk)",
            Self::Low => "Level IV (low risk)",
        }
    }

    /// Raw integer value of the level.
    #[must_use]
    pub const fn as_raw(&self) -> i64 {
        *self as i64
    }
}

/// Label for a raw level, falling back to "Unknown level" for unrecognized values.
#[must_use]
pub fn risk_level_label(level: i64) -> &'static str {
    RiskLevel::from_raw(level).map_or("Unknown level", |l| l.label())
}

/// A single monitoring point.
///
/// # Exceeding
///
/// A point is *exceeding* when it has a design value and its measured value is
/// strictly greater. Points without a design value never exceed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskPoint {
    /// `[longitude, latitude]` in degrees
    pub coordinates: [f64; 2],
    /// Measured value
    pub value: f64,
    /// Design (threshold) value, if the point has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_value: Option<f64>,
    /// Elevation in metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl RiskPoint {
    /// Creates a point at `[lon, lat]` with the given value.
    #[must_use]
    pub const fn new(lon: f64, lat: f64, value: f64) -> Self {
        Self {
            coordinates: [lon, lat],
            value,
            design_value: None,
            elevation: None,
        }
    }

    /// Sets the design value.
    #[must_use]
    pub const fn with_design_value(mut self, design_value: f64) -> Self {
        self.design_value = Some(design_value);
        self
    }

    /// Sets the elevation.
    #[must_use]
    pub const fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.coordinates[0]
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.coordinates[1]
    }

    /// Whether the measured value is above the design value.
    #[must_use]
    pub fn is_exceeding(&self) -> bool {
        self.design_value.is_some_and(|design| self.value > design)
    }
}

/// A named, typed collection of a boundary polygon and monitoring points.
///
/// # Validation
///
/// - `id` must be non-empty and unique within the layer set
/// - `opacity` is expected in `[0, 1]`; consumers clamp rather than reject
/// - `risk_level` outside 1..=4 is tolerated and rendered neutral gray
/// - `boundary` is WKT; an unparsable boundary only hides the polygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskLayer {
    /// Unique identifier (e.g., "DEF-001")
    pub id: String,
    /// Display name
    pub name: String,
    /// Kind of monitoring data
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    /// Raw risk level (1 = most severe)
    pub risk_level: i64,
    /// Boundary polygon as WKT text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<String>,
    /// Monitoring points in display order
    #[serde(default)]
    pub points: Vec<RiskPoint>,
    /// Whether the layer is drawn
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Layer opacity in `[0, 1]`
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

/// Default value for `visible` (true)
const fn default_visible() -> bool {
    true
}

/// Default value for `opacity` (fully opaque)
const fn default_opacity() -> f64 {
    1.0
}

impl RiskLayer {
    /// Creates a visible, opaque layer with no boundary and no points.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskgis::models::{LayerType, RiskLayer};
    ///
    /// let layer = RiskLayer::new("DEF-001", "Deformation-1", LayerType::Deformation, 1).unwrap();
    /// assert!(layer.visible);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the id or name is empty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        layer_type: LayerType,
        risk_level: i64,
    ) -> Result<Self> {
        let id = id.into();
        let name = name.into();
        if id.trim().is_empty() {
            anyhow::bail!("Layer id cannot be empty");
        }
        if name.trim().is_empty() {
            anyhow::bail!("Layer '{id}' has an empty name");
        }

        Ok(Self {
            id,
            name,
            layer_type,
            risk_level,
            boundary: None,
            points: Vec::new(),
            visible: true,
            opacity: 1.0,
        })
    }

    /// Sets the WKT boundary.
    pub fn with_boundary(mut self, wkt: impl Into<String>) -> Self {
        self.boundary = Some(wkt.into());
        self
    }

    /// Appends a monitoring point.
    pub fn with_point(mut self, point: RiskPoint) -> Self {
        self.points.push(point);
        self
    }

    /// Sets visibility.
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets opacity.
    pub const fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Recognized risk level, if any.
    #[must_use]
    pub const fn level(&self) -> Option<RiskLevel> {
        RiskLevel::from_raw(self.risk_level)
    }

    /// Number of points whose value exceeds their design value.
    #[must_use]
    pub fn exceeding_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_exceeding()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_exceeding() {
        let point = RiskPoint::new(87.61, 43.78, 45.2).with_design_value(40.0);
        assert!(point.is_exceeding());

        let point = RiskPoint::new(87.61, 43.78, 38.5).with_design_value(40.0);
        assert!(!point.is_exceeding());

        // Equal is not exceeding
        let point = RiskPoint::new(87.61, 43.78, 40.0).with_design_value(40.0);
        assert!(!point.is_exceeding());

        // No design value never exceeds
        let point = RiskPoint::new(87.61, 43.78, 1e9);
        assert!(!point.is_exceeding());
    }

    #[test]
    fn test_risk_level_from_raw() {
        assert_eq!(RiskLevel::from_raw(1), Some(RiskLevel::Major));
        assert_eq!(RiskLevel::from_raw(4), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::from_raw(0), None);
        assert_eq!(RiskLevel::from_raw(5), None);
        assert_eq!(risk_level_label(9), "Unknown level");
        assert_eq!(risk_level_label(300), "Unknown level");
        assert_eq!(risk_level_label(-1), "Unknown level");
        assert_eq!(risk_level_label(2), "Level II (high risk)");
    }

    #[test]
    fn test_layer_new_validates() {
        assert!(RiskLayer::new("DEF-001", "Deformation-1", LayerType::Deformation, 1).is_ok());
        assert!(RiskLayer::new("", "Deformation-1", LayerType::Deformation, 1).is_err());
        assert!(RiskLayer::new("DEF-001", "  ", LayerType::Deformation, 1).is_err());
    }

    #[test]
    fn test_layer_json_shape() {
        let json = r#"{
            "id": "MOR-001",
            "name": "Slope-1",
            "type": "morphology",
            "riskLevel": 2,
            "points": [
                {"coordinates": [87.6, 43.7], "value": 45.2, "designValue": 40.0, "elevation": 812.5}
            ]
        }"#;

        let layer: RiskLayer = serde_json::from_str(json).unwrap();
        assert_eq!(layer.layer_type, LayerType::Morphology);
        assert_eq!(layer.risk_level, 2);
        assert!(layer.visible);
        assert_eq!(layer.opacity, 1.0);
        assert_eq!(layer.boundary, None);
        assert_eq!(layer.points[0].design_value, Some(40.0));
        assert_eq!(layer.points[0].elevation, Some(812.5));
        assert_eq!(layer.exceeding_count(), 1);
    }

    #[test]
    fn test_layer_type_display() {
        assert_eq!(LayerType::Overstep.to_string(), "overstep");
        assert_eq!(
            serde_json::to_string(&LayerType::Deformation).unwrap(),
            "\"deformation\""
        );
    }
}
