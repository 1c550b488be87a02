//! Pointer interaction: hit-testing, backref resolution, tooltips and callbacks.
//!
//! Click and hover share one resolution path; they only differ in the callback
//! that is dispatched. Outline and fill primitives are silent and never resolve.

use serde::Serialize;
use std::fmt;

use crate::models::{
    risk_level_label, Composition, RenderPrimitive, RiskLayer, RiskPoint, ScreenPoint,
};

/// Kind of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    /// Button press
    Click,
    /// Pointer moved over the surface
    Hover,
}

/// Callback invoked with the clicked point and its layer.
pub type PointCallback = Box<dyn FnMut(&RiskPoint, &RiskLayer)>;
/// Callback invoked with the tooltip of the hovered point.
pub type HoverCallback = Box<dyn FnMut(&Tooltip)>;

/// Resolves a screen position to the topmost point primitive under it.
///
/// A marker is hit when the distance to its centre is at most
/// `size / 2 + tolerance`. Markers later in draw order are on top and win.
///
/// # Examples
///
/// ```
/// use riskgis::models::{Backref, Composition, RenderPrimitive, Rgba, ScreenPoint};
/// use riskgis::services::interaction::hit_test;
///
/// let composition = Composition::new(vec![RenderPrimitive::Point {
///     position: ScreenPoint::new(50.0, 50.0),
///     color: Rgba::new(255, 0, 0, 1.0),
///     size: 10.0,
///     backref: Backref { layer_index: 0, layer_id: "A".into(), point_index: 0 },
/// }]);
/// assert_eq!(hit_test(&composition, ScreenPoint::new(54.0, 50.0), 0.0), Some(0));
/// assert_eq!(hit_test(&composition, ScreenPoint::new(60.0, 50.0), 0.0), None);
/// ```
#[must_use]
pub fn hit_test(composition: &Composition, position: ScreenPoint, tolerance: f64) -> Option<usize> {
    composition
        .points()
        .filter(|(_, primitive)| match primitive {
            RenderPrimitive::Point {
                position: centre,
                size,
                ..
            } => centre.distance(position) <= size / 2.0 + tolerance.max(0.0),
            _ => false,
        })
        .map(|(index, _)| index)
        .last()
}

/// Resolves a primitive index to the `(point, layer)` it was built from.
///
/// Returns `None` for silent primitives, out-of-range indices and stale
/// backrefs.
#[must_use]
pub fn resolve<'a>(
    composition: &Composition,
    layers: &'a [RiskLayer],
    primitive_index: usize,
) -> Option<(&'a RiskPoint, &'a RiskLayer)> {
    let primitive = composition.get(primitive_index)?;
    if primitive.is_silent() {
        return None;
    }
    primitive.backref()?.resolve(layers)
}

/// Tooltip payload for a monitoring point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    /// Layer display name
    pub layer_name: String,
    /// Human-readable risk level
    pub risk_level: String,
    /// Longitude formatted to fixed precision
    pub longitude: String,
    /// Latitude formatted to fixed precision
    pub latitude: String,
    /// Measured value
    pub value: f64,
    /// Design value, when the point has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_value: Option<f64>,
    /// Whether the value exceeds the design value; present with `design_value`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exceeds_limit: Option<bool>,
    /// Elevation, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl Tooltip {
    /// Builds the tooltip for a point of a layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskgis::models::{LayerType, RiskLayer, RiskPoint};
    /// use riskgis::services::interaction::Tooltip;
    ///
    /// let layer = RiskLayer::new("MOR-001", "Slope-1", LayerType::Morphology, 2).unwrap();
    /// let point = RiskPoint::new(87.6123456789, 43.78, 45.2).with_design_value(40.0);
    ///
    /// let tooltip = Tooltip::new(&point, &layer, 6);
    /// assert_eq!(tooltip.longitude, "87.612346");
    /// assert_eq!(tooltip.exceeds_limit, Some(true));
    /// ```
    #[must_use]
    pub fn new(point: &RiskPoint, layer: &RiskLayer, precision: usize) -> Self {
        Self {
            layer_name: layer.name.clone(),
            risk_level: risk_level_label(layer.risk_level).to_string(),
            longitude: format!("{:.*}", precision, point.lon()),
            latitude: format!("{:.*}", precision, point.lat()),
            value: point.value,
            design_value: point.design_value,
            exceeds_limit: point.design_value.map(|_| point.is_exceeding()),
            elevation: point.elevation,
        }
    }

    /// Tooltip as display lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.layer_name.clone(),
            format!("Risk: {}", self.risk_level),
            format!("Position: {}, {}", self.longitude, self.latitude),
            format!("Value: {}", self.value),
        ];
        if let Some(design) = self.design_value {
            lines.push(format!("Design value: {design}"));
        }
        if let Some(exceeds) = self.exceeds_limit {
            lines.push(format!("Exceeds limit: {}", if exceeds { "yes" } else { "no" }));
        }
        if let Some(elevation) = self.elevation {
            lines.push(format!("Elevation: {elevation} m"));
        }
        lines
    }
}

impl fmt::Display for Tooltip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// Host callbacks for point interaction.
#[derive(Default)]
pub struct PointCallbacks {
    /// Invoked on click
    pub on_point_click: Option<PointCallback>,
    /// Invoked on hover
    pub on_point_hover: Option<HoverCallback>,
}

impl fmt::Debug for PointCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointCallbacks")
            .field("on_point_click", &self.on_point_click.is_some())
            .field("on_point_hover", &self.on_point_hover.is_some())
            .finish()
    }
}

/// Routes resolved pointer events to host callbacks.
#[derive(Debug)]
pub struct InteractionController {
    callbacks: PointCallbacks,
    precision: usize,
    tooltip: Option<Tooltip>,
}

impl InteractionController {
    /// Creates a controller formatting coordinates with `precision` decimals.
    #[must_use]
    pub fn new(callbacks: PointCallbacks, precision: usize) -> Self {
        Self {
            callbacks,
            precision,
            tooltip: None,
        }
    }

    /// Replaces the host callbacks.
    pub fn set_callbacks(&mut self, callbacks: PointCallbacks) {
        self.callbacks = callbacks;
    }

    /// Tooltip of the point currently hovered, if any.
    #[must_use]
    pub const fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Clears the hover tooltip (e.g. after the layers changed).
    pub fn clear_tooltip(&mut self) {
        self.tooltip = None;
    }

    /// Handles an event the surface resolved to `primitive` (or to nothing).
    ///
    /// Returns the tooltip of the resolved point, or `None` when the event hit
    /// a silent primitive or empty space.
    pub fn handle(
        &mut self,
        kind: PointerKind,
        primitive: Option<usize>,
        composition: &Composition,
        layers: &[RiskLayer],
    ) -> Option<Tooltip> {
        let Some((point, layer)) = primitive.and_then(|i| resolve(composition, layers, i)) else {
            if kind == PointerKind::Hover {
                self.tooltip = None;
            }
            return None;
        };

        let tooltip = Tooltip::new(point, layer, self.precision);
        match kind {
            PointerKind::Click => {
                if let Some(on_click) = self.callbacks.on_point_click.as_mut() {
                    on_click(point, layer);
                }
            }
            PointerKind::Hover => {
                if let Some(on_hover) = self.callbacks.on_point_hover.as_mut() {
                    on_hover(&tooltip);
                }
                self.tooltip = Some(tooltip.clone());
            }
        }
        Some(tooltip)
    }
}
