//! Layer-control panel state and host-side layer store.
//!
//! The panel never mutates the layers it displays. Visibility and opacity
//! edits become [`PanelChange`] notifications; the host applies them to its
//! own [`LayerStore`] and passes the updated array back for the next pass.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::models::{risk_level_label, RgbColor, RiskLayer};

use super::symbology::{clamp_opacity, hue_for};

/// Callback for visibility changes: `(layer_id, visible)`.
pub type VisibilityCallback = Box<dyn FnMut(&str, bool)>;
/// Callback for opacity changes: `(layer_id, opacity)`.
pub type OpacityCallback = Box<dyn FnMut(&str, f64)>;

/// A change requested from the layer panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "lowercase")]
pub enum PanelChange {
    /// Show or hide a layer
    Visibility {
        /// Target layer
        layer_id: String,
        /// Requested visibility
        visible: bool,
    },
    /// Change layer opacity
    Opacity {
        /// Target layer
        layer_id: String,
        /// Requested opacity, already clamped to `[0, 1]`
        opacity: f64,
    },
}

impl PanelChange {
    /// Id of the layer the change targets.
    #[must_use]
    pub fn layer_id(&self) -> &str {
        match self {
            Self::Visibility { layer_id, .. } | Self::Opacity { layer_id, .. } => layer_id,
        }
    }
}

/// Host callbacks for panel notifications.
#[derive(Default)]
pub struct PanelCallbacks {
    /// Invoked when a layer is toggled
    pub on_layer_visibility_change: Option<VisibilityCallback>,
    /// Invoked when a layer opacity is edited
    pub on_layer_opacity_change: Option<OpacityCallback>,
}

impl fmt::Debug for PanelCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelCallbacks")
            .field(
                "on_layer_visibility_change",
                &self.on_layer_visibility_change.is_some(),
            )
            .field(
                "on_layer_opacity_change",
                &self.on_layer_opacity_change.is_some(),
            )
            .finish()
    }
}

/// One row of the layer panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelRow {
    /// Layer id
    pub id: String,
    /// Display name
    pub name: String,
    /// Human-readable risk level
    pub risk_label: &'static str,
    /// Risk hue
    pub color: RgbColor,
    /// Whether the layer is drawn
    pub visible: bool,
    /// Layer opacity
    pub opacity: f64,
    /// Number of monitoring points
    pub point_count: usize,
    /// Number of points above their design value
    pub exceeding_count: usize,
}

impl From<&RiskLayer> for PanelRow {
    fn from(layer: &RiskLayer) -> Self {
        Self {
            id: layer.id.clone(),
            name: layer.name.clone(),
            risk_label: risk_level_label(layer.risk_level),
            color: hue_for(layer.risk_level),
            visible: layer.visible,
            opacity: clamp_opacity(layer.opacity),
            point_count: layer.points.len(),
            exceeding_count: layer.exceeding_count(),
        }
    }
}

/// Builds panel rows in layer order.
#[must_use]
pub fn panel_rows(layers: &[RiskLayer]) -> Vec<PanelRow> {
    layers.iter().map(PanelRow::from).collect()
}

/// Panel state: open/closed plus the host notification callbacks.
#[derive(Debug)]
pub struct LayerPanel {
    callbacks: PanelCallbacks,
    open: bool,
}

impl Default for LayerPanel {
    fn default() -> Self {
        Self::new(PanelCallbacks::default())
    }
}

impl LayerPanel {
    /// Creates an open panel.
    #[must_use]
    pub const fn new(callbacks: PanelCallbacks) -> Self {
        Self {
            callbacks,
            open: true,
        }
    }

    /// Replaces the host callbacks.
    pub fn set_callbacks(&mut self, callbacks: PanelCallbacks) {
        self.callbacks = callbacks;
    }

    /// Whether the panel is expanded.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Expands or collapses the panel. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Requests the inverse visibility of `layer_id`.
    ///
    /// Returns `None` (and notifies nobody) when the id is not in `layers`.
    pub fn toggle_layer(&mut self, layers: &[RiskLayer], layer_id: &str) -> Option<PanelChange> {
        let Some(layer) = layers.iter().find(|l| l.id == layer_id) else {
            debug!(layer_id, "visibility toggle for unknown layer ignored");
            return None;
        };
        let visible = !layer.visible;
        debug!(layer_id, visible, "layer visibility requested");

        if let Some(notify) = self.callbacks.on_layer_visibility_change.as_mut() {
            notify(layer_id, visible);
        }
        Some(PanelChange::Visibility {
            layer_id: layer_id.to_string(),
            visible,
        })
    }

    /// Requests a new opacity for `layer_id`, clamped to `[0, 1]`.
    ///
    /// Returns `None` (and notifies nobody) when the id is not in `layers`.
    pub fn set_layer_opacity(
        &mut self,
        layers: &[RiskLayer],
        layer_id: &str,
        opacity: f64,
    ) -> Option<PanelChange> {
        if !layers.iter().any(|l| l.id == layer_id) {
            debug!(layer_id, "opacity change for unknown layer ignored");
            return None;
        }
        let opacity = clamp_opacity(opacity);
        debug!(layer_id, opacity, "layer opacity requested");

        if let Some(notify) = self.callbacks.on_layer_opacity_change.as_mut() {
            notify(layer_id, opacity);
        }
        Some(PanelChange::Opacity {
            layer_id: layer_id.to_string(),
            opacity,
        })
    }
}

/// Host-owned layer collection with id lookup and stable order.
#[derive(Debug, Clone, Default)]
pub struct LayerStore {
    layers: HashMap<String, RiskLayer>,
    order: Vec<String>,
}

impl LayerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a layer, replacing one with the same id in place.
    pub fn insert(&mut self, layer: RiskLayer) {
        if !self.layers.contains_key(&layer.id) {
            self.order.push(layer.id.clone());
        }
        self.layers.insert(layer.id.clone(), layer);
    }

    /// Looks up a layer by id.
    #[must_use]
    pub fn get(&self, layer_id: &str) -> Option<&RiskLayer> {
        self.layers.get(layer_id)
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the store holds no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Applies a panel change. Returns `false` for unknown layer ids.
    pub fn apply(&mut self, change: &PanelChange) -> bool {
        let Some(layer) = self.layers.get_mut(change.layer_id()) else {
            debug!(layer_id = change.layer_id(), "change for unknown layer ignored");
            return false;
        };
        match change {
            PanelChange::Visibility { visible, .. } => layer.visible = *visible,
            PanelChange::Opacity { opacity, .. } => layer.opacity = clamp_opacity(*opacity),
        }
        true
    }

    /// Layers in insertion order, ready to pass back to the map.
    #[must_use]
    pub fn layers(&self) -> Vec<RiskLayer> {
        self.order
            .iter()
            .filter_map(|id| self.layers.get(id))
            .cloned()
            .collect()
    }
}

impl FromIterator<RiskLayer> for LayerStore {
    fn from_iter<T: IntoIterator<Item = RiskLayer>>(iter: T) -> Self {
        let mut store = Self::new();
        for layer in iter {
            store.insert(layer);
        }
        store
    }
}
