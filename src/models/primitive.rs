//! Render primitives produced by the compositor.
//!
//! Primitives are ephemeral: a new [`Composition`] is built on every pass and
//! handed to the rendering surface as its render description.

use serde::{Deserialize, Serialize};

use super::{RiskLayer, RiskPoint, Rgba, ScreenPoint};

/// Reference from a point primitive back to the domain objects it was built from.
///
/// Indices refer to the layer slice that was composed. The layer id is kept so
/// that a stale backref resolved against a different layer array fails instead
/// of pointing at the wrong layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Backref {
    /// Index of the layer in the composed slice
    pub layer_index: usize,
    /// Id of that layer
    pub layer_id: String,
    /// Index of the point within the layer
    pub point_index: usize,
}

impl Backref {
    /// Resolves the backref to `(point, layer)`.
    #[must_use]
    pub fn resolve<'a>(&self, layers: &'a [RiskLayer]) -> Option<(&'a RiskPoint, &'a RiskLayer)> {
        let layer = layers.get(self.layer_index)?;
        if layer.id != self.layer_id {
            return None;
        }
        let point = layer.points.get(self.point_index)?;
        Some((point, layer))
    }
}

/// Discriminant of a [`RenderPrimitive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// Closed polygon stroke
    Outline,
    /// Polygon interior
    Fill,
    /// Monitoring point marker
    Point,
}

/// A single drawable element in screen space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderPrimitive {
    /// Boundary stroke; the ring is closed (last vertex equals the first)
    Outline {
        /// Screen-space vertices
        ring: Vec<ScreenPoint>,
        /// Stroke color
        color: Rgba,
    },
    /// Boundary interior
    Fill {
        /// Screen-space vertices
        ring: Vec<ScreenPoint>,
        /// Fill color
        color: Rgba,
    },
    /// Point marker
    Point {
        /// Screen-space centre
        position: ScreenPoint,
        /// Marker color
        color: Rgba,
        /// Marker diameter in screen units
        size: f64,
        /// Originating point and layer
        backref: Backref,
    },
}

impl RenderPrimitive {
    /// Kind of this primitive.
    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Outline { .. } => PrimitiveKind::Outline,
            Self::Fill { .. } => PrimitiveKind::Fill,
            Self::Point { .. } => PrimitiveKind::Point,
        }
    }

    /// Silent primitives never receive pointer events.
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        !matches!(self, Self::Point { .. })
    }

    /// Backref of a point primitive.
    #[must_use]
    pub const fn backref(&self) -> Option<&Backref> {
        match self {
            Self::Point { backref, .. } => Some(backref),
            _ => None,
        }
    }

    /// Color of the primitive.
    #[must_use]
    pub const fn color(&self) -> Rgba {
        match self {
            Self::Outline { color, .. } | Self::Fill { color, .. } | Self::Point { color, .. } => {
                *color
            }
        }
    }
}

/// Ordered render description: polygons first, then points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    /// Primitives in draw order
    pub primitives: Vec<RenderPrimitive>,
}

impl Composition {
    /// Creates a composition from primitives already in draw order.
    #[must_use]
    pub const fn new(primitives: Vec<RenderPrimitive>) -> Self {
        Self { primitives }
    }

    /// Whether nothing will be drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Total number of primitives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Number of primitives of the given kind.
    #[must_use]
    pub fn count(&self, kind: PrimitiveKind) -> usize {
        self.primitives.iter().filter(|p| p.kind() == kind).count()
    }

    /// Primitive at a draw-order index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RenderPrimitive> {
        self.primitives.get(index)
    }

    /// Point primitives with their draw-order index.
    pub fn points(&self) -> impl Iterator<Item = (usize, &RenderPrimitive)> {
        self.primitives
            .iter()
            .enumerate()
            .filter(|(_, p)| p.kind() == PrimitiveKind::Point)
    }

    /// Whether any point primitive refers to the layer with this id.
    ///
    /// Polygon primitives carry no backref; they are attributed by color only.
    #[must_use]
    pub fn references_layer(&self, layer_id: &str) -> bool {
        self.primitives
            .iter()
            .filter_map(RenderPrimitive::backref)
            .any(|b| b.layer_id == layer_id)
    }
}
