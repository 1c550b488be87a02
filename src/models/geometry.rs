//! Geometric primitives shared by the parser, the viewport and the compositor.

use serde::{Deserialize, Serialize};

/// Ordered polygon ring parsed from WKT, in geographic `[lon, lat]` vertices.
///
/// # Validation
///
/// - A usable ring has at least 3 vertices
/// - An empty ring means "no boundary to draw"
/// - Closure (first == last) is preserved as given by the input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedRing {
    vertices: Vec<[f64; 2]>,
}

impl ParsedRing {
    /// Wraps an ordered vertex list.
    #[must_use]
    pub const fn new(vertices: Vec<[f64; 2]>) -> Self {
        Self { vertices }
    }

    /// The empty ring returned for unparsable input.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            vertices: Vec::new(),
        }
    }

    /// Whether the ring has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of vertices as given.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Vertices in input order.
    #[must_use]
    pub fn vertices(&self) -> &[[f64; 2]] {
        &self.vertices
    }

    /// Vertices with the first one repeated at the end if the input was open.
    #[must_use]
    pub fn closed(&self) -> Vec<[f64; 2]> {
        let mut out = self.vertices.clone();
        if let (Some(first), Some(last)) = (self.vertices.first(), self.vertices.last()) {
            if first != last {
                out.push(*first);
            }
        }
        out
    }

    /// Bounding box as `(min, max)` corners, or `None` for an empty ring.
    #[must_use]
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (
                [min[0].min(v[0]), min[1].min(v[1])],
                [max[0].max(v[0]), max[1].max(v[1])],
            )
        }))
    }
}

/// Position in screen space (x to the right, y downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
}

impl ScreenPoint {
    /// Creates a screen point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned screen rectangle the map is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width (positive)
    pub width: f64,
    /// Height (positive)
    pub height: f64,
}

impl ScreenRect {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Centre of the rectangle.
    #[must_use]
    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the rectangle has a finite, positive area to draw into.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Whether the point lies inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

impl Default for ScreenRect {
    /// 800x600 at the origin.
    fn default() -> Self {
        Self::new(0.0, 0.0, 800.0, 600.0)
    }
}
