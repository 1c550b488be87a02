//! Geographic to screen coordinate mapping with pan and zoom.
//!
//! The mapping is linear on both axes (no projection), which is adequate at
//! the scale of a single mine site. Latitude grows upwards while screen y
//! grows downwards. Zoom and pan are transient view state layered on top of
//! the base mapping; they never touch layer data.

use serde::Serialize;
use tracing::debug;

use crate::config::{ExtentConfig, MapConfig};
use crate::models::{RiskLayer, ScreenPoint, ScreenRect};
use crate::parser::parse_wkt_strict;

/// Half-width in degrees used to widen a degenerate (zero-span) extent.
const MIN_HALF_SPAN: f64 = 1e-3;

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoExtent {
    /// Western edge
    pub min_lon: f64,
    /// Southern edge
    pub min_lat: f64,
    /// Eastern edge
    pub max_lon: f64,
    /// Northern edge
    pub max_lat: f64,
}

impl GeoExtent {
    /// Creates an extent, widening zero or inverted spans around their centre.
    #[must_use]
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        let (min_lon, max_lon) = widen(min_lon, max_lon);
        let (min_lat, max_lat) = widen(min_lat, max_lat);
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Longitude span.
    #[must_use]
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Latitude span.
    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Grows the extent by `ratio` of its span on every side.
    #[must_use]
    pub fn padded(&self, ratio: f64) -> Self {
        let dx = self.lon_span() * ratio;
        let dy = self.lat_span() * ratio;
        Self::new(
            self.min_lon - dx,
            self.min_lat - dy,
            self.max_lon + dx,
            self.max_lat + dy,
        )
    }

    /// Fits the extent to every boundary vertex and point of the layers.
    ///
    /// Hidden layers are included so that toggling visibility does not move
    /// the map. Returns `None` when the layers carry no usable coordinates.
    #[must_use]
    pub fn from_layers(layers: &[RiskLayer], padding_ratio: f64) -> Option<Self> {
        let mut coords: Vec<[f64; 2]> = Vec::new();
        for layer in layers {
            if let Some(ring) = layer.boundary.as_deref().and_then(|w| parse_wkt_strict(w).ok()) {
                coords.extend_from_slice(ring.vertices());
            }
            coords.extend(layer.points.iter().map(|p| p.coordinates));
        }

        let mut finite = coords.into_iter().filter(|c| c[0].is_finite() && c[1].is_finite());
        let first = finite.next()?;
        let (min, max) = finite.fold((first, first), |(min, max), c| {
            (
                [min[0].min(c[0]), min[1].min(c[1])],
                [max[0].max(c[0]), max[1].max(c[1])],
            )
        });

        Some(Self::new(min[0], min[1], max[0], max[1]).padded(padding_ratio.max(0.0)))
    }

    /// Whether the coordinate lies inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&lon) && (self.min_lat..=self.max_lat).contains(&lat)
    }
}

impl From<ExtentConfig> for GeoExtent {
    fn from(config: ExtentConfig) -> Self {
        Self::new(config.min_lon, config.min_lat, config.max_lon, config.max_lat)
    }
}

impl Default for GeoExtent {
    /// Whole-world extent, used when there is nothing to fit.
    fn default() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }
}

fn widen(min: f64, max: f64) -> (f64, f64) {
    if max - min > 0.0 {
        (min, max)
    } else {
        let centre = (min + max) / 2.0;
        (centre - MIN_HALF_SPAN, centre + MIN_HALF_SPAN)
    }
}

/// Current view: extent, target rectangle, zoom and pan.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    extent: GeoExtent,
    screen: ScreenRect,
    zoom: f64,
    pan: ScreenPoint,
    min_zoom: f64,
    max_zoom: f64,
    zoom_step: f64,
}

impl Viewport {
    /// Creates an unzoomed viewport with default zoom limits.
    #[must_use]
    pub fn new(extent: GeoExtent, screen: ScreenRect) -> Self {
        Self::with_config(extent, screen, &MapConfig::default())
    }

    /// Creates an unzoomed viewport using the configured zoom limits.
    #[must_use]
    pub fn with_config(extent: GeoExtent, screen: ScreenRect, config: &MapConfig) -> Self {
        Self {
            extent,
            screen,
            zoom: 1.0,
            pan: ScreenPoint::default(),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom.max(config.min_zoom),
            zoom_step: config.zoom_step,
        }
    }

    /// Builds a viewport for a layer set: the configured extent if any,
    /// otherwise one fitted to the layers.
    #[must_use]
    pub fn for_layers(layers: &[RiskLayer], screen: ScreenRect, config: &MapConfig) -> Self {
        let extent = config
            .extent
            .map(GeoExtent::from)
            .or_else(|| GeoExtent::from_layers(layers, config.padding_ratio))
            .unwrap_or_default();
        Self::with_config(extent, screen, config)
    }

    /// Geographic extent.
    #[must_use]
    pub const fn extent(&self) -> GeoExtent {
        self.extent
    }

    /// Target screen rectangle.
    #[must_use]
    pub const fn screen(&self) -> ScreenRect {
        self.screen
    }

    /// Current zoom factor (1.0 = whole extent).
    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current pan offset in screen units.
    #[must_use]
    pub const fn pan(&self) -> ScreenPoint {
        self.pan
    }

    /// Maps `[lon, lat]` to screen space.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskgis::models::{ScreenPoint, ScreenRect};
    /// use riskgis::services::viewport::{GeoExtent, Viewport};
    ///
    /// let viewport = Viewport::new(
    ///     GeoExtent::new(0.0, 0.0, 10.0, 10.0),
    ///     ScreenRect::new(0.0, 0.0, 100.0, 100.0),
    /// );
    /// assert_eq!(viewport.project([0.0, 10.0]), ScreenPoint::new(0.0, 0.0));
    /// assert_eq!(viewport.project([5.0, 5.0]), ScreenPoint::new(50.0, 50.0));
    /// ```
    #[must_use]
    pub fn project(&self, coordinates: [f64; 2]) -> ScreenPoint {
        let [lon, lat] = coordinates;
        let base_x =
            self.screen.x + (lon - self.extent.min_lon) / self.extent.lon_span() * self.screen.width;
        let base_y = self.screen.y
            + (self.extent.max_lat - lat) / self.extent.lat_span() * self.screen.height;

        let centre = self.screen.center();
        ScreenPoint::new(
            centre.x + (base_x - centre.x) * self.zoom + self.pan.x,
            centre.y + (base_y - centre.y) * self.zoom + self.pan.y,
        )
    }

    /// Maps a screen position back to `[lon, lat]`.
    #[must_use]
    pub fn unproject(&self, point: ScreenPoint) -> [f64; 2] {
        let centre = self.screen.center();
        let base_x = (point.x - self.pan.x - centre.x) / self.zoom + centre.x;
        let base_y = (point.y - self.pan.y - centre.y) / self.zoom + centre.y;

        let lon = self.extent.min_lon + (base_x - self.screen.x) / self.screen.width * self.extent.lon_span();
        let lat = self.extent.max_lat - (base_y - self.screen.y) / self.screen.height * self.extent.lat_span();
        [lon, lat]
    }

    /// Multiplies the zoom by `factor`, keeping the geographic point under
    /// `anchor` fixed on screen. The result is clamped to the zoom limits.
    pub fn zoom_at(&mut self, factor: f64, anchor: ScreenPoint) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let geo = self.unproject(anchor);
        if !(geo[0].is_finite() && geo[1].is_finite()) {
            debug!(?anchor, "zoom ignored: anchor does not map to a coordinate");
            return;
        }
        let zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        let previous = self.zoom;
        self.zoom = zoom;
        let moved = self.project(geo);
        let pan = ScreenPoint::new(self.pan.x + anchor.x - moved.x, self.pan.y + anchor.y - moved.y);
        if !(pan.x.is_finite() && pan.y.is_finite()) {
            self.zoom = previous;
            debug!(?anchor, "zoom ignored: non-finite pan");
            return;
        }
        self.pan = pan;
        debug!(zoom = self.zoom, "viewport zoomed");
    }

    /// Zooms in one step around the screen centre.
    pub fn zoom_in(&mut self) {
        self.zoom_at(self.zoom_step, self.screen.center());
    }

    /// Zooms out one step around the screen centre.
    pub fn zoom_out(&mut self) {
        self.zoom_at(1.0 / self.zoom_step, self.screen.center());
    }

    /// Shifts the view by a screen-space offset.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.pan.x += dx;
            self.pan.y += dy;
        }
    }

    /// Restores zoom 1 and no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = ScreenPoint::default();
    }

    /// Replaces the target rectangle, keeping zoom and pan.
    ///
    /// Rectangles without a drawable area (a minimised or detached
    /// container) are ignored and the previous size is kept. Returns whether
    /// the size was applied.
    pub fn resize(&mut self, screen: ScreenRect) -> bool {
        if !screen.is_drawable() {
            debug!(
                width = screen.width,
                height = screen.height,
                "resize ignored: empty screen"
            );
            return false;
        }
        self.screen = screen;
        true
    }

    /// Replaces the geographic extent, keeping zoom and pan.
    pub fn set_extent(&mut self, extent: GeoExtent) {
        self.extent = extent;
    }
}
