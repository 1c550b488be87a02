//! Terminal rendering surface backed by a ratatui braille canvas.
//!
//! One screen unit is one braille dot: a terminal cell is 2 units wide and
//! 4 units tall. Fills are drawn as a dot grid clipped to the ring; outlines
//! as line segments; markers as circles. Colors are blended over the black
//! map background since the terminal has no alpha.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine, Points},
        Widget,
    },
};
use tracing::debug;

use crate::models::{Composition, RenderPrimitive, Rgba, ScreenPoint, ScreenRect};
use crate::services::interaction::hit_test;
use crate::surface::{
    EventHandler, EventKind, HandlerId, HandlerRegistry, RenderSurface, SurfaceEvent, SurfaceInput,
};

use super::theme::MAP_BACKGROUND;

/// Horizontal screen units per terminal cell.
pub const UNITS_PER_COL: u16 = 2;
/// Vertical screen units per terminal cell.
pub const UNITS_PER_ROW: u16 = 4;

/// Spacing of the fill dot grid in screen units.
const FILL_STEP: f64 = 2.0;

/// Screen rectangle covered by a terminal area.
#[must_use]
pub fn screen_rect_for(area: Rect) -> ScreenRect {
    ScreenRect::new(
        0.0,
        0.0,
        f64::from(area.width) * f64::from(UNITS_PER_COL),
        f64::from(area.height) * f64::from(UNITS_PER_ROW),
    )
}

/// Maps a terminal cell to the screen position at its centre.
///
/// Returns `None` for cells outside `area`.
#[must_use]
pub fn cell_to_screen(area: Rect, column: u16, row: u16) -> Option<ScreenPoint> {
    if column < area.x || row < area.y || column >= area.right() || row >= area.bottom() {
        return None;
    }
    Some(ScreenPoint::new(
        (f64::from(column - area.x) + 0.5) * f64::from(UNITS_PER_COL),
        (f64::from(row - area.y) + 0.5) * f64::from(UNITS_PER_ROW),
    ))
}

/// Even-odd point-in-polygon test.
#[must_use]
pub fn ring_contains(ring: &[ScreenPoint], p: ScreenPoint) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for (i, a) in ring.iter().enumerate() {
        let b = ring[j];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Container for a [`CanvasSurface`].
#[derive(Debug, Clone, Copy)]
pub struct CanvasContainer {
    /// Terminal area (inside any border) the map occupies
    pub area: Rect,
    /// Extra hit radius around markers, in screen units
    pub hit_tolerance: f64,
}

/// Surface that draws the current description on a ratatui canvas.
#[derive(Debug)]
pub struct CanvasSurface {
    size: ScreenRect,
    hit_tolerance: f64,
    description: Composition,
    handlers: HandlerRegistry,
    disposed: bool,
}

impl CanvasSurface {
    /// Current render description.
    #[must_use]
    pub const fn description(&self) -> &Composition {
        &self.description
    }

    /// Size in screen units.
    #[must_use]
    pub const fn size(&self) -> ScreenRect {
        self.size
    }
}

impl RenderSurface for CanvasSurface {
    type Container = CanvasContainer;

    fn init(container: Self::Container) -> anyhow::Result<Self> {
        if container.area.is_empty() {
            anyhow::bail!("Terminal too small to draw the map");
        }
        Ok(Self {
            size: screen_rect_for(container.area),
            hit_tolerance: container.hit_tolerance,
            description: Composition::default(),
            handlers: HandlerRegistry::default(),
            disposed: false,
        })
    }

    fn set_option(&mut self, description: &Composition, replace: bool) {
        if replace {
            self.description = description.clone();
        } else {
            self.description
                .primitives
                .extend(description.primitives.iter().cloned());
        }
    }

    fn on(&mut self, kind: EventKind, handler: EventHandler) -> HandlerId {
        self.handlers.register(kind, handler)
    }

    fn off(&mut self, kind: EventKind, id: HandlerId) {
        self.handlers.remove(kind, id);
    }

    fn resize(&mut self) -> Option<ScreenRect> {
        Some(self.size)
    }

    fn dispose(&mut self) {
        self.handlers.clear();
        self.description = Composition::default();
        self.disposed = true;
    }

    fn emit(&mut self, input: SurfaceInput) {
        if self.disposed {
            return;
        }
        let event = match input {
            SurfaceInput::Pointer { kind, position } => SurfaceEvent::Pointer {
                kind,
                position,
                primitive: hit_test(&self.description, position, self.hit_tolerance),
            },
            SurfaceInput::Resize(size) => {
                self.size = size;
                SurfaceEvent::Resized(size)
            }
        };
        debug!(?event, "terminal surface event");
        self.handlers.dispatch(&event);
    }
}

fn blend(color: Rgba) -> ratatui::style::Color {
    color.over(MAP_BACKGROUND).to_ratatui_color()
}

/// Dots inside the ring, clipped to the visible screen, in canvas coordinates.
fn fill_dots(ring: &[ScreenPoint], width: f64, height: f64) -> Vec<(f64, f64)> {
    let Some((min_x, min_y, max_x, max_y)) = ring.iter().fold(None, |acc, p| {
        let (x0, y0, x1, y1) = acc.unwrap_or((p.x, p.y, p.x, p.y));
        Some((x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)))
    }) else {
        return Vec::new();
    };
    if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
        return Vec::new();
    }
    let (min_x, max_x) = (min_x.max(0.0), max_x.min(width));
    let (min_y, max_y) = (min_y.max(0.0), max_y.min(height));

    let mut dots = Vec::new();
    let mut y = (min_y / FILL_STEP).floor() * FILL_STEP;
    while y <= max_y {
        let mut x = (min_x / FILL_STEP).floor() * FILL_STEP;
        while x <= max_x {
            if ring_contains(ring, ScreenPoint::new(x, y)) {
                dots.push((x, height - y));
            }
            x += FILL_STEP;
        }
        y += FILL_STEP;
    }
    dots
}

impl Widget for &CanvasSurface {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = self.size.width;
        let height = self.size.height;

        Canvas::default()
            .marker(Marker::Braille)
            .background_color(MAP_BACKGROUND.to_ratatui_color())
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                for primitive in &self.description.primitives {
                    match primitive {
                        RenderPrimitive::Fill { ring, color } => {
                            let dots = fill_dots(ring, width, height);
                            ctx.draw(&Points {
                                coords: &dots,
                                color: blend(*color),
                            });
                        }
                        RenderPrimitive::Outline { ring, color } => {
                            for edge in ring.windows(2) {
                                ctx.draw(&CanvasLine::new(
                                    edge[0].x,
                                    height - edge[0].y,
                                    edge[1].x,
                                    height - edge[1].y,
                                    blend(*color),
                                ));
                            }
                        }
                        RenderPrimitive::Point {
                            position,
                            color,
                            size,
                            ..
                        } => {
                            ctx.draw(&Circle {
                                x: position.x,
                                y: height - position.y,
                                radius: size / 2.0,
                                color: blend(*color),
                            });
                        }
                    }
                    // Keep later primitives on top of earlier ones
                    ctx.layer();
                }
            })
            .render(area, buf);
    }
}
