//! In-memory surface that records every call.
//!
//! Used by the headless CLI commands and by tests. The call log is shared
//! through an `Rc` so it stays readable after the owning map is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::models::{Composition, ScreenRect};
use crate::services::interaction::hit_test;

use super::{EventHandler, EventKind, HandlerId, HandlerRegistry, RenderSurface, SurfaceEvent, SurfaceInput};

/// Everything a [`RecordingSurface`] was asked to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceLog {
    /// `replace` flag of every `set_option` call, in order
    pub set_option_calls: Vec<bool>,
    /// Last description pushed
    pub last_description: Option<Composition>,
    /// Number of `on` calls
    pub handlers_registered: usize,
    /// Number of `off` calls that removed a handler
    pub handlers_removed: usize,
    /// Number of `dispose` calls
    pub dispose_calls: usize,
    /// Number of `request_fullscreen` calls
    pub fullscreen_requests: usize,
}

/// Container for a [`RecordingSurface`].
#[derive(Debug, Clone)]
pub struct RecordingContainer {
    /// Size reported by `resize()`
    pub size: ScreenRect,
    /// Extra hit radius around markers
    pub hit_tolerance: f64,
    /// Whether `request_fullscreen` succeeds
    pub fullscreen: bool,
    /// Shared call log
    pub log: Rc<RefCell<SurfaceLog>>,
}

impl Default for RecordingContainer {
    fn default() -> Self {
        Self::new(ScreenRect::default())
    }
}

impl RecordingContainer {
    /// Container of the given size with a fresh log.
    #[must_use]
    pub fn new(size: ScreenRect) -> Self {
        Self {
            size,
            hit_tolerance: 0.0,
            fullscreen: false,
            log: Rc::default(),
        }
    }

    /// Sets the hit tolerance.
    #[must_use]
    pub const fn with_hit_tolerance(mut self, hit_tolerance: f64) -> Self {
        self.hit_tolerance = hit_tolerance;
        self
    }

    /// Makes fullscreen requests succeed.
    #[must_use]
    pub const fn with_fullscreen(mut self) -> Self {
        self.fullscreen = true;
        self
    }
}

/// Surface that keeps the current description in memory.
#[derive(Debug)]
pub struct RecordingSurface {
    size: ScreenRect,
    hit_tolerance: f64,
    fullscreen: bool,
    description: Composition,
    handlers: HandlerRegistry,
    log: Rc<RefCell<SurfaceLog>>,
}

impl RecordingSurface {
    /// Current render description.
    #[must_use]
    pub const fn description(&self) -> &Composition {
        &self.description
    }

    /// Shared call log.
    #[must_use]
    pub fn log(&self) -> Rc<RefCell<SurfaceLog>> {
        Rc::clone(&self.log)
    }

    /// Number of live handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl RenderSurface for RecordingSurface {
    type Container = RecordingContainer;

    fn init(container: Self::Container) -> anyhow::Result<Self> {
        if !container.size.is_drawable() {
            anyhow::bail!(
                "Container has no drawable area ({}x{})",
                container.size.width,
                container.size.height
            );
        }
        Ok(Self {
            size: container.size,
            hit_tolerance: container.hit_tolerance,
            fullscreen: container.fullscreen,
            description: Composition::default(),
            handlers: HandlerRegistry::default(),
            log: container.log,
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
        let mut log = self.log.borrow_mut();
        log.set_option_calls.push(replace);
        log.last_description = Some(self.description.clone());
    }

    fn on(&mut self, kind: EventKind, handler: EventHandler) -> HandlerId {
        self.log.borrow_mut().handlers_registered += 1;
        self.handlers.register(kind, handler)
    }

    fn off(&mut self, kind: EventKind, id: HandlerId) {
        if self.handlers.remove(kind, id) {
            self.log.borrow_mut().handlers_removed += 1;
        }
    }

    fn resize(&mut self) -> Option<ScreenRect> {
        Some(self.size)
    }

    fn dispose(&mut self) {
        self.handlers.clear();
        self.description = Composition::default();
        self.log.borrow_mut().dispose_calls += 1;
    }

    fn emit(&mut self, input: SurfaceInput) {
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
        debug!(?event, "surface event");
        self.handlers.dispatch(&event);
    }

    fn request_fullscreen(&mut self) -> bool {
        self.log.borrow_mut().fullscreen_requests += 1;
        self.fullscreen
    }
}
