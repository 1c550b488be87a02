//! Rendering surface abstraction and the map component that drives it.
//!
//! A [`RenderSurface`] is the drawing capability the map consumes: it accepts
//! a full render description, reports pointer and resize events to registered
//! handlers, and is released explicitly. [`RiskMap`] owns one surface for its
//! whole lifetime.

pub mod map;
pub mod recording;

use std::fmt;

use crate::models::{Composition, ScreenPoint, ScreenRect};
use crate::services::interaction::PointerKind;

pub use map::{MapCallbacks, RiskMap};
pub use recording::{RecordingContainer, RecordingSurface, SurfaceLog};

/// Event channels a surface can report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer press
    Click,
    /// Pointer movement
    Hover,
    /// Container size change
    Resize,
}

impl From<PointerKind> for EventKind {
    fn from(kind: PointerKind) -> Self {
        match kind {
            PointerKind::Click => Self::Click,
            PointerKind::Hover => Self::Hover,
        }
    }
}

/// Token identifying a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Event delivered to handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Pointer event, resolved by the surface to the primitive under it
    Pointer {
        /// Click or hover
        kind: PointerKind,
        /// Screen position
        position: ScreenPoint,
        /// Draw-order index of the topmost primitive hit, if any
        primitive: Option<usize>,
    },
    /// The container has a new size
    Resized(ScreenRect),
}

impl SurfaceEvent {
    /// Channel this event is delivered on.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Pointer { kind, .. } => (*kind).into(),
            Self::Resized(_) => EventKind::Resize,
        }
    }
}

/// Raw input fed into a surface by its host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceInput {
    /// Pointer event at a screen position
    Pointer {
        /// Click or hover
        kind: PointerKind,
        /// Screen position
        position: ScreenPoint,
    },
    /// The container was resized
    Resize(ScreenRect),
}

/// Boxed event handler.
pub type EventHandler = Box<dyn FnMut(&SurfaceEvent)>;

/// Drawing capability consumed by [`RiskMap`].
pub trait RenderSurface: Sized {
    /// What the surface is attached to (terminal area, test container, ...)
    type Container;

    /// Acquires a surface for the container.
    fn init(container: Self::Container) -> anyhow::Result<Self>;

    /// Pushes a render description. With `replace` the previous description
    /// is discarded instead of merged.
    fn set_option(&mut self, description: &Composition, replace: bool);

    /// Registers a handler for an event channel.
    fn on(&mut self, kind: EventKind, handler: EventHandler) -> HandlerId;

    /// Removes a handler. Unknown ids are ignored.
    fn off(&mut self, kind: EventKind, id: HandlerId);

    /// Re-measures the container; returns its size when known.
    fn resize(&mut self) -> Option<ScreenRect>;

    /// Releases the surface. No method may be called afterwards.
    fn dispose(&mut self);

    /// Feeds raw input; the surface resolves it and notifies handlers.
    fn emit(&mut self, input: SurfaceInput);

    /// Requests fullscreen display. Returns `false` when unsupported.
    fn request_fullscreen(&mut self) -> bool {
        false
    }
}

/// Handler bookkeeping shared by surface implementations.
#[derive(Default)]
pub struct HandlerRegistry {
    next_id: u64,
    handlers: Vec<(EventKind, HandlerId, EventHandler)>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("next_id", &self.next_id)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl HandlerRegistry {
    /// Adds a handler and returns its id.
    pub fn register(&mut self, kind: EventKind, handler: EventHandler) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((kind, id, handler));
        id
    }

    /// Removes a handler. Returns `false` if it was not registered.
    pub fn remove(&mut self, kind: EventKind, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(k, i, _)| !(*k == kind && *i == id));
        self.handlers.len() != before
    }

    /// Calls every handler registered for the event's channel, in
    /// registration order.
    pub fn dispatch(&mut self, event: &SurfaceEvent) {
        let kind = event.kind();
        for (_, _, handler) in self.handlers.iter_mut().filter(|(k, _, _)| *k == kind) {
            handler(event);
        }
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Drops every handler.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}
