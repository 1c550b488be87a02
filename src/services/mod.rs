//! Service layer for map logic.
//!
//! This module contains the pure logic of the engine: styling, coordinate
//! mapping, composition, interaction and panel synchronization. Nothing here
//! touches a rendering surface directly.

pub mod compositor;
pub mod interaction;
pub mod panel;
pub mod symbology;
pub mod viewport;

// Re-export commonly used types and functions
pub use compositor::{compose, compose_with};
pub use interaction::{hit_test, InteractionController, PointCallbacks, PointerKind, Tooltip};
pub use panel::{panel_rows, LayerPanel, LayerStore, PanelCallbacks, PanelChange, PanelRow};
pub use symbology::{color_for, legend, size_for, Symbology};
pub use viewport::{GeoExtent, Viewport};
