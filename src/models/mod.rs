//! Data models for risk layers, geometry, colors and render primitives.
//!
//! This module contains the core data structures used throughout the crate.
//! Models are independent of rendering and of any particular host.

pub mod geometry;
pub mod layer;
pub mod primitive;
pub mod rgb;

// Re-export all model types
pub use geometry::{ParsedRing, ScreenPoint, ScreenRect};
pub use layer::{risk_level_label, LayerType, RiskLayer, RiskLevel, RiskPoint};
pub use primitive::{Backref, Composition, PrimitiveKind, RenderPrimitive};
pub use rgb::{RgbColor, Rgba};
