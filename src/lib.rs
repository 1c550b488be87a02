//! RiskGIS Library
//!
//! This library provides the map engine behind the RiskGIS tools: parsing WKT
//! risk boundaries, styling layers by risk level, composing render
//! primitives, resolving pointer events back to monitoring points, and
//! driving a rendering surface.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod models;
pub mod parser;
pub mod services;
pub mod surface;
#[cfg(feature = "ratatui")]
pub mod tui;
