//! CLI command handlers for RiskGIS.
//!
//! This module provides headless, scriptable access to the map engine for
//! automation, testing, and CI/CD integration.

pub mod common;
pub mod compose;
pub mod config;
pub mod pick;
#[cfg(feature = "ratatui")]
pub mod view;
pub mod wkt;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use compose::ComposeArgs;
pub use config::ConfigArgs;
pub use pick::PickArgs;
#[cfg(feature = "ratatui")]
pub use view::ViewArgs;
pub use wkt::WktArgs;
