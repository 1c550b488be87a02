//! Parsing of external text formats.
//!
//! This module handles WKT polygon boundaries and JSON layer documents.

pub mod layers_json;
pub mod wkt;

// Re-export commonly used functions
pub use layers_json::{load_layers, parse_layers_str};
pub use wkt::{parse_wkt, parse_wkt_strict, WktError};
