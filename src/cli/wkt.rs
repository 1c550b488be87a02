//! WKT command: check a polygon string.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::models::ParsedRing;
use crate::parser::parse_wkt_strict;
use clap::Args;
use serde::Serialize;

/// Parse a WKT polygon and report its ring
#[derive(Debug, Clone, Args)]
pub struct WktArgs {
    /// WKT text, e.g. "POLYGON ((87.61 43.78, 87.62 43.78, 87.62 43.79))"
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON response for wkt
#[derive(Debug, Serialize)]
struct WktResponse<'a> {
    valid: bool,
    vertices: usize,
    closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<[f64; 4]>,
    ring: &'a ParsedRing,
}

impl WktArgs {
    /// Execute the wkt command
    pub fn execute(&self) -> CliResult<()> {
        let ring = parse_wkt_strict(&self.text)
            .map_err(|e| CliError::validation(format!("Invalid WKT polygon: {e}")))?;

        let vertices = ring.vertices();
        let closed = vertices.first() == vertices.last();
        let bounds = ring
            .bounds()
            .map(|(min, max)| [min[0], min[1], max[0], max[1]]);

        if self.json {
            print_json(&WktResponse {
                valid: true,
                vertices: ring.len(),
                closed,
                bounds,
                ring: &ring,
            })?;
        } else {
            println!("✓ Valid polygon: {} vertices", ring.len());
            println!("  Closed: {}", if closed { "yes" } else { "no" });
            if let Some([min_lon, min_lat, max_lon, max_lat]) = bounds {
                println!("  Bounds: lon {min_lon}..{max_lon}, lat {min_lat}..{max_lat}");
            }
        }

        Ok(())
    }
}
