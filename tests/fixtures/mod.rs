//! Shared test fixtures for integration and E2E CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use riskgis::config::Config;
use riskgis::models::{LayerType, RiskLayer, RiskPoint, ScreenRect};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Closed square boundary of the DEF-001 deformation zone.
pub const DEF_001_BOUNDARY: &str =
    "POLYGON ((87.61 43.78, 87.62 43.78, 87.62 43.79, 87.61 43.79, 87.61 43.78))";

/// Screen rectangle used by map tests.
pub const TEST_SCREEN: ScreenRect = ScreenRect::new(0.0, 0.0, 400.0, 400.0);

/// Level I deformation layer with one point inside its boundary.
pub fn deformation_layer() -> RiskLayer {
    RiskLayer::new("DEF-001", "Deformation-1", LayerType::Deformation, 1)
        .unwrap()
        .with_boundary(DEF_001_BOUNDARY)
        .with_point(RiskPoint::new(87.615, 43.785, 15.2).with_elevation(1320.0))
        .with_opacity(0.7)
}

/// Level II morphology layer: one point above and one below its design value.
pub fn morphology_layer() -> RiskLayer {
    RiskLayer::new("MOR-001", "Slope-1", LayerType::Morphology, 2)
        .unwrap()
        .with_boundary("POLYGON ((87.63 43.77, 87.65 43.77, 87.65 43.79, 87.63 43.79))")
        .with_point(RiskPoint::new(87.635, 43.775, 45.2).with_design_value(40.0))
        .with_point(RiskPoint::new(87.645, 43.785, 38.5).with_design_value(40.0))
}

/// Level III overstep layer whose boundary is not WKT.
pub fn malformed_layer() -> RiskLayer {
    RiskLayer::new("OVS-001", "Overstep-1", LayerType::Overstep, 3)
        .unwrap()
        .with_boundary("NOT A POLYGON")
        .with_point(RiskPoint::new(87.625, 43.795, 2.4))
}

/// The three layers above, in panel order.
pub fn sample_layers() -> Vec<RiskLayer> {
    vec![deformation_layer(), morphology_layer(), malformed_layer()]
}

/// Writes layers as a JSON array into a temp dir.
///
/// Returns the file path and the TempDir (which must be kept alive).
pub fn create_temp_layer_file(layers: &[RiskLayer]) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("layers.json");
    let json = serde_json::to_string_pretty(layers).expect("Failed to serialize layers");
    fs::write(&path, json).expect("Failed to write layer file");
    (path, temp_dir)
}

/// Writes raw text into a temp file.
pub fn create_temp_text_file(name: &str, content: &str) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(name);
    fs::write(&path, content).expect("Failed to write file");
    (path, temp_dir)
}

/// Writes a config file with a fixed extent covering the sample layers.
pub fn temp_config_with_extent() -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.toml");
    let mut config = Config::default();
    config.map.extent = Some(riskgis::config::ExtentConfig {
        min_lon: 87.60,
        min_lat: 43.76,
        max_lon: 87.66,
        max_lat: 43.80,
    });
    config.save_to(&path).expect("Failed to write config");
    (path, temp_dir)
}
