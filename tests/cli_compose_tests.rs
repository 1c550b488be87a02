//! End-to-end tests for `riskgis compose` command.

use std::process::Command;
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

/// Command for the riskgis binary, isolated from the user's config.
fn riskgis(config_dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_riskgis"));
    command.env("RISKGIS_CONFIG_DIR", config_dir.path());
    command
}

#[test]
fn test_compose_sample_layers_json() {
    let config_dir = TempDir::new().unwrap();
    let (layers_path, _temp_dir) = create_temp_layer_file(&sample_layers());

    let output = riskgis(&config_dir)
        .args(["compose", layers_path.to_str().unwrap(), "--json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "Compose should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let result: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");
    assert_eq!(result["counts"]["outline"], 2);
    assert_eq!(result["counts"]["fill"], 2);
    assert_eq!(result["counts"]["point"], 4);
    assert_eq!(result["screen"]["width"], 800.0);

    let primitives = result["primitives"]["primitives"].as_array().unwrap();
    assert_eq!(primitives.len(), 8);
    assert!(primitives[4..].iter().all(|p| p["kind"] == "point"));
    assert_eq!(primitives[4]["backref"]["layer_id"], "DEF-001");
}

#[test]
fn test_compose_human_output_reports_bad_boundary() {
    let config_dir = TempDir::new().unwrap();
    let (layers_path, _temp_dir) = create_temp_layer_file(&sample_layers());

    let output = riskgis(&config_dir)
        .args(["compose", layers_path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Composed 3 layers (3 visible) into 800x600"));
    assert!(stdout.contains("OVS-001"));
    assert!(stdout.contains("boundary skipped"));
    // DEF-001 is level I at 0.7 opacity
    assert!(stdout.contains("rgba(255, 77, 79, 0.7)"));
}

#[test]
fn test_compose_hidden_layer() {
    let config_dir = TempDir::new().unwrap();
    let mut layers = sample_layers();
    layers[1].visible = false;
    let (layers_path, _temp_dir) = create_temp_layer_file(&layers);

    let output = riskgis(&config_dir)
        .args(["compose", layers_path.to_str().unwrap(), "--json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["counts"]["fill"], 1);
    assert_eq!(result["counts"]["point"], 2);
}

#[test]
fn test_compose_wrapped_document() {
    let config_dir = TempDir::new().unwrap();
    let (layers_path, _temp_dir) = create_temp_text_file(
        "wrapped.json",
        r#"{"layers": [{
            "id": "LOW-001",
            "name": "Low",
            "type": "deformation",
            "riskLevel": 4,
            "boundary": "POLYGON((87.6 43.7, 87.7 43.7, 87.7 43.8))",
            "points": []
        }]}"#,
    );

    let output = riskgis(&config_dir)
        .args(["compose", layers_path.to_str().unwrap(), "--json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["counts"]["outline"], 1);
    assert_eq!(result["counts"]["point"], 0);
}

#[test]
fn test_compose_missing_file() {
    let config_dir = TempDir::new().unwrap();

    let output = riskgis(&config_dir)
        .args(["compose", "/nonexistent/layers.json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2), "Missing file should exit with 2");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_compose_invalid_json() {
    let config_dir = TempDir::new().unwrap();
    let (layers_path, _temp_dir) = create_temp_text_file("broken.json", "{ not json");

    let output = riskgis(&config_dir)
        .args(["compose", layers_path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load layers"));
}

#[test]
fn test_compose_rejects_empty_viewport() {
    let config_dir = TempDir::new().unwrap();
    let (layers_path, _temp_dir) = create_temp_layer_file(&sample_layers());

    let output = riskgis(&config_dir)
        .args(["compose", layers_path.to_str().unwrap(), "--width", "0"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_compose_with_configured_extent() {
    let config_dir = TempDir::new().unwrap();
    let (layers_path, _temp_dir) = create_temp_layer_file(&sample_layers());
    let (config_path, _config_temp) = temp_config_with_extent();

    let output = riskgis(&config_dir)
        .args([
            "compose",
            layers_path.to_str().unwrap(),
            "--json",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["extent"]["min_lon"], 87.60);
    assert_eq!(result["extent"]["max_lat"], 43.80);
}
