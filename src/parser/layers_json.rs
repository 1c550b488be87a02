//! Loading risk layer sets from JSON documents.
//!
//! The document is either a bare array of layers or an object with a
//! `layers` array, using the same camelCase keys as the dashboard data:
//!
//! ```json
//! [{
//!   "id": "DEF-001",
//!   "name": "Deformation-1",
//!   "type": "deformation",
//!   "riskLevel": 1,
//!   "boundary": "POLYGON ((87.61 43.78, 87.62 43.78, 87.62 43.79))",
//!   "points": [{"coordinates": [87.615, 43.785], "value": 15.2}],
//!   "visible": true,
//!   "opacity": 0.7
//! }]
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use crate::constants::APP_BINARY_NAME;
use crate::models::RiskLayer;

/// Reads and validates a layer file.
///
/// # Errors
///
/// Returns errors for:
/// - File not found or not a regular file
/// - Invalid JSON or unknown layer `type`
/// - Empty or duplicate layer ids
pub fn load_layers(path: &Path) -> Result<Vec<RiskLayer>> {
    if !path.exists() {
        anyhow::bail!(
            "Layer file not found: {}\n\n\
             Please check the file path and try again.\n\
             Example: {} compose layers.json",
            path.display(),
            APP_BINARY_NAME
        );
    }

    if !path.is_file() {
        anyhow::bail!(
            "Path is not a file: {}\n\n\
            Please provide a path to a JSON layer file.",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read layer file: {}", path.display()))?;

    parse_layers_str(&content)
        .with_context(|| format!("Failed to parse layer file: {}", path.display()))
}

/// Parses a layer document from a string.
pub fn parse_layers_str(content: &str) -> Result<Vec<RiskLayer>> {
    let document: Value = serde_json::from_str(content).context("Invalid layer JSON")?;
    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove("layers") {
            Some(Value::Array(entries)) => entries,
            Some(_) => anyhow::bail!("'layers' must be an array"),
            None => anyhow::bail!("Expected an array of layers or an object with a 'layers' array"),
        },
        _ => anyhow::bail!("Expected an array of layers or an object with a 'layers' array"),
    };

    let layers = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let id = entry
                .get("id")
                .and_then(Value::as_str)
                .map_or_else(|| format!("#{index}"), |id| format!("'{id}'"));
            serde_json::from_value::<RiskLayer>(entry)
                .with_context(|| format!("Invalid layer {id} at index {index}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for layer in &layers {
        if layer.id.trim().is_empty() {
            anyhow::bail!("Layer '{}' has an empty id", layer.name);
        }
        if !seen.insert(layer.id.as_str()) {
            anyhow::bail!("Duplicate layer id '{}'", layer.id);
        }
    }

    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LayerType, RiskLevel};

    #[test]
    fn test_parse_bare_array() {
        let layers = parse_layers_str(
            r#"[{"id": "A", "name": "A", "type": "overstep", "riskLevel": 3}]"#,
        )
        .unwrap();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].layer_type, LayerType::Overstep);
    }

    #[test]
    fn test_parse_wrapped_object() {
        let layers = parse_layers_str(
            r#"{"layers": [{"id": "A", "name": "A", "type": "overstep", "riskLevel": 3}]}"#,
        )
        .unwrap();
        assert_eq!(layers[0].id, "A");
    }

    #[test]
    fn test_parse_empty_is_valid() {
        assert!(parse_layers_str("[]").unwrap().is_empty());
    }

    #[test]
    fn test_reject_duplicate_ids() {
        let err = parse_layers_str(
            r#"[
                {"id": "A", "name": "One", "type": "overstep", "riskLevel": 3},
                {"id": "A", "name": "Two", "type": "overstep", "riskLevel": 3}
            ]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate layer id 'A'"));
    }

    #[test]
    fn test_reject_unknown_type_names_layer() {
        let err = parse_layers_str(
            r#"[
                {"id": "A", "name": "A", "type": "overstep", "riskLevel": 3},
                {"id": "B", "name": "B", "type": "seismic", "riskLevel": 3}
            ]"#,
        )
        .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Invalid layer 'B' at index 1"));
        assert!(message.contains("seismic"));
    }

    #[test]
    fn test_out_of_range_risk_level_is_tolerated() {
        let layers = parse_layers_str(
            r#"[
                {"id": "A", "name": "A", "type": "deformation", "riskLevel": 300},
                {"id": "B", "name": "B", "type": "deformation", "riskLevel": 1},
                {"id": "C", "name": "C", "type": "overstep", "riskLevel": -1}
            ]"#,
        )
        .unwrap();
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[0].risk_level, 300);
        assert_eq!(layers[0].level(), None);
        assert_eq!(layers[1].level(), Some(RiskLevel::Major));
        assert_eq!(layers[2].risk_level, -1);
    }

    #[test]
    fn test_reject_malformed_document_shape() {
        let err = parse_layers_str(r#"{"items": []}"#).unwrap_err();
        assert!(err.to_string().contains("'layers' array"));

        let err = parse_layers_str(r#"{"layers": {}}"#).unwrap_err();
        assert!(err.to_string().contains("must be an array"));

        assert!(parse_layers_str("42").is_err());
    }

    #[test]
    fn test_missing_field_error_has_index() {
        let err = parse_layers_str(r#"[{"name": "A", "type": "overstep", "riskLevel": 3}]"#)
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Invalid layer #0 at index 0"));
        assert!(message.contains("id"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_layers(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("Layer file not found"));
    }
}
