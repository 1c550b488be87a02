//! End-to-end composition scenarios through the public library API.

use riskgis::config::MapConfig;
use riskgis::models::{PrimitiveKind, RenderPrimitive, RiskLayer};
use riskgis::parser::{parse_layers_str, parse_wkt};
use riskgis::services::compositor::compose;
use riskgis::services::interaction::{hit_test, resolve, Tooltip};
use riskgis::services::symbology::{
    BASE_POINT_SIZE, EXCEEDING_POINT_SIZE, HIGH_COLOR, MAJOR_COLOR, MODERATE_COLOR,
    NEUTRAL_COLOR,
};
use riskgis::services::viewport::Viewport;

mod fixtures;
use fixtures::*;

fn viewport_for(layers: &[RiskLayer]) -> Viewport {
    Viewport::for_layers(layers, TEST_SCREEN, &MapConfig::default())
}

#[test]
fn test_deformation_layer_end_to_end() {
    let layers = vec![deformation_layer()];
    let viewport = viewport_for(&layers);
    let composition = compose(&layers, &viewport);

    assert_eq!(composition.count(PrimitiveKind::Outline), 1);
    assert_eq!(composition.count(PrimitiveKind::Fill), 1);
    assert_eq!(composition.count(PrimitiveKind::Point), 1);

    for primitive in &composition.primitives {
        assert_eq!(primitive.color().rgb, MAJOR_COLOR);
        match primitive {
            RenderPrimitive::Outline { color, ring } => {
                assert_eq!(color.a, 0.7);
                assert_eq!(ring.first(), ring.last());
            }
            RenderPrimitive::Fill { color, .. } => assert!((color.a - 0.21).abs() < 1e-12),
            RenderPrimitive::Point {
                position,
                size,
                backref,
                color,
            } => {
                assert_eq!(color.a, 0.7);
                assert_eq!(*size, BASE_POINT_SIZE);
                assert_eq!(*position, viewport.project([87.615, 43.785]));
                let (point, layer) = backref.resolve(&layers).unwrap();
                assert_eq!(layer.id, "DEF-001");
                assert_eq!(point.value, 15.2);
            }
        }
    }
}

#[test]
fn test_morphology_threshold_end_to_end() {
    let layers = vec![morphology_layer()];
    let viewport = viewport_for(&layers);
    let composition = compose(&layers, &viewport);

    let points: Vec<(usize, f64)> = composition
        .points()
        .map(|(index, primitive)| match primitive {
            RenderPrimitive::Point { size, .. } => (index, *size),
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].1, EXCEEDING_POINT_SIZE);
    assert_eq!(points[1].1, BASE_POINT_SIZE);

    let (exceeding, layer) = resolve(&composition, &layers, points[0].0).unwrap();
    let tooltip = Tooltip::new(exceeding, layer, 6);
    assert_eq!(tooltip.exceeds_limit, Some(true));
    assert_eq!(tooltip.design_value, Some(40.0));

    let (within, layer) = resolve(&composition, &layers, points[1].0).unwrap();
    assert_eq!(Tooltip::new(within, layer, 6).exceeds_limit, Some(false));
}

#[test]
fn test_malformed_boundary_only_drops_polygon() {
    assert!(parse_wkt("NOT A POLYGON").is_empty());

    let layers = sample_layers();
    let viewport = viewport_for(&layers);
    let composition = compose(&layers, &viewport);

    // Two parsable boundaries, four points across three layers
    assert_eq!(composition.count(PrimitiveKind::Fill), 2);
    assert_eq!(composition.count(PrimitiveKind::Outline), 2);
    assert_eq!(composition.count(PrimitiveKind::Point), 4);
    assert!(composition.references_layer("OVS-001"));

    let overstep = composition
        .points()
        .find(|(_, p)| p.backref().is_some_and(|b| b.layer_id == "OVS-001"))
        .map(|(_, p)| p.color().rgb);
    assert_eq!(overstep, Some(MODERATE_COLOR));
}

#[test]
fn test_polygons_never_cover_points() {
    let layers = sample_layers();
    let composition = compose(&layers, &viewport_for(&layers));

    let first_point = composition
        .primitives
        .iter()
        .position(|p| p.kind() == PrimitiveKind::Point)
        .unwrap();
    assert!(composition.primitives[first_point..]
        .iter()
        .all(|p| p.kind() == PrimitiveKind::Point));
}

#[test]
fn test_visibility_is_exact() {
    let mut layers = sample_layers();
    layers[1].visible = false;
    let composition = compose(&layers, &viewport_for(&layers));

    assert!(!composition.references_layer("MOR-001"));
    assert!(composition
        .primitives
        .iter()
        .all(|p| p.color().rgb != HIGH_COLOR));
    assert!(composition.references_layer("DEF-001"));
}

#[test]
fn test_hidden_layer_does_not_move_map() {
    let mut layers = sample_layers();
    let before = viewport_for(&layers);
    layers[0].visible = false;
    assert_eq!(viewport_for(&layers), before);
}

#[test]
fn test_pick_point_from_json_document() {
    let layers = parse_layers_str(
        r#"{"layers": [{
            "id": "MOR-002",
            "name": "Slope-2",
            "type": "morphology",
            "riskLevel": 2,
            "points": [{"coordinates": [87.64, 43.78], "value": 51.0, "designValue": 40.0}]
        }]}"#,
    )
    .unwrap();
    let viewport = viewport_for(&layers);
    let composition = compose(&layers, &viewport);

    let position = viewport.project([87.64, 43.78]);
    let index = hit_test(&composition, position, 0.0).unwrap();
    let (point, layer) = resolve(&composition, &layers, index).unwrap();
    assert_eq!(layer.id, "MOR-002");
    assert!(point.is_exceeding());
}

#[test]
fn test_out_of_range_level_renders_gray_beside_valid_layer() {
    let layers = parse_layers_str(
        r#"[
            {
                "id": "ODD-300",
                "name": "Odd",
                "type": "deformation",
                "riskLevel": 300,
                "boundary": "POLYGON ((87.60 43.76, 87.61 43.76, 87.61 43.77))",
                "points": [{"coordinates": [87.605, 43.765], "value": 1.0}]
            },
            {
                "id": "DEF-001",
                "name": "Deformation-1",
                "type": "deformation",
                "riskLevel": 1,
                "points": [{"coordinates": [87.615, 43.785], "value": 15.2}]
            }
        ]"#,
    )
    .unwrap();
    let composition = compose(&layers, &viewport_for(&layers));

    assert_eq!(composition.count(PrimitiveKind::Fill), 1);
    let colors: Vec<_> = composition
        .points()
        .map(|(_, p)| (p.backref().unwrap().layer_id.clone(), p.color().rgb))
        .collect();
    assert_eq!(
        colors,
        vec![
            ("ODD-300".to_string(), NEUTRAL_COLOR),
            ("DEF-001".to_string(), MAJOR_COLOR),
        ]
    );
    assert!(composition
        .primitives
        .iter()
        .filter(|p| p.kind() != PrimitiveKind::Point)
        .all(|p| p.color().rgb == NEUTRAL_COLOR));
}

#[test]
fn test_empty_inputs_compose_to_nothing() {
    assert!(compose(&[], &viewport_for(&[])).is_empty());

    let layers = parse_layers_str("[]").unwrap();
    assert!(compose(&layers, &viewport_for(&layers)).is_empty());
}
