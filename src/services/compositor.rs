//! Composition of risk layers into ordered render primitives.
//!
//! Composition is a pure function of the layers and the viewport, and it is
//! redone in full on every state change. Draw order: all polygon primitives
//! of all visible layers (fill, then outline, per layer), then all point
//! markers, so markers are never covered by a fill.

use tracing::debug;

use crate::models::{Backref, Composition, RenderPrimitive, RiskLayer};
use crate::parser::parse_wkt;

use super::symbology::Symbology;
use super::viewport::Viewport;

/// Composes layers with the default symbology.
///
/// # Examples
///
/// ```
/// use riskgis::models::{LayerType, PrimitiveKind, RiskLayer, RiskPoint, ScreenRect};
/// use riskgis::services::compositor::compose;
/// use riskgis::services::viewport::{GeoExtent, Viewport};
///
/// let layers = vec![RiskLayer::new("OVS-001", "Overstep-1", LayerType::Overstep, 3)
///     .unwrap()
///     .with_boundary("NOT A POLYGON")
///     .with_point(RiskPoint::new(87.61, 43.78, 2.0))];
/// let viewport = Viewport::new(GeoExtent::new(87.6, 43.7, 87.7, 43.8), ScreenRect::default());
///
/// let composition = compose(&layers, &viewport);
/// assert_eq!(composition.count(PrimitiveKind::Fill), 0);
/// assert_eq!(composition.count(PrimitiveKind::Point), 1);
/// ```
#[must_use]
pub fn compose(layers: &[RiskLayer], viewport: &Viewport) -> Composition {
    compose_with(layers, viewport, &Symbology::default())
}

/// Composes layers with explicit symbology.
#[must_use]
pub fn compose_with(layers: &[RiskLayer], viewport: &Viewport, symbology: &Symbology) -> Composition {
    let mut polygons = Vec::new();
    let mut points = Vec::new();

    for (layer_index, layer) in layers.iter().enumerate() {
        if !layer.visible {
            continue;
        }

        if let Some(wkt) = layer.boundary.as_deref() {
            let ring = parse_wkt(wkt);
            if ring.is_empty() {
                debug!(layer = %layer.id, "boundary skipped");
            } else {
                let fill_ring = ring.vertices().iter().map(|&c| viewport.project(c)).collect();
                let outline_ring = ring.closed().into_iter().map(|c| viewport.project(c)).collect();
                polygons.push(RenderPrimitive::Fill {
                    ring: fill_ring,
                    color: symbology.fill(layer.risk_level, layer.opacity),
                });
                polygons.push(RenderPrimitive::Outline {
                    ring: outline_ring,
                    color: symbology.stroke(layer.risk_level, layer.opacity),
                });
            }
        }

        let color = symbology.stroke(layer.risk_level, layer.opacity);
        for (point_index, point) in layer.points.iter().enumerate() {
            points.push(RenderPrimitive::Point {
                position: viewport.project(point.coordinates),
                color,
                size: symbology.size_for(layer.layer_type, point),
                backref: Backref {
                    layer_index,
                    layer_id: layer.id.clone(),
                    point_index,
                },
            });
        }
    }

    debug!(
        layers = layers.len(),
        polygons = polygons.len(),
        points = points.len(),
        "composition rebuilt"
    );

    polygons.append(&mut points);
    Composition::new(polygons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LayerType, PrimitiveKind, RiskPoint, ScreenPoint, ScreenRect};
    use crate::services::symbology::{BASE_POINT_SIZE, EXCEEDING_POINT_SIZE, MAJOR_COLOR};
    use crate::services::viewport::GeoExtent;

    const DEF_001: &str =
        "POLYGON ((87.61 43.78, 87.62 43.78, 87.62 43.79, 87.61 43.79, 87.61 43.78))";

    fn viewport() -> Viewport {
        Viewport::new(
            GeoExtent::new(87.60, 43.77, 87.63, 43.80),
            ScreenRect::new(0.0, 0.0, 300.0, 300.0),
        )
    }

    fn def_layer() -> RiskLayer {
        RiskLayer::new("DEF-001", "Deformation-1", LayerType::Deformation, 1)
            .unwrap()
            .with_boundary(DEF_001)
            .with_point(RiskPoint::new(87.615, 43.785, 15.2))
            .with_opacity(0.7)
    }

    #[test]
    fn test_end_to_end_single_layer() {
        let layers = vec![def_layer()];
        let viewport = viewport();
        let composition = compose(&layers, &viewport);

        assert_eq!(composition.len(), 3);
        assert_eq!(composition.count(PrimitiveKind::Outline), 1);
        assert_eq!(composition.count(PrimitiveKind::Fill), 1);
        assert_eq!(composition.count(PrimitiveKind::Point), 1);

        for primitive in &composition.primitives {
            assert_eq!(primitive.color().rgb, MAJOR_COLOR);
        }

        let outline = composition
            .primitives
            .iter()
            .find(|p| p.kind() == PrimitiveKind::Outline)
            .unwrap();
        assert_eq!(outline.color().a, 0.7);

        let fill = composition
            .primitives
            .iter()
            .find(|p| p.kind() == PrimitiveKind::Fill)
            .unwrap();
        assert!((fill.color().a - 0.7 * 0.3).abs() < 1e-12);

        let (_, point) = composition.points().next().unwrap();
        match point {
            RenderPrimitive::Point {
                position,
                size,
                backref,
                ..
            } => {
                assert_eq!(*position, viewport.project([87.615, 43.785]));
                assert_eq!(*size, BASE_POINT_SIZE);
                let (p, l) = backref.resolve(&layers).unwrap();
                assert!(std::ptr::eq(p, &layers[0].points[0]));
                assert!(std::ptr::eq(l, &layers[0]));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_outline_ring_is_closed() {
        let layers = vec![RiskLayer::new("A", "A", LayerType::Overstep, 2)
            .unwrap()
            .with_boundary("POLYGON ((87.61 43.78, 87.62 43.78, 87.62 43.79))")];
        let composition = compose(&layers, &viewport());

        for primitive in &composition.primitives {
            match primitive {
                RenderPrimitive::Outline { ring, .. } => {
                    assert_eq!(ring.len(), 4);
                    assert_eq!(ring.first(), ring.last());
                }
                RenderPrimitive::Fill { ring, .. } => assert_eq!(ring.len(), 3),
                RenderPrimitive::Point { .. } => panic!("no points expected"),
            }
        }
    }

    #[test]
    fn test_polygons_precede_points_across_layers() {
        let layers = vec![
            def_layer(),
            RiskLayer::new("DEF-002", "Deformation-2", LayerType::Deformation, 2)
                .unwrap()
                .with_boundary(DEF_001)
                .with_point(RiskPoint::new(87.612, 43.781, 3.0)),
        ];
        let composition = compose(&layers, &viewport());
        let kinds: Vec<PrimitiveKind> = composition.primitives.iter().map(RenderPrimitive::kind).collect();

        assert_eq!(
            kinds,
            vec![
                PrimitiveKind::Fill,
                PrimitiveKind::Outline,
                PrimitiveKind::Fill,
                PrimitiveKind::Outline,
                PrimitiveKind::Point,
                PrimitiveKind::Point,
            ]
        );
        // Points keep layer order
        let ids: Vec<&str> = composition
            .points()
            .filter_map(|(_, p)| p.backref())
            .map(|b| b.layer_id.as_str())
            .collect();
        assert_eq!(ids, vec!["DEF-001", "DEF-002"]);
    }

    #[test]
    fn test_hidden_layers_contribute_nothing() {
        let mut layers = vec![def_layer()];
        let visible = compose(&layers, &viewport());

        layers[0].visible = false;
        let hidden = compose(&layers, &viewport());
        assert!(hidden.is_empty());
        assert!(!hidden.references_layer("DEF-001"));

        layers[0].visible = true;
        assert_eq!(compose(&layers, &viewport()), visible);
    }

    #[test]
    fn test_malformed_boundary_keeps_points() {
        let layers = vec![RiskLayer::new("A", "A", LayerType::Deformation, 1)
            .unwrap()
            .with_boundary("NOT A POLYGON")
            .with_point(RiskPoint::new(87.615, 43.785, 1.0))];
        let composition = compose(&layers, &viewport());

        assert_eq!(composition.count(PrimitiveKind::Outline), 0);
        assert_eq!(composition.count(PrimitiveKind::Fill), 0);
        assert_eq!(composition.count(PrimitiveKind::Point), 1);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(compose(&[], &viewport()).is_empty());

        let no_points = vec![RiskLayer::new("A", "A", LayerType::Overstep, 4).unwrap()];
        assert!(compose(&no_points, &viewport()).is_empty());
    }

    #[test]
    fn test_point_sizes_follow_threshold() {
        let layers = vec![RiskLayer::new("MOR-001", "Slope-1", LayerType::Morphology, 2)
            .unwrap()
            .with_point(RiskPoint::new(87.61, 43.78, 45.2).with_design_value(40.0))
            .with_point(RiskPoint::new(87.62, 43.79, 38.5).with_design_value(40.0))];
        let composition = compose(&layers, &viewport());
        let sizes: Vec<f64> = composition
            .points()
            .map(|(_, p)| match p {
                RenderPrimitive::Point { size, .. } => *size,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(sizes, vec![EXCEEDING_POINT_SIZE, BASE_POINT_SIZE]);
    }

    #[test]
    fn test_unknown_level_and_wild_opacity_still_render() {
        let layers = vec![RiskLayer::new("X", "X", LayerType::Overstep, 0)
            .unwrap()
            .with_opacity(f64::NAN)
            .with_point(RiskPoint::new(f64::NAN, 43.78, 1.0))];
        let composition = compose(&layers, &viewport());
        assert_eq!(composition.len(), 1);
        assert_eq!(composition.primitives[0].color().a, 0.0);
    }

    #[test]
    fn test_zoom_moves_primitives() {
        let layers = vec![def_layer()];
        let mut viewport = viewport();
        let before = compose(&layers, &viewport);
        viewport.zoom_at(2.0, ScreenPoint::new(0.0, 0.0));
        let after = compose(&layers, &viewport);
        assert_eq!(before.len(), after.len());
        assert_ne!(before, after);
    }
}
