//! Compose command: render description for a layer file.

use crate::cli::common::{load_config, load_layer_file, print_json, CliError, CliResult};
use crate::models::{risk_level_label, Composition, PrimitiveKind, RiskLayer, ScreenRect};
use crate::parser::parse_wkt_strict;
use crate::services::compositor::compose_with;
use crate::services::symbology::Symbology;
use crate::services::viewport::{GeoExtent, Viewport};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Compose a layer file into render primitives
#[derive(Debug, Clone, Args)]
pub struct ComposeArgs {
    /// Path to layer JSON file
    #[arg(value_name = "FILE")]
    pub layers: PathBuf,

    /// Viewport width in screen units
    #[arg(long, default_value_t = 800.0)]
    pub width: f64,

    /// Viewport height in screen units
    #[arg(long, default_value_t = 600.0)]
    pub height: f64,

    /// Output the full render description as JSON
    #[arg(long)]
    pub json: bool,

    /// Config file (defaults to the platform config location)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Primitive counts by kind.
#[derive(Debug, Serialize)]
struct PrimitiveCounts {
    outline: usize,
    fill: usize,
    point: usize,
}

impl From<&Composition> for PrimitiveCounts {
    fn from(composition: &Composition) -> Self {
        Self {
            outline: composition.count(PrimitiveKind::Outline),
            fill: composition.count(PrimitiveKind::Fill),
            point: composition.count(PrimitiveKind::Point),
        }
    }
}

/// JSON response for compose
#[derive(Debug, Serialize)]
struct ComposeResponse<'a> {
    screen: ScreenRect,
    extent: GeoExtent,
    counts: PrimitiveCounts,
    primitives: &'a Composition,
}

impl ComposeArgs {
    /// Execute the compose command
    pub fn execute(&self) -> CliResult<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(CliError::validation(format!(
                "Viewport size must be positive (got {}x{})",
                self.width, self.height
            )));
        }

        let config = load_config(self.config.as_deref())?;
        let layers = load_layer_file(&self.layers)?;

        let screen = ScreenRect::new(0.0, 0.0, self.width, self.height);
        let viewport = Viewport::for_layers(&layers, screen, &config.map);
        let symbology = Symbology::from(&config.symbology);
        let composition = compose_with(&layers, &viewport, &symbology);

        if self.json {
            print_json(&ComposeResponse {
                screen,
                extent: viewport.extent(),
                counts: PrimitiveCounts::from(&composition),
                primitives: &composition,
            })?;
        } else {
            print_summary(&layers, &composition, &symbology, screen);
        }

        Ok(())
    }
}

fn print_summary(
    layers: &[RiskLayer],
    composition: &Composition,
    symbology: &Symbology,
    screen: ScreenRect,
) {
    let visible = layers.iter().filter(|l| l.visible).count();
    let counts = PrimitiveCounts::from(composition);

    println!(
        "Composed {} layers ({} visible) into {}x{}",
        layers.len(),
        visible,
        screen.width,
        screen.height
    );
    println!(
        "  Outlines: {}  Fills: {}  Points: {}",
        counts.outline, counts.fill, counts.point
    );

    if layers.is_empty() {
        return;
    }

    println!("\nLayers:");
    for layer in layers {
        let boundary = match layer.boundary.as_deref().map(parse_wkt_strict) {
            None => "no boundary".to_string(),
            Some(Ok(ring)) => format!("boundary ok ({} vertices)", ring.len()),
            Some(Err(e)) => format!("boundary skipped: {e}"),
        };
        println!(
            "  {:<10} {:<20} {:<24} {:<26} {:<8} {}  {} points ({} exceeding)",
            layer.id,
            layer.name,
            risk_level_label(layer.risk_level),
            symbology.stroke(layer.risk_level, layer.opacity).to_string(),
            if layer.visible { "visible" } else { "hidden" },
            boundary,
            layer.points.len(),
            layer.exceeding_count()
        );
    }
}
