//! Pick command: resolve a screen position to a monitoring point.
//!
//! Mounts the map on an in-memory surface and feeds it one pointer event,
//! exactly as an interactive host would.

use std::cell::RefCell;
use std::rc::Rc;

use crate::cli::common::{load_config, load_layer_file, print_json, CliError, CliResult};
use crate::models::{ScreenPoint, ScreenRect};
use crate::services::interaction::{PointerKind, Tooltip};
use crate::surface::{MapCallbacks, RecordingContainer, RecordingSurface, RiskMap, SurfaceInput};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Find the monitoring point at a screen position
#[derive(Debug, Clone, Args)]
pub struct PickArgs {
    /// Path to layer JSON file
    #[arg(value_name = "FILE")]
    pub layers: PathBuf,

    /// Horizontal screen position
    #[arg(long, allow_hyphen_values = true)]
    pub x: f64,

    /// Vertical screen position
    #[arg(long, allow_hyphen_values = true)]
    pub y: f64,

    /// Viewport width in screen units
    #[arg(long, default_value_t = 800.0)]
    pub width: f64,

    /// Viewport height in screen units
    #[arg(long, default_value_t = 600.0)]
    pub height: f64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Config file (defaults to the platform config location)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// A clicked point as reported by the map callback.
#[derive(Debug, Clone, Serialize)]
struct PickedPoint {
    layer_id: String,
    point_index: usize,
    tooltip: Tooltip,
}

/// JSON response for pick
#[derive(Debug, Serialize)]
struct PickResponse {
    hit: bool,
    x: f64,
    y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    point: Option<PickedPoint>,
}

impl PickArgs {
    /// Execute the pick command
    pub fn execute(&self) -> CliResult<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(CliError::validation(format!(
                "Viewport size must be positive (got {}x{})",
                self.width, self.height
            )));
        }
        if !(self.x.is_finite() && self.y.is_finite()) {
            return Err(CliError::validation("Position must be finite"));
        }

        let config = load_config(self.config.as_deref())?;
        let layers = load_layer_file(&self.layers)?;
        let precision = config.tooltip.coordinate_precision;

        let picked: Rc<RefCell<Option<PickedPoint>>> = Rc::default();
        let sink = Rc::clone(&picked);
        let callbacks = MapCallbacks {
            on_point_click: Some(Box::new(move |point, layer| {
                let point_index = layer
                    .points
                    .iter()
                    .position(|p| std::ptr::eq(p, point))
                    .unwrap_or_default();
                *sink.borrow_mut() = Some(PickedPoint {
                    layer_id: layer.id.clone(),
                    point_index,
                    tooltip: Tooltip::new(point, layer, precision),
                });
            })),
            ..MapCallbacks::default()
        };

        let container = RecordingContainer::new(ScreenRect::new(0.0, 0.0, self.width, self.height))
            .with_hit_tolerance(config.interaction.hit_tolerance);
        let mut map: RiskMap<RecordingSurface> =
            RiskMap::mount(container, layers, callbacks, &config)
                .map_err(|e| CliError::validation(format!("Failed to mount map: {e:#}")))?;

        map.dispatch(SurfaceInput::Pointer {
            kind: PointerKind::Click,
            position: ScreenPoint::new(self.x, self.y),
        });
        drop(map);

        let point = picked.borrow_mut().take();
        if self.json {
            print_json(&PickResponse {
                hit: point.is_some(),
                x: self.x,
                y: self.y,
                point,
            })?;
        } else if let Some(point) = point {
            println!("{}", point.tooltip);
        } else {
            println!("No monitoring point at ({}, {})", self.x, self.y);
        }

        Ok(())
    }
}
