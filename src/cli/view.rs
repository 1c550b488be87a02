//! View command: interactive terminal map.

use crate::cli::common::{load_config, load_layer_file, CliError, CliResult};
use crate::tui;
use clap::Args;
use std::path::PathBuf;

/// Open a layer file in the interactive terminal map
#[derive(Debug, Clone, Args)]
pub struct ViewArgs {
    /// Path to layer JSON file
    #[arg(value_name = "FILE")]
    pub layers: PathBuf,

    /// Config file (defaults to the platform config location)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ViewArgs {
    /// Execute the view command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config(self.config.as_deref())?;
        let layers = load_layer_file(&self.layers)?;

        let mut terminal = tui::setup_terminal()
            .map_err(|e| CliError::io(format!("Failed to set up terminal: {e:#}")))?;

        let result = tui::run_view(layers, &config, &mut terminal);

        tui::restore_terminal(terminal)
            .map_err(|e| CliError::io(format!("Failed to restore terminal: {e:#}")))?;

        result.map_err(|e| CliError::io(format!("Map viewer failed: {e:#}")))
    }
}
