//! Shared CLI error type, exit codes and output helpers.

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::config::Config;
use crate::models::RiskLayer;
use crate::parser::load_layers;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded
    Success = 0,
    /// Input was readable but invalid
    ValidationError = 1,
    /// A file could not be read or written
    IoError = 2,
}

impl ExitCode {
    /// Numeric process exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Error returned by CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Exit code the process should terminate with
    pub exit_code: ExitCode,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// Invalid input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            exit_code: ExitCode::ValidationError,
            message: message.into(),
        }
    }

    /// Unreadable or unwritable file.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            exit_code: ExitCode::IoError,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type of CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Loads the configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> CliResult<Config> {
    let result = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    result.map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))
}

/// Loads a layer file, mapping a missing file to an I/O error and bad
/// content to a validation error.
pub fn load_layer_file(path: &Path) -> CliResult<Vec<RiskLayer>> {
    if !path.is_file() {
        return Err(CliError::io(format!(
            "Layer file not found: {}",
            path.display()
        )));
    }
    load_layers(path).map_err(|e| CliError::validation(format!("Failed to load layers: {e:#}")))
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}
