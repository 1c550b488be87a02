//! Configuration management CLI commands.

use crate::cli::common::{load_config, print_json, CliError, CliResult};
use crate::config::Config;
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Write a default configuration file
    Init(ConfigInitArgs),
    /// Print the configuration file location
    Path,
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Config file (defaults to the platform config location)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Write a default configuration file
#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,

    /// Target file (defaults to the platform config location)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Init(args) => args.execute(),
            ConfigCommand::Path => {
                let path = Config::config_file_path().map_err(|e| {
                    CliError::io(format!("Failed to determine config path: {e}"))
                })?;
                println!("{}", path.display());
                Ok(())
            }
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config(self.config.as_deref())?;

        if self.json {
            print_json(&config)?;
        } else {
            let text = toml::to_string_pretty(&config)
                .map_err(|e| CliError::io(format!("Failed to serialize configuration: {e}")))?;
            print!("{text}");
        }

        Ok(())
    }
}

impl ConfigInitArgs {
    /// Execute init command
    pub fn execute(&self) -> CliResult<()> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => Config::config_file_path()
                .map_err(|e| CliError::io(format!("Failed to determine config path: {e}")))?,
        };

        if path.exists() && !self.force {
            return Err(CliError::validation(format!(
                "Configuration already exists: {} (use --force to overwrite)",
                path.display()
            )));
        }

        Config::default()
            .save_to(&path)
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("✓ Wrote default configuration to {}", path.display());
        Ok(())
    }
}
