//! RiskGIS - risk-layer map engine for mine-safety monitoring
//!
//! Composes WKT risk boundaries and monitoring points into render primitives,
//! resolves pointer picks, and hosts an interactive terminal map.

use clap::{Parser, Subcommand};
use riskgis::cli::{
    CliError, CliResult, ComposeArgs, ConfigArgs, ExitCode, PickArgs, WktArgs,
};
use riskgis::constants::APP_NAME;
use tracing_subscriber::EnvFilter;

/// RiskGIS - risk-layer map engine for mine-safety monitoring
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a layer file into render primitives
    Compose(ComposeArgs),
    /// Parse a WKT polygon and report its ring
    Wkt(WktArgs),
    /// Find the monitoring point at a screen position
    Pick(PickArgs),
    /// Open a layer file in the interactive terminal map
    #[cfg(feature = "ratatui")]
    View(riskgis::cli::ViewArgs),
    /// Manage configuration
    Config(ConfigArgs),
}

impl Command {
    fn execute(&self) -> CliResult<()> {
        match self {
            Self::Compose(args) => args.execute(),
            Self::Wkt(args) => args.execute(),
            Self::Pick(args) => args.execute(),
            #[cfg(feature = "ratatui")]
            Self::View(args) => args.execute(),
            Self::Config(args) => args.execute(),
        }
    }

    /// Default log level; the viewer owns the terminal, so it only logs errors.
    const fn default_log_level(&self) -> &'static str {
        match self {
            #[cfg(feature = "ratatui")]
            Self::View(_) => "error",
            _ => "warn",
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(cli.command.default_log_level()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report(error: &CliError) -> ExitCode {
    eprintln!("{APP_NAME}: {error}");
    error.exit_code
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let code = match cli.command.execute() {
        Ok(()) => ExitCode::Success,
        Err(error) => report(&error),
    };

    std::process::exit(code.code());
}
