//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and the configuration directory.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "RiskGIS";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "riskgis";

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "RiskGis";

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "RISKGIS_CONFIG_DIR";
