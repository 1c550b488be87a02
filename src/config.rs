//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving map configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_DIR_ENV, CONFIG_DIR_NAME};

/// Fixed geographic extent `[min_lon, min_lat, max_lon, max_lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtentConfig {
    /// Western edge in degrees
    pub min_lon: f64,
    /// Southern edge in degrees
    pub min_lat: f64,
    /// Eastern edge in degrees
    pub max_lon: f64,
    /// Northern edge in degrees
    pub max_lat: f64,
}

/// Map view settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Margin added around fitted extents, as a fraction of their span
    pub padding_ratio: f64,
    /// Smallest zoom factor
    pub min_zoom: f64,
    /// Largest zoom factor
    pub max_zoom: f64,
    /// Multiplicative step for zoom in/out controls
    pub zoom_step: f64,
    /// Pan step in screen units for keyboard controls
    pub pan_step: f64,
    /// Fixed extent; when absent the extent is fitted to the layers
    pub extent: Option<ExtentConfig>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            padding_ratio: 0.1,
            min_zoom: 0.5,
            max_zoom: 20.0,
            zoom_step: 1.25,
            pan_step: 20.0,
            extent: None,
        }
    }
}

/// Point and polygon styling constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbologyConfig {
    /// Marker size for regular points
    pub base_point_size: f64,
    /// Marker size for exceeding morphology points
    pub exceeding_point_size: f64,
    /// Polygon fill alpha relative to the stroke alpha
    pub fill_alpha_factor: f64,
}

impl Default for SymbologyConfig {
    fn default() -> Self {
        Self {
            base_point_size: 10.0,
            exceeding_point_size: 15.0,
            fill_alpha_factor: 0.3,
        }
    }
}

/// Tooltip formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    /// Decimal places for coordinates
    pub coordinate_precision: usize,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            coordinate_precision: 6,
        }
    }
}

/// Pointer interaction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Extra distance around a marker that still counts as a hit
    pub hit_tolerance: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self { hit_tolerance: 2.0 }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/RiskGis/config.toml`
/// - macOS: `~/Library/Application Support/RiskGis/config.toml`
/// - Windows: `%APPDATA%\RiskGis\config.toml`
///
/// # Validation
///
/// - All numeric settings must be finite
/// - Extent must have `min < max` on both axes
/// - `0 < min_zoom <= max_zoom`, `zoom_step > 1`
/// - Point sizes must be positive, `fill_alpha_factor` in `[0, 1]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Map view settings
    pub map: MapConfig,
    /// Styling constants
    pub symbology: SymbologyConfig,
    /// Tooltip formatting
    pub tooltip: TooltipConfig,
    /// Pointer interaction
    pub interaction: InteractionConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    ///
    /// `RISKGIS_CONFIG_DIR` overrides the platform location.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the default location.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from an explicit path, defaulting when it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Saves configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create config directory: {}", dir.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).with_context(|| {
            format!("Failed to write temp config file: {}", temp_path.display())
        })?;

        fs::rename(&temp_path, path).with_context(|| {
            format!("Failed to rename temp config file to: {}", path.display())
        })?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        let map = &self.map;
        let finite = [
            ("map.padding_ratio", map.padding_ratio),
            ("map.min_zoom", map.min_zoom),
            ("map.max_zoom", map.max_zoom),
            ("map.zoom_step", map.zoom_step),
            ("map.pan_step", map.pan_step),
            ("symbology.base_point_size", self.symbology.base_point_size),
            ("symbology.exceeding_point_size", self.symbology.exceeding_point_size),
            ("symbology.fill_alpha_factor", self.symbology.fill_alpha_factor),
            ("interaction.hit_tolerance", self.interaction.hit_tolerance),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                anyhow::bail!("'{name}' must be a finite number (got {value})");
            }
        }

        if let Some(extent) = &map.extent {
            let corners = [extent.min_lon, extent.min_lat, extent.max_lon, extent.max_lat];
            if corners.iter().any(|v| !v.is_finite()) {
                anyhow::bail!("'map.extent' must contain finite coordinates");
            }
            if extent.min_lon >= extent.max_lon || extent.min_lat >= extent.max_lat {
                anyhow::bail!(
                    "'map.extent' is inverted or empty: lon {}..{}, lat {}..{}",
                    extent.min_lon,
                    extent.max_lon,
                    extent.min_lat,
                    extent.max_lat
                );
            }
        }

        if map.padding_ratio < 0.0 {
            anyhow::bail!("'map.padding_ratio' cannot be negative");
        }
        if map.min_zoom <= 0.0 || map.min_zoom > map.max_zoom {
            anyhow::bail!(
                "Zoom limits must satisfy 0 < min_zoom <= max_zoom (got {}..{})",
                map.min_zoom,
                map.max_zoom
            );
        }
        if map.zoom_step <= 1.0 {
            anyhow::bail!("'map.zoom_step' must be greater than 1 (got {})", map.zoom_step);
        }
        if self.symbology.base_point_size <= 0.0 || self.symbology.exceeding_point_size <= 0.0 {
            anyhow::bail!("Point sizes must be positive");
        }
        if !(0.0..=1.0).contains(&self.symbology.fill_alpha_factor) {
            anyhow::bail!(
                "'symbology.fill_alpha_factor' must be within 0..=1 (got {})",
                self.symbology.fill_alpha_factor
            );
        }
        if self.interaction.hit_tolerance < 0.0 {
            anyhow::bail!("'interaction.hit_tolerance' cannot be negative");
        }

        Ok(())
    }
}
