//! Movement settings
//!
//! Speeds, acceleration, lift height and collision clearance shared by all
//! stages of a mover, plus the parameters of the axis wiggle. Stored as JSON
//! or TOML, chosen by file extension.

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use stagekit_core::{
    ACCELERATION_LOWER_BOUND, ACCELERATION_UPPER_BOUND, SPEED_LOWER_BOUND, SPEED_UPPER_BOUND,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fiber diameter in micrometers
pub const FIBER_DIAMETER: f64 = 125.0;

/// Default clearance between the left and right stage
pub const DEFAULT_MIN_FIBER_DISTANCE: f64 = 1.1 * FIBER_DIAMETER;

/// Settings file name inside the configuration directory
pub const SETTINGS_FILE_NAME: &str = "movement.json";

/// Parameters of the axis wiggle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiggleSettings {
    /// Distance moved forth and back, in um
    pub distance: f64,
    /// Speed during the wiggle, in um/s
    pub speed: f64,
    /// Pause between the forth and back move, in milliseconds
    pub pause_ms: u64,
}

impl Default for WiggleSettings {
    fn default() -> Self {
        Self {
            distance: 1000.0,
            speed: 1000.0,
            pause_ms: 2000,
        }
    }
}

/// Mover-wide movement settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    /// xy speed in um/s
    pub speed_xy: f64,
    /// z speed in um/s
    pub speed_z: f64,
    /// xy acceleration in um/s^2
    pub acceleration_xy: f64,
    /// Lift height for coordinated moves, in um
    pub z_lift: f64,
    /// Minimum x separation between left and right stage, in um
    pub min_fiber_distance: f64,
    /// Axis wiggle parameters
    pub wiggle: WiggleSettings,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            speed_xy: 200.0,
            speed_z: 20.0,
            acceleration_xy: 0.0,
            z_lift: 20.0,
            min_fiber_distance: DEFAULT_MIN_FIBER_DISTANCE,
            wiggle: WiggleSettings::default(),
        }
    }
}

impl MovementSettings {
    /// Create settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform configuration file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("stagekit"))
            .unwrap_or_else(|| PathBuf::from("config"))
            .join(SETTINGS_FILE_NAME)
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let settings: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        settings.validate()?;
        debug!("Loaded movement settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to file (JSON or TOML)
    ///
    /// Missing parent directories are created.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)
                .map_err(|e| SettingsError::SaveError(e.to_string()))?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        debug!("Saved movement settings to {}", path.display());
        Ok(())
    }

    /// Validate settings against the documented stage ranges
    pub fn validate(&self) -> SettingsResult<()> {
        check_range("speed_xy", self.speed_xy, SPEED_LOWER_BOUND, SPEED_UPPER_BOUND)?;
        check_range("speed_z", self.speed_z, SPEED_LOWER_BOUND, SPEED_UPPER_BOUND)?;
        check_range(
            "acceleration_xy",
            self.acceleration_xy,
            ACCELERATION_LOWER_BOUND,
            ACCELERATION_UPPER_BOUND,
        )?;

        if !(0.0..).contains(&self.z_lift) {
            return Err(SettingsError::invalid("z_lift", "must not be negative"));
        }
        if !is_positive(self.min_fiber_distance) {
            return Err(SettingsError::invalid(
                "min_fiber_distance",
                "must be > 0",
            ));
        }

        if !is_positive(self.wiggle.distance) {
            return Err(SettingsError::invalid("wiggle.distance", "must be > 0"));
        }
        check_range(
            "wiggle.speed",
            self.wiggle.speed,
            SPEED_LOWER_BOUND,
            SPEED_UPPER_BOUND,
        )?;

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn check_range(key: &str, value: f64, min: f64, max: f64) -> SettingsResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::invalid(
            key,
            format!("{} is outside [{}, {}]", value, min, max),
        ))
    }
}
