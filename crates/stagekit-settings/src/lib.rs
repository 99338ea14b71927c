//! StageKit Settings Crate
//!
//! Movement and wiggle settings with validation and JSON/TOML persistence.

pub mod error;
pub mod movement;

pub use error::{SettingsError, SettingsResult};
pub use movement::{
    MovementSettings, WiggleSettings, DEFAULT_MIN_FIBER_DISTANCE, FIBER_DIAMETER,
    SETTINGS_FILE_NAME,
};
