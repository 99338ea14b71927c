//! # StageKit
//!
//! Calibration and collision-aware movement of the positioning stages of a
//! chip probing setup:
//! - Frame-tagged chip and stage coordinates
//! - Axes rotation, single point and Kabsch transformations per stage
//! - A calibration state machine gating frame-dependent operations
//! - A mover that orders left/right moves so the fibers never collide
//!
//! ## Architecture
//!
//! StageKit is organized as a workspace with multiple crates:
//!
//! 1. **stagekit-core** - Coordinates, shared enums, stage/device contracts, events, errors
//! 2. **stagekit-transform** - Chip/stage transformations
//! 3. **stagekit-movement** - Calibration, mover and the simulated stage
//! 4. **stagekit-settings** - Movement settings persistence
//! 5. **stagekit** - Re-exports, logging setup and the demo binary

pub use stagekit_core::{
    Axis, CalibrationKey, ChipCoordinate, ChipDevice, Coordinate, CoordinateSystem, Device,
    DeviceId, DevicePort, Direction, Error, EventDispatcher, MovementEvent, Orientation, Result,
    SharedStage, Stage, StageCoordinate, StageError, StageStatus, State,
};

pub use stagekit_transform::{
    AxesRotation, CoordinatePairing, KabschRotation, SinglePointTransformation, Transformation,
};

pub use stagekit_movement::{
    Calibration, CoordinateSystemScope, Mover, SharedMover, SimulatedStage, StageCommand,
};

pub use stagekit_settings::{MovementSettings, SettingsError, WiggleSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Output format of [`init_logging_with_format`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line human readable output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(anyhow::anyhow!("unknown log format: {}", other)),
        }
    }
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with_format(LogFormat::Pretty)
}

/// Initialize logging to stdout in the given format
pub fn init_logging_with_format(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_level(true)
                .with_thread_names(true)
                .with_line_number(true)
                .pretty();
            registry.with(fmt_layer).try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_current_span(false);
            registry.with(fmt_layer).try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Pretty ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }
}
