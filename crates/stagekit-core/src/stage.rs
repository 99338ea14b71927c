//! Stage driver contract
//!
//! The physical stage driver is an external collaborator. This module
//! defines the operations the calibration and mover layers require from it,
//! plus the documented value ranges for speed and acceleration settings.
//!
//! Units follow the stage vendor convention: positions in micrometers,
//! speeds in micrometers per second, accelerations in micrometers per
//! second squared.

use crate::error::{MoverError, StageError};
use crate::types::ThreadSafe;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Inclusive lower bound for stage speeds
pub const SPEED_LOWER_BOUND: f64 = 0.0;
/// Inclusive upper bound for stage speeds
pub const SPEED_UPPER_BOUND: f64 = 1e5;
/// Inclusive lower bound for stage accelerations
pub const ACCELERATION_LOWER_BOUND: f64 = 0.0;
/// Inclusive upper bound for stage accelerations
pub const ACCELERATION_UPPER_BOUND: f64 = 1e7;

/// Result type for driver calls
pub type StageResult<T> = std::result::Result<T, StageError>;

/// Status reported by a responsive stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageStatus {
    /// Stage is at rest and accepts commands
    Idle,
    /// Stage is executing a motion command
    Moving,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Moving => write!(f, "Moving"),
        }
    }
}

/// Operations required from a stage driver
///
/// All calls block until the driver returns. A communication failure is
/// reported as [`StageError::CommunicationFailure`] and never panics.
pub trait Stage: Send {
    /// Human-readable stage identifier
    fn name(&self) -> String;

    /// Open the connection to the stage
    fn connect(&mut self) -> StageResult<()>;

    /// Close the connection to the stage
    fn disconnect(&mut self) -> StageResult<()>;

    /// Whether a connection is open
    fn is_connected(&self) -> bool;

    /// Liveness probe; `Ok(None)` means the stage answered without a status
    fn get_status(&mut self) -> StageResult<Option<StageStatus>>;

    /// Current position in the stage frame, up to three components
    fn position(&mut self) -> StageResult<Vec<f64>>;

    /// Move by an offset in the stage frame
    fn move_relative(&mut self, x: f64, y: f64, z: f64) -> StageResult<()>;

    /// Move to a position in the stage frame
    fn move_absolute(&mut self, x: f64, y: f64, z: f64) -> StageResult<()>;

    /// Current xy speed
    fn get_speed_xy(&mut self) -> StageResult<f64>;

    /// Set the xy speed
    fn set_speed_xy(&mut self, umps: f64) -> StageResult<()>;

    /// Current z speed
    fn get_speed_z(&mut self) -> StageResult<f64>;

    /// Set the z speed
    fn set_speed_z(&mut self, umps: f64) -> StageResult<()>;

    /// Current xy acceleration
    fn get_acceleration_xy(&mut self) -> StageResult<f64>;

    /// Set the xy acceleration
    fn set_acceleration_xy(&mut self, umps2: f64) -> StageResult<()>;
}

/// Stage handle shared between the driver layer and a calibration
pub type SharedStage = ThreadSafe<dyn Stage>;

/// Wrap a driver into a [`SharedStage`]
pub fn shared_stage<S: Stage + 'static>(stage: S) -> SharedStage {
    Arc::new(Mutex::new(stage))
}

/// Reject a speed outside [`SPEED_LOWER_BOUND`, `SPEED_UPPER_BOUND`]
pub fn check_speed(setting: &str, umps: f64) -> Result<(), MoverError> {
    check_range(setting, umps, SPEED_LOWER_BOUND, SPEED_UPPER_BOUND)
}

/// Reject an acceleration outside [`ACCELERATION_LOWER_BOUND`, `ACCELERATION_UPPER_BOUND`]
pub fn check_acceleration(setting: &str, umps2: f64) -> Result<(), MoverError> {
    check_range(
        setting,
        umps2,
        ACCELERATION_LOWER_BOUND,
        ACCELERATION_UPPER_BOUND,
    )
}

fn check_range(setting: &str, value: f64, min: f64, max: f64) -> Result<(), MoverError> {
    // NaN fails both comparisons, so test for inclusion
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        debug!("Rejected {} = {}, allowed [{}, {}]", setting, value, min, max);
        Err(MoverError::OutOfRange {
            setting: setting.to_string(),
            value,
            min,
            max,
        })
    }
}
