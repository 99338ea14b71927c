//! Error handling for StageKit
//!
//! Provides error types for all layers of the movement stack:
//! - Stage errors (driver/communication related)
//! - Transformation errors (chip/stage coordinate conversion)
//! - Calibration errors (state machine and coordinate system guards)
//! - Mover errors (registration, settings, collision avoidance)
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::data::{CoordinateSystem, DevicePort, Orientation, State};
use thiserror::Error;

/// Stage error type
///
/// Raised by stage drivers. A communication failure during a liveness probe
/// is recoverable and collapses the calibration state; during motion it is
/// propagated unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    /// The stage did not answer or the link broke
    #[error("Stage communication failed: {reason}")]
    CommunicationFailure {
        /// The reason reported by the driver.
        reason: String,
    },

    /// The stage has no open connection
    #[error("Stage {stage} is not connected")]
    NotConnected {
        /// The stage name.
        stage: String,
    },

    /// The stage refused a command
    #[error("Stage rejected command: {reason}")]
    CommandRejected {
        /// The reason the command was rejected.
        reason: String,
    },
}

/// Transformation error type
///
/// Represents failures when building or applying chip/stage transformations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Axes rotation is not a signed permutation
    #[error("Axes rotation is not a valid signed permutation")]
    InvalidAxesRotation,

    /// Pairing is missing a stage coordinate, a chip coordinate or a device
    #[error("Incomplete coordinate pairing: missing {missing}")]
    IncompletePairing {
        /// The missing part of the pairing.
        missing: String,
    },

    /// A pairing for this device is already stored
    #[error("A pairing with device {device} has already been saved")]
    DuplicateDevice {
        /// The device identifier.
        device: u64,
    },

    /// The transformation is not ready to convert coordinates
    #[error("Cannot transform with invalid {transformation}")]
    NotValid {
        /// The transformation name.
        transformation: String,
    },

    /// Singular value decomposition did not produce U or V^T
    #[error("SVD decomposition failed to produce U or V^T matrices")]
    DecompositionFailed,
}

/// Calibration error type
///
/// Raised by guarded calibration operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// No coordinate system scope has been entered
    #[error("Function {operation} needs a coordinate system to operate in. Enter a coordinate system scope first.")]
    NoCoordinateSystem {
        /// The guarded operation.
        operation: String,
    },

    /// The active coordinate system has no requirement for this operation
    #[error("Unsupported coordinate system for {operation}: {system}")]
    UnsupportedCoordinateSystem {
        /// The guarded operation.
        operation: String,
        /// The active coordinate system.
        system: CoordinateSystem,
    },

    /// The calibration has not reached the required state
    #[error("Function {operation} needs at least a calibration state of {required} to operate in coordinate system {system}")]
    InsufficientState {
        /// The guarded operation.
        operation: String,
        /// The minimum state for the active coordinate system.
        required: State,
        /// The active coordinate system.
        system: CoordinateSystem,
    },

    /// The coordinate argument belongs to another frame than the active one
    #[error("{operation} expects a {expected} coordinate, got a {actual} coordinate")]
    CoordinateSystemMismatch {
        /// The guarded operation.
        operation: String,
        /// The active coordinate system.
        expected: CoordinateSystem,
        /// The frame of the coordinate passed in.
        actual: CoordinateSystem,
    },
}

/// Mover error type
///
/// Represents errors in stage registration, aggregate settings and
/// coordinated two-stage movement.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MoverError {
    /// No registered stage has an open connection
    #[error("Function {operation} needs at least one connected stage")]
    NoConnectedStages {
        /// The operation that required a connected stage.
        operation: String,
    },

    /// Orientation already has a stage
    #[error("A stage has already been assigned for {orientation}")]
    OrientationTaken {
        /// The duplicate orientation.
        orientation: Orientation,
    },

    /// Port already has a stage
    #[error("A stage has already been assigned for the {port} port")]
    PortTaken {
        /// The duplicate port.
        port: DevicePort,
    },

    /// The stage is registered under another orientation and port
    #[error("Stage {stage} has already an assignment")]
    StageAlreadyAssigned {
        /// The stage name.
        stage: String,
    },

    /// No calibration registered for the requested slot
    #[error("No calibration registered for {slot}")]
    MissingCalibration {
        /// Description of the requested slot.
        slot: String,
    },

    /// Calibrations disagree on their state
    #[error("Not all stages are in the same state")]
    InconsistentState,

    /// Start or target configuration violates the minimum clearance
    #[error("Collision precondition violated: {reason}")]
    CollisionPrecondition {
        /// Which configuration failed and by how much.
        reason: String,
    },

    /// Setting value outside the documented range
    #[error("{setting} value {value} is out of valid range [{min}, {max}]")]
    OutOfRange {
        /// The setting name.
        setting: String,
        /// The rejected value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },

    /// Applying a setting on a stage failed
    #[error("Setting {setting} failed: {source}")]
    SettingFailed {
        /// The setting name.
        setting: String,
        /// The driver error.
        source: StageError,
    },

    /// Another wiggle is still running
    #[error("Stage cannot wiggle because another stage is being wiggled")]
    WiggleInProgress,

    /// Case distinction on movement deltas fell through
    #[error("Unreachable ordering case for deltas left={delta_left}, right={delta_right}")]
    UnreachableOrdering {
        /// Left delta.
        delta_left: f64,
        /// Right delta.
        delta_right: f64,
    },
}

/// Main error type for StageKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Stage error
    #[error(transparent)]
    Stage(#[from] StageError),

    /// Transformation error
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Calibration error
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// Mover error
    #[error(transparent)]
    Mover(#[from] MoverError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a stage driver error
    pub fn is_stage_error(&self) -> bool {
        matches!(self, Error::Stage(_))
    }

    /// Check if this is a transformation error
    pub fn is_transform_error(&self) -> bool {
        matches!(self, Error::Transform(_))
    }

    /// Check if this is a calibration error
    pub fn is_calibration_error(&self) -> bool {
        matches!(self, Error::Calibration(_))
    }

    /// Check if a calibration state requirement was not met
    pub fn is_insufficient_state(&self) -> bool {
        matches!(
            self,
            Error::Calibration(CalibrationError::InsufficientState { .. })
        )
    }

    /// Check if this is a mover error
    pub fn is_mover_error(&self) -> bool {
        matches!(self, Error::Mover(_))
    }

    /// Check if a move was rejected by the collision check
    pub fn is_collision_error(&self) -> bool {
        matches!(self, Error::Mover(MoverError::CollisionPrecondition { .. }))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_error_names_operation_state_and_system() {
        let err = CalibrationError::InsufficientState {
            operation: "move_absolute".to_string(),
            required: State::SinglePointFixed,
            system: CoordinateSystem::Chip,
        };
        let msg = err.to_string();
        assert!(msg.contains("move_absolute"));
        assert!(msg.contains("Single point fixed"));
        assert!(msg.contains("chip"));
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = StageError::CommunicationFailure {
            reason: "timeout".to_string(),
        }
        .into();
        assert!(err.is_stage_error());
        assert!(!err.is_mover_error());

        let err: Error = MoverError::CollisionPrecondition {
            reason: "too close".to_string(),
        }
        .into();
        assert!(err.is_collision_error());
        assert_eq!(err.to_string(), "Collision precondition violated: too close");
    }

    #[test]
    fn test_setting_failed_carries_source() {
        let err = MoverError::SettingFailed {
            setting: "speed_xy".to_string(),
            source: StageError::CommandRejected {
                reason: "busy".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Setting speed_xy failed: Stage rejected command: busy"
        );
    }
}
