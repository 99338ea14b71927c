//! # StageKit Core
//!
//! Core types, traits, and utilities for StageKit.
//! Provides frame-tagged coordinates, the calibration state enums,
//! the stage and device contracts, movement events and error types.

pub mod coordinate;
pub mod data;
pub mod error;
pub mod event;
pub mod stage;
pub mod types;

pub use coordinate::{
    ChipCoordinate, ChipFrame, Coordinate, Frame, GenericFrame, StageCoordinate, StageFrame,
};

pub use data::{
    Axis, CalibrationKey, ChipDevice, CoordinateSystem, Device, DeviceId, DevicePort, Direction,
    Orientation, State,
};

pub use error::{CalibrationError, Error, MoverError, Result, StageError, TransformError};

pub use event::{EventDispatcher, MovementEvent};

pub use stage::{
    check_acceleration, check_speed, shared_stage, SharedStage, Stage, StageResult, StageStatus,
    ACCELERATION_LOWER_BOUND, ACCELERATION_UPPER_BOUND, SPEED_LOWER_BOUND, SPEED_UPPER_BOUND,
};

pub use types::{thread_safe, thread_safe_vec, ThreadSafe, ThreadSafeVec};
