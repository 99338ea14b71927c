//! Data models for axes, mount positions and calibration states
//!
//! This module provides:
//! - Axis and direction enums used by the axes rotation
//! - Stage mount orientation and device port tags
//! - The ordered calibration state machine states
//! - Coordinate system selectors for frame-scoped operations
//! - The device contract (see [`device`])

pub mod device;

pub use device::{ChipDevice, Device, DeviceId};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cartesian axis, shared by chip and stage frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
}

impl Axis {
    /// All axes in index order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index of this axis in a 3-vector
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::Y => write!(f, "Y"),
            Self::Z => write!(f, "Z"),
        }
    }
}

/// Sign of an axis assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Same direction (+1)
    Positive,
    /// Opposite direction (-1)
    Negative,
}

impl Direction {
    /// Both directions
    pub const ALL: [Direction; 2] = [Direction::Positive, Direction::Negative];

    /// Signed unit value of this direction
    pub fn value(self) -> f64 {
        match self {
            Direction::Positive => 1.0,
            Direction::Negative => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "Positive"),
            Self::Negative => write!(f, "Negative"),
        }
    }
}

/// Mount position of a stage relative to the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Orientation {
    /// Left of the chip
    Left,
    /// Right of the chip
    Right,
    /// Above the chip
    Top,
    /// Below the chip
    Bottom,
}

impl Orientation {
    /// All orientations
    pub const ALL: [Orientation; 4] = [
        Orientation::Left,
        Orientation::Right,
        Orientation::Top,
        Orientation::Bottom,
    ];
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "Left"),
            Self::Right => write!(f, "Right"),
            Self::Top => write!(f, "Top"),
            Self::Bottom => write!(f, "Bottom"),
        }
    }
}

/// Side of the device under test that a stage services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DevicePort {
    /// Input side
    Input,
    /// Output side
    Output,
}

impl fmt::Display for DevicePort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "Input"),
            Self::Output => write!(f, "Output"),
        }
    }
}

/// Calibration state machine states
///
/// Totally ordered: every state implies all lower ones. The derived
/// ordering follows declaration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum State {
    /// Stage not reachable
    #[default]
    NotConfigured,
    /// Stage answers its liveness probe
    Connected,
    /// Axes rotation is a valid signed permutation
    CoordinateSystemFixed,
    /// A single point pairing anchors the translation
    SinglePointFixed,
    /// Kabsch rotation fitted from at least three pairings
    FullyCalibrated,
}

impl State {
    /// Numeric level of this state
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "Not configured"),
            Self::Connected => write!(f, "Connected"),
            Self::CoordinateSystemFixed => write!(f, "Coordinate system fixed"),
            Self::SinglePointFixed => write!(f, "Single point fixed"),
            Self::FullyCalibrated => write!(f, "Fully calibrated"),
        }
    }
}

/// Coordinate frame selector for frame-scoped calibration operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// Native frame of a stage's actuators
    Stage,
    /// Frame fixed to the chip surface
    Chip,
    /// Untagged legacy frame; accepted as argument, never as an operating frame
    Generic,
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stage => write!(f, "stage"),
            Self::Chip => write!(f, "chip"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// Identifies one calibration slot in a mover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalibrationKey {
    /// Mount position
    pub orientation: Orientation,
    /// Serviced port
    pub port: DevicePort,
}

impl CalibrationKey {
    /// Create a new key
    pub fn new(orientation: Orientation, port: DevicePort) -> Self {
        Self { orientation, port }
    }
}

impl fmt::Display for CalibrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Stage ({})", self.orientation, self.port)
    }
}
