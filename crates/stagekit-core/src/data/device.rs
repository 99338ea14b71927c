//! Device contract
//!
//! A device under test exposes an input and an output position on the chip.
//! Positions may be recorded in 2D; the missing z component is zero.

use crate::coordinate::ChipCoordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a device on a chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(pub u64);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contract for devices the mover can travel to
pub trait Device {
    /// Unique identifier of the device
    fn id(&self) -> DeviceId;

    /// Chip position of the device input
    fn input_position(&self) -> ChipCoordinate;

    /// Chip position of the device output
    fn output_position(&self) -> ChipCoordinate;
}

/// Plain device record with recorded input and output positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipDevice {
    /// Device identifier
    pub id: DeviceId,
    /// Input position in chip coordinates
    pub input: ChipCoordinate,
    /// Output position in chip coordinates
    pub output: ChipCoordinate,
}

impl ChipDevice {
    /// Create a device from 2D or 3D positions
    pub fn new(id: u64, input: &[f64], output: &[f64]) -> Self {
        Self {
            id: DeviceId(id),
            input: ChipCoordinate::from_slice(input),
            output: ChipCoordinate::from_slice(output),
        }
    }
}

impl Device for ChipDevice {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn input_position(&self) -> ChipCoordinate {
        self.input
    }

    fn output_position(&self) -> ChipCoordinate {
        self.output
    }
}
