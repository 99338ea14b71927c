//! Coordinate pairings
//!
//! A pairing ties a stage position to the chip position of a device, as
//! recorded for one calibration. Pairings are collected piecewise by the
//! operator-facing layer, so every part except the owning calibration may
//! still be missing. Transformations only accept complete pairings.
//!
//! Pairings serialize with serde, so a recorded set can be stored and fed
//! back into a fresh [`KabschRotation`](crate::KabschRotation) later.

use serde::{Deserialize, Serialize};
use stagekit_core::{CalibrationKey, ChipCoordinate, DeviceId, StageCoordinate, TransformError};

/// Stage coordinate, device and chip coordinate recorded for one calibration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatePairing {
    calibration: CalibrationKey,
    stage_coordinate: Option<StageCoordinate>,
    device: Option<DeviceId>,
    chip_coordinate: Option<ChipCoordinate>,
}

impl CoordinatePairing {
    /// Create a complete pairing
    pub fn new(
        calibration: CalibrationKey,
        stage_coordinate: StageCoordinate,
        device: DeviceId,
        chip_coordinate: ChipCoordinate,
    ) -> Self {
        Self {
            calibration,
            stage_coordinate: Some(stage_coordinate),
            device: Some(device),
            chip_coordinate: Some(chip_coordinate),
        }
    }

    /// Start an empty pairing for a calibration
    pub fn partial(calibration: CalibrationKey) -> Self {
        Self {
            calibration,
            stage_coordinate: None,
            device: None,
            chip_coordinate: None,
        }
    }

    /// Copy with the stage coordinate set
    pub fn with_stage_coordinate(self, stage_coordinate: StageCoordinate) -> Self {
        Self {
            stage_coordinate: Some(stage_coordinate),
            ..self
        }
    }

    /// Copy with the device and its chip coordinate set
    pub fn with_device(self, device: DeviceId, chip_coordinate: ChipCoordinate) -> Self {
        Self {
            device: Some(device),
            chip_coordinate: Some(chip_coordinate),
            ..self
        }
    }

    /// Calibration this pairing belongs to
    pub fn calibration(&self) -> CalibrationKey {
        self.calibration
    }

    /// Recorded stage coordinate
    pub fn stage_coordinate(&self) -> Option<StageCoordinate> {
        self.stage_coordinate
    }

    /// Device the chip coordinate belongs to
    pub fn device(&self) -> Option<DeviceId> {
        self.device
    }

    /// Recorded chip coordinate
    pub fn chip_coordinate(&self) -> Option<ChipCoordinate> {
        self.chip_coordinate
    }

    /// Whether every part is present
    pub fn is_complete(&self) -> bool {
        self.stage_coordinate.is_some() && self.device.is_some() && self.chip_coordinate.is_some()
    }

    /// Both coordinates, or the name of the first missing one
    pub(crate) fn coordinates(
        &self,
    ) -> Result<(StageCoordinate, ChipCoordinate), TransformError> {
        let stage = self.stage_coordinate.ok_or_else(|| missing("stage coordinate"))?;
        let chip = self.chip_coordinate.ok_or_else(|| missing("chip coordinate"))?;
        Ok((stage, chip))
    }

    /// All parts, or the name of the first missing one
    pub(crate) fn parts(
        &self,
    ) -> Result<(StageCoordinate, DeviceId, ChipCoordinate), TransformError> {
        let (stage, chip) = self.coordinates()?;
        let device = self.device.ok_or_else(|| missing("device"))?;
        Ok((stage, device, chip))
    }
}

fn missing(part: &str) -> TransformError {
    TransformError::IncompletePairing {
        missing: part.to_string(),
    }
}
