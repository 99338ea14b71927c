//! Single point transformation
//!
//! Translation-only chip/stage mapping anchored by one pairing. The offset
//! is computed with the axes rotation current at update time. Changing the
//! rotation afterwards does not invalidate the stored offset: whoever
//! updates the rotation must reset this transformation as well.

use crate::{AxesRotation, CoordinatePairing, Transformation};
use stagekit_core::{ChipCoordinate, StageCoordinate, TransformError};
use std::fmt;
use tracing::debug;

/// One-point anchored chip/stage translation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SinglePointTransformation {
    pairing: Option<CoordinatePairing>,
    stage_coordinate: Option<StageCoordinate>,
    chip_coordinate: Option<ChipCoordinate>,
    offset: Option<StageCoordinate>,
}

impl SinglePointTransformation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the anchor and recompute the stage offset
    ///
    /// Fails when either coordinate is missing or the rotation is invalid;
    /// the previous anchor is kept in that case.
    pub fn update(
        &mut self,
        pairing: &CoordinatePairing,
        rotation: &AxesRotation,
    ) -> Result<(), TransformError> {
        let (stage, chip) = pairing.coordinates()?;
        let offset = rotation.rotate_chip_to_stage(chip)? - stage;

        debug!(
            "Single point fixed for {}: stage {} / chip {}, offset {}",
            pairing.calibration(),
            stage,
            chip,
            offset
        );

        self.pairing = Some(*pairing);
        self.stage_coordinate = Some(stage);
        self.chip_coordinate = Some(chip);
        self.offset = Some(offset);
        Ok(())
    }

    /// Whether an anchor is stored, regardless of the rotation
    pub fn has_fixed_point(&self) -> bool {
        self.offset.is_some()
    }

    /// Valid iff an offset exists and the rotation is valid
    pub fn is_valid(&self, rotation: &AxesRotation) -> bool {
        self.offset.is_some() && rotation.is_valid()
    }

    /// Chip to stage: `R * chip - offset`
    pub fn chip_to_stage(
        &self,
        chip: ChipCoordinate,
        rotation: &AxesRotation,
    ) -> Result<StageCoordinate, TransformError> {
        let offset = self.valid_offset(rotation)?;
        Ok(rotation.rotate_chip_to_stage(chip)? - offset)
    }

    /// Stage to chip: `R^-1 * (stage + offset)`
    pub fn stage_to_chip(
        &self,
        stage: StageCoordinate,
        rotation: &AxesRotation,
    ) -> Result<ChipCoordinate, TransformError> {
        let offset = self.valid_offset(rotation)?;
        rotation.rotate_stage_to_chip(stage + offset)
    }

    /// View that applies this transformation with a fixed rotation
    pub fn with_rotation<'a>(&'a self, rotation: &'a AxesRotation) -> BoundSinglePoint<'a> {
        BoundSinglePoint {
            transformation: self,
            rotation,
        }
    }

    /// Forget the anchor and the offset
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Pairing the offset was computed from
    pub fn pairing(&self) -> Option<&CoordinatePairing> {
        self.pairing.as_ref()
    }

    /// Stage-space offset
    pub fn offset(&self) -> Option<StageCoordinate> {
        self.offset
    }

    fn valid_offset(&self, rotation: &AxesRotation) -> Result<StageCoordinate, TransformError> {
        match self.offset {
            Some(offset) if rotation.is_valid() => Ok(offset),
            _ => Err(TransformError::NotValid {
                transformation: "single point transformation".to_string(),
            }),
        }
    }
}

impl fmt::Display for SinglePointTransformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.stage_coordinate, self.chip_coordinate) {
            (Some(stage), Some(chip)) => write!(
                f,
                "Stage-Coordinate {} fixed with Chip-Coordinate {}",
                stage, chip
            ),
            _ => write!(f, "No single point fixed"),
        }
    }
}

/// Single point transformation paired with the rotation it applies
#[derive(Debug, Clone, Copy)]
pub struct BoundSinglePoint<'a> {
    transformation: &'a SinglePointTransformation,
    rotation: &'a AxesRotation,
}

impl Transformation for BoundSinglePoint<'_> {
    fn is_valid(&self) -> bool {
        self.transformation.is_valid(self.rotation)
    }

    fn chip_to_stage(&self, chip: ChipCoordinate) -> Result<StageCoordinate, TransformError> {
        self.transformation.chip_to_stage(chip, self.rotation)
    }

    fn stage_to_chip(&self, stage: StageCoordinate) -> Result<ChipCoordinate, TransformError> {
        self.transformation.stage_to_chip(stage, self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagekit_core::{Axis, CalibrationKey, DeviceId, DevicePort, Direction, Orientation};

    fn pairing(stage: [f64; 3], chip: [f64; 3]) -> CoordinatePairing {
        CoordinatePairing::new(
            CalibrationKey::new(Orientation::Left, DevicePort::Input),
            StageCoordinate::from_array(stage),
            DeviceId(1),
            ChipCoordinate::from_array(chip),
        )
    }

    #[test]
    fn test_identity_rotation_anchor() {
        let rotation = AxesRotation::new();
        let mut transformation = SinglePointTransformation::new();
        transformation
            .update(&pairing([1.0, 2.0, 3.0], [4.0, 5.0, 6.0]), &rotation)
            .unwrap();

        assert!(transformation.is_valid(&rotation));
        assert_eq!(
            transformation.offset(),
            Some(StageCoordinate::new(3.0, 3.0, 3.0))
        );
        assert_eq!(
            transformation
                .chip_to_stage(ChipCoordinate::new(4.0, 5.0, 6.0), &rotation)
                .unwrap(),
            StageCoordinate::new(1.0, 2.0, 3.0)
        );
        assert_eq!(
            transformation
                .stage_to_chip(StageCoordinate::new(1.0, 2.0, 3.0), &rotation)
                .unwrap(),
            ChipCoordinate::new(4.0, 5.0, 6.0)
        );
    }

    #[test]
    fn test_rotated_anchor_round_trip() {
        let mut rotation = AxesRotation::new();
        rotation.update(Axis::X, Direction::Negative, Axis::Y);
        rotation.update(Axis::Y, Direction::Positive, Axis::X);

        let mut transformation = SinglePointTransformation::new();
        transformation
            .update(&pairing([10.0, 20.0, 30.0], [1.0, 2.0, 0.0]), &rotation)
            .unwrap();

        let bound = transformation.with_rotation(&rotation);
        assert!(bound.is_valid());
        assert_eq!(
            bound.chip_to_stage(ChipCoordinate::new(1.0, 2.0, 0.0)).unwrap(),
            StageCoordinate::new(10.0, 20.0, 30.0)
        );
        let chip = ChipCoordinate::new(-7.5, 3.25, 12.0);
        let back = bound.stage_to_chip(bound.chip_to_stage(chip).unwrap()).unwrap();
        assert_eq!(back, chip);
    }

    #[test]
    fn test_incomplete_pairing_is_rejected() {
        let rotation = AxesRotation::new();
        let mut transformation = SinglePointTransformation::new();
        let partial = CoordinatePairing::partial(CalibrationKey::new(
            Orientation::Right,
            DevicePort::Output,
        ))
        .with_stage_coordinate(StageCoordinate::zero());

        assert!(matches!(
            transformation.update(&partial, &rotation),
            Err(TransformError::IncompletePairing { .. })
        ));
        assert!(!transformation.has_fixed_point());
    }

    #[test]
    fn test_invalid_without_anchor_or_rotation() {
        let mut rotation = AxesRotation::new();
        let mut transformation = SinglePointTransformation::new();
        assert!(!transformation.is_valid(&rotation));
        assert!(transformation
            .chip_to_stage(ChipCoordinate::zero(), &rotation)
            .is_err());

        transformation
            .update(&pairing([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]), &rotation)
            .unwrap();
        rotation.update(Axis::Z, Direction::Positive, Axis::X);
        assert!(transformation.has_fixed_point());
        assert!(!transformation.is_valid(&rotation));
    }

    #[test]
    fn test_reset_and_display() {
        let rotation = AxesRotation::new();
        let mut transformation = SinglePointTransformation::new();
        assert_eq!(transformation.to_string(), "No single point fixed");

        transformation
            .update(&pairing([1.0, 2.0, 3.0], [4.0, 5.0, 6.0]), &rotation)
            .unwrap();
        assert!(transformation.to_string().starts_with("Stage-Coordinate"));

        transformation.reset();
        assert!(transformation.pairing().is_none());
        assert!(!transformation.is_valid(&rotation));
    }
}
