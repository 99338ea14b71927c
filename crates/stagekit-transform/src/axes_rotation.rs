//! Axes rotation
//!
//! Signed permutation between chip axes and stage axes. Column `i` of the
//! matrix is the signed stage unit vector that chip axis `i` maps onto, so
//! `stage = M * chip`. Updates never reject a duplicate assignment; validity
//! is recomputed on demand and conversions fail while the matrix is not a
//! signed permutation.

use crate::Transformation;
use nalgebra::{Matrix3, Vector3};
use stagekit_core::{Axis, ChipCoordinate, Direction, StageCoordinate, TransformError};
use std::fmt;

/// Signed permutation mapping between chip and stage axes
#[derive(Debug, Clone, PartialEq)]
pub struct AxesRotation {
    matrix: Matrix3<f64>,
}

impl AxesRotation {
    /// Identity mapping: chip axis i to stage axis i, positive
    pub fn new() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Map `chip_axis` onto `direction * stage_axis`
    pub fn update(&mut self, chip_axis: Axis, direction: Direction, stage_axis: Axis) {
        let mut column = Vector3::zeros();
        column[stage_axis.index()] = direction.value();
        self.matrix.set_column(chip_axis.index(), &column);
    }

    /// True iff every row and every column has exactly one signed unit entry
    pub fn is_valid(&self) -> bool {
        (0..3).all(|i| {
            let row: f64 = self.matrix.row(i).iter().map(|v| v.abs()).sum();
            let column: f64 = self.matrix.column(i).iter().map(|v| v.abs()).sum();
            row == 1.0 && column == 1.0
        })
    }

    /// Stage axis and direction currently assigned to `chip_axis`
    pub fn mapped_stage_axis(&self, chip_axis: Axis) -> Option<(Direction, Axis)> {
        let column = self.matrix.column(chip_axis.index());
        let mut assigned = Axis::ALL.iter().filter(|axis| column[axis.index()] != 0.0);
        let stage_axis = *assigned.next()?;
        if assigned.next().is_some() {
            return None;
        }
        let direction = if column[stage_axis.index()] > 0.0 {
            Direction::Positive
        } else {
            Direction::Negative
        };
        Some((direction, stage_axis))
    }

    /// Rotate a chip vector into the stage frame
    pub fn rotate_chip_to_stage(
        &self,
        chip: ChipCoordinate,
    ) -> Result<StageCoordinate, TransformError> {
        self.ensure_valid()?;
        let v = self.matrix * Vector3::from(chip.to_array());
        Ok(StageCoordinate::new(v.x, v.y, v.z))
    }

    /// Rotate a stage vector into the chip frame
    pub fn rotate_stage_to_chip(
        &self,
        stage: StageCoordinate,
    ) -> Result<ChipCoordinate, TransformError> {
        self.ensure_valid()?;
        // inverse of a signed permutation is its transpose
        let v = self.matrix.transpose() * Vector3::from(stage.to_array());
        Ok(ChipCoordinate::new(v.x, v.y, v.z))
    }

    /// Back to the identity mapping
    pub fn reset(&mut self) {
        self.matrix = Matrix3::identity();
    }

    /// Current matrix
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    fn ensure_valid(&self) -> Result<(), TransformError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(TransformError::InvalidAxesRotation)
        }
    }
}

impl Default for AxesRotation {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformation for AxesRotation {
    fn is_valid(&self) -> bool {
        AxesRotation::is_valid(self)
    }

    fn chip_to_stage(&self, chip: ChipCoordinate) -> Result<StageCoordinate, TransformError> {
        self.rotate_chip_to_stage(chip)
    }

    fn stage_to_chip(&self, stage: StageCoordinate) -> Result<ChipCoordinate, TransformError> {
        self.rotate_stage_to_chip(stage)
    }
}

impl fmt::Display for AxesRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Axis::ALL
            .iter()
            .map(|chip_axis| match self.mapped_stage_axis(*chip_axis) {
                Some((Direction::Positive, stage_axis)) => {
                    format!("Chip {} -> Stage +{}", chip_axis, stage_axis)
                }
                Some((Direction::Negative, stage_axis)) => {
                    format!("Chip {} -> Stage -{}", chip_axis, stage_axis)
                }
                None => format!("Chip {} -> unassigned", chip_axis),
            })
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(rotation: &AxesRotation) -> [[f64; 3]; 3] {
        let m = rotation.matrix();
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    #[test]
    fn test_default_is_identity() {
        let rotation = AxesRotation::new();
        assert_eq!(*rotation.matrix(), Matrix3::identity());
        assert!(rotation.is_valid());
    }

    #[test]
    fn test_double_assignment_is_invalid_until_resolved() {
        let mut rotation = AxesRotation::new();
        rotation.update(Axis::X, Direction::Positive, Axis::Y);
        assert!(!rotation.is_valid());
        assert_eq!(
            rotation.mapped_stage_axis(Axis::X),
            Some((Direction::Positive, Axis::Y))
        );
        assert!(rotation.rotate_chip_to_stage(ChipCoordinate::zero()).is_err());

        rotation.update(Axis::Y, Direction::Positive, Axis::X);
        assert!(rotation.is_valid());
        assert_eq!(
            rotation.mapped_stage_axis(Axis::Y),
            Some((Direction::Positive, Axis::X))
        );
    }

    #[test]
    fn test_double_z_assignment() {
        let mut rotation = AxesRotation::new();
        rotation.update(Axis::Z, Direction::Positive, Axis::Y);
        assert!(!rotation.is_valid());

        rotation.update(Axis::Y, Direction::Positive, Axis::Z);
        assert!(rotation.is_valid());
        assert_eq!(
            rotation.mapped_stage_axis(Axis::Y),
            Some((Direction::Positive, Axis::Z))
        );
    }

    #[test]
    fn test_switch_x_and_y_axis() {
        let mut rotation = AxesRotation::new();
        rotation.update(Axis::X, Direction::Negative, Axis::Y);
        assert_eq!(
            rows(&rotation),
            [[0.0, 0.0, 0.0], [-1.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
        );
        assert!(!rotation.is_valid());

        rotation.update(Axis::Y, Direction::Positive, Axis::X);
        assert_eq!(
            rows(&rotation),
            [[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]
        );
        assert!(rotation.is_valid());

        let stage = rotation
            .rotate_chip_to_stage(ChipCoordinate::new(1.0, 2.0, 3.0))
            .unwrap();
        assert_eq!(stage.to_array(), [2.0, -1.0, 3.0]);

        let chip = rotation
            .rotate_stage_to_chip(StageCoordinate::new(1.0, 2.0, 3.0))
            .unwrap();
        assert_eq!(chip.to_array(), [-2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_switch_x_and_z_axis() {
        let mut rotation = AxesRotation::new();
        rotation.update(Axis::X, Direction::Positive, Axis::Z);
        assert!(!rotation.is_valid());

        rotation.update(Axis::Z, Direction::Negative, Axis::X);
        assert_eq!(
            rows(&rotation),
            [[0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]
        );
        assert!(rotation.is_valid());

        let stage = rotation
            .rotate_chip_to_stage(ChipCoordinate::new(1.0, 2.0, 3.0))
            .unwrap();
        assert_eq!(stage.to_array(), [-3.0, 2.0, 1.0]);

        let chip = rotation
            .rotate_stage_to_chip(StageCoordinate::new(1.0, 2.0, 3.0))
            .unwrap();
        assert_eq!(chip.to_array(), [3.0, 2.0, -1.0]);
    }

    #[test]
    fn test_switch_y_and_z_axis() {
        let mut rotation = AxesRotation::new();
        rotation.update(Axis::Z, Direction::Negative, Axis::Y);
        rotation.update(Axis::Y, Direction::Positive, Axis::Z);
        assert!(rotation.is_valid());

        let stage = rotation
            .rotate_chip_to_stage(ChipCoordinate::new(1.0, 2.0, 3.0))
            .unwrap();
        assert_eq!(stage.to_array(), [1.0, -3.0, 2.0]);

        let chip = rotation
            .rotate_stage_to_chip(StageCoordinate::new(1.0, 2.0, 3.0))
            .unwrap();
        assert_eq!(chip.to_array(), [1.0, 3.0, -2.0]);
    }

    #[test]
    fn test_reset_restores_identity() {
        let mut rotation = AxesRotation::new();
        rotation.update(Axis::X, Direction::Negative, Axis::Z);
        rotation.reset();
        assert_eq!(rotation, AxesRotation::new());
    }

    #[test]
    fn test_display() {
        let mut rotation = AxesRotation::new();
        rotation.update(Axis::X, Direction::Negative, Axis::Y);
        rotation.update(Axis::Y, Direction::Positive, Axis::X);
        assert_eq!(
            rotation.to_string(),
            "Chip X -> Stage -Y, Chip Y -> Stage +X, Chip Z -> Stage +Z"
        );
    }
}
