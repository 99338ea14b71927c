//! Kabsch rotation
//!
//! Least-squares rigid rotation plus translation between chip and stage,
//! fit from at least [`MIN_POINTS`] pairings with distinct devices. Every
//! update refits over the full accumulated point set.
//!
//! The rotation `R` is oriented stage to chip:
//!
//! ```text
//! stage_to_chip(p) = R * (p - stage_centroid) + chip_centroid
//! chip_to_stage(p) = R^T * (p - chip_centroid) + stage_centroid
//! ```

use crate::{CoordinatePairing, Transformation};
use nalgebra::{Matrix3, Vector3};
use stagekit_core::{ChipCoordinate, Coordinate, Frame, StageCoordinate, TransformError};
use std::fmt;
use tracing::debug;

/// Minimum number of pairings for a valid fit
pub const MIN_POINTS: usize = 3;

/// Result of one least-squares fit
#[derive(Debug, Clone, PartialEq)]
struct Fit {
    rotation: Matrix3<f64>,
    rmsd: f64,
    stage_centroid: Vector3<f64>,
    chip_centroid: Vector3<f64>,
}

/// Least-squares chip/stage rotation and translation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KabschRotation {
    pairings: Vec<CoordinatePairing>,
    stage_points: Vec<Vector3<f64>>,
    chip_points: Vec<Vector3<f64>>,
    fit: Option<Fit>,
}

impl KabschRotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pairing and refit
    ///
    /// Rejects incomplete pairings and pairings whose device is already
    /// stored. The stored state is untouched when the update fails.
    pub fn update(&mut self, pairing: &CoordinatePairing) -> Result<(), TransformError> {
        let (stage, device, chip) = pairing.parts()?;
        if self.pairings.iter().any(|p| p.device() == Some(device)) {
            return Err(TransformError::DuplicateDevice { device: device.0 });
        }

        let mut stage_points = self.stage_points.clone();
        let mut chip_points = self.chip_points.clone();
        stage_points.push(to_vector(stage));
        chip_points.push(to_vector(chip));

        let fit = fit(&stage_points, &chip_points)?;
        debug!(
            "Kabsch fit for {} with {} points, RMSD {:.6}",
            pairing.calibration(),
            stage_points.len(),
            fit.rmsd
        );

        self.pairings.push(*pairing);
        self.stage_points = stage_points;
        self.chip_points = chip_points;
        self.fit = Some(fit);
        Ok(())
    }

    /// Valid iff at least [`MIN_POINTS`] pairings are stored
    pub fn is_valid(&self) -> bool {
        self.pairings.len() >= MIN_POINTS && self.fit.is_some()
    }

    pub fn chip_to_stage(&self, chip: ChipCoordinate) -> Result<StageCoordinate, TransformError> {
        let fit = self.valid_fit()?;
        let v = fit.rotation.transpose() * (to_vector(chip) - fit.chip_centroid)
            + fit.stage_centroid;
        Ok(from_vector(v))
    }

    pub fn stage_to_chip(&self, stage: StageCoordinate) -> Result<ChipCoordinate, TransformError> {
        let fit = self.valid_fit()?;
        let v = fit.rotation * (to_vector(stage) - fit.stage_centroid) + fit.chip_centroid;
        Ok(from_vector(v))
    }

    /// Drop all pairings and the fit
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Stored pairings in insertion order
    pub fn pairings(&self) -> &[CoordinatePairing] {
        &self.pairings
    }

    /// Root-mean-square deviation of the fit, once valid
    pub fn rmsd(&self) -> Option<f64> {
        self.valid_fit().ok().map(|fit| fit.rmsd)
    }

    /// Stage to chip rotation, once valid
    pub fn rotation_matrix(&self) -> Option<&Matrix3<f64>> {
        self.valid_fit().ok().map(|fit| &fit.rotation)
    }

    /// Centroid of the stage points
    pub fn stage_offset(&self) -> Option<StageCoordinate> {
        self.fit.as_ref().map(|fit| from_vector(fit.stage_centroid))
    }

    /// Centroid of the chip points
    pub fn chip_offset(&self) -> Option<ChipCoordinate> {
        self.fit.as_ref().map(|fit| from_vector(fit.chip_centroid))
    }

    fn valid_fit(&self) -> Result<&Fit, TransformError> {
        match &self.fit {
            Some(fit) if self.pairings.len() >= MIN_POINTS => Ok(fit),
            _ => Err(TransformError::NotValid {
                transformation: "Kabsch rotation".to_string(),
            }),
        }
    }
}

impl Transformation for KabschRotation {
    fn is_valid(&self) -> bool {
        KabschRotation::is_valid(self)
    }

    fn chip_to_stage(&self, chip: ChipCoordinate) -> Result<StageCoordinate, TransformError> {
        KabschRotation::chip_to_stage(self, chip)
    }

    fn stage_to_chip(&self, stage: StageCoordinate) -> Result<ChipCoordinate, TransformError> {
        KabschRotation::stage_to_chip(self, stage)
    }
}

impl fmt::Display for KabschRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rmsd() {
            Some(rmsd) => write!(
                f,
                "Rotation defined with {} points (RMSD: {:.4})",
                self.pairings.len(),
                rmsd
            ),
            None => write!(
                f,
                "Rotation not yet defined ({} of {} points)",
                self.pairings.len(),
                MIN_POINTS
            ),
        }
    }
}

fn to_vector<F: Frame>(coordinate: Coordinate<F>) -> Vector3<f64> {
    Vector3::from(coordinate.to_array())
}

fn from_vector<F: Frame>(v: Vector3<f64>) -> Coordinate<F> {
    Coordinate::new(v.x, v.y, v.z)
}

fn centroid(points: &[Vector3<f64>]) -> Vector3<f64> {
    points.iter().sum::<Vector3<f64>>() / points.len() as f64
}

/// Rotation minimizing sum |(chip - chip_c) - R (stage - stage_c)|^2
fn fit(stage: &[Vector3<f64>], chip: &[Vector3<f64>]) -> Result<Fit, TransformError> {
    let stage_centroid = centroid(stage);
    let chip_centroid = centroid(chip);

    let mut h = Matrix3::zeros();
    for (s, c) in stage.iter().zip(chip) {
        h += (s - stage_centroid) * (c - chip_centroid).transpose();
    }

    let svd = h.svd(true, true);
    let u = svd.u.ok_or(TransformError::DecompositionFailed)?;
    let v_t = svd.v_t.ok_or(TransformError::DecompositionFailed)?;

    // Flip the smallest singular direction to avoid a reflection
    let d = if (v_t.transpose() * u.transpose()).determinant() < 0.0 {
        -1.0
    } else {
        1.0
    };
    let correction = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, d));
    let rotation = v_t.transpose() * correction * u.transpose();

    let squared: f64 = stage
        .iter()
        .zip(chip)
        .map(|(s, c)| (rotation * (s - stage_centroid) - (c - chip_centroid)).norm_squared())
        .sum();
    let rmsd = (squared / stage.len() as f64).sqrt();

    Ok(Fit {
        rotation,
        rmsd,
        stage_centroid,
        chip_centroid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Rotation3;
    use stagekit_core::{CalibrationKey, DeviceId, DevicePort, Orientation};

    const EPS: f64 = 1e-8;

    fn key() -> CalibrationKey {
        CalibrationKey::new(Orientation::Left, DevicePort::Input)
    }

    fn pairing(device: u64, stage: [f64; 3], chip: [f64; 3]) -> CoordinatePairing {
        CoordinatePairing::new(
            key(),
            StageCoordinate::from_array(stage),
            DeviceId(device),
            ChipCoordinate::from_array(chip),
        )
    }

    /// Chip points generated from stage points by a known rigid motion
    fn rigid_pairings() -> (Rotation3<f64>, Vector3<f64>, Vec<CoordinatePairing>) {
        let rotation = Rotation3::from_euler_angles(0.02, -0.01, 0.3);
        let translation = Vector3::new(-1200.0, 350.0, 15.0);
        let stage = [
            [0.0, 0.0, 0.0],
            [1000.0, 0.0, 0.0],
            [0.0, 800.0, 0.0],
            [500.0, 400.0, 50.0],
        ];
        let pairings = stage
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let c = rotation * Vector3::from(*s) + translation;
                pairing(i as u64, *s, [c.x, c.y, c.z])
            })
            .collect();
        (rotation, translation, pairings)
    }

    fn assert_close<F: Frame>(a: Coordinate<F>, b: Coordinate<F>, eps: f64) {
        let diff = (to_vector(a) - to_vector(b)).norm();
        assert!(diff < eps, "{} != {} (diff {})", a, b, diff);
    }

    #[test]
    fn test_valid_from_three_points() {
        let (_, _, pairings) = rigid_pairings();
        let mut kabsch = KabschRotation::new();
        assert!(!kabsch.is_valid());

        for (count, p) in pairings.iter().take(3).enumerate() {
            assert!(!kabsch.is_valid(), "valid with {} points", count);
            kabsch.update(p).unwrap();
        }
        assert!(kabsch.is_valid());
        assert_eq!(kabsch.pairings().len(), 3);
    }

    #[test]
    fn test_duplicate_device_is_rejected() {
        let mut kabsch = KabschRotation::new();
        kabsch
            .update(&pairing(7, [0.0, 0.0, 0.0], [1.0, 1.0, 0.0]))
            .unwrap();
        let err = kabsch
            .update(&pairing(7, [5.0, 0.0, 0.0], [6.0, 1.0, 0.0]))
            .unwrap_err();
        assert_eq!(err, TransformError::DuplicateDevice { device: 7 });
        assert_eq!(kabsch.pairings().len(), 1);
    }

    #[test]
    fn test_incomplete_pairing_is_rejected() {
        let mut kabsch = KabschRotation::new();
        let partial = CoordinatePairing::partial(key())
            .with_stage_coordinate(StageCoordinate::zero());
        assert!(matches!(
            kabsch.update(&partial),
            Err(TransformError::IncompletePairing { .. })
        ));
        assert!(kabsch.pairings().is_empty());
    }

    #[test]
    fn test_recovers_rigid_motion() {
        let (rotation, translation, pairings) = rigid_pairings();
        let mut kabsch = KabschRotation::new();
        for p in &pairings {
            kabsch.update(p).unwrap();
        }

        let fitted = kabsch.rotation_matrix().unwrap();
        assert!((fitted - rotation.matrix()).norm() < EPS);
        assert!(kabsch.rmsd().unwrap() < 1e-6);

        let stage = StageCoordinate::new(250.0, -125.0, 10.0);
        let expected = rotation * to_vector(stage) + translation;
        assert_close(
            kabsch.stage_to_chip(stage).unwrap(),
            from_vector::<stagekit_core::ChipFrame>(expected),
            1e-6,
        );
    }

    #[test]
    fn test_round_trip_both_directions() {
        let (_, _, pairings) = rigid_pairings();
        let mut kabsch = KabschRotation::new();
        for p in &pairings {
            kabsch.update(p).unwrap();
        }

        let stage = StageCoordinate::new(-40.0, 3000.0, 7.5);
        let back = kabsch
            .chip_to_stage(kabsch.stage_to_chip(stage).unwrap())
            .unwrap();
        assert_close(back, stage, 1e-6);

        let chip = ChipCoordinate::new(12.0, -8.0, 0.0);
        let back = kabsch
            .stage_to_chip(kabsch.chip_to_stage(chip).unwrap())
            .unwrap();
        assert_close(back, chip, 1e-6);
    }

    #[test]
    fn test_mirrored_points_yield_proper_rotation() {
        let mut kabsch = KabschRotation::new();
        let stage = [
            [0.0, 0.0, 0.0],
            [100.0, 0.0, 0.0],
            [0.0, 100.0, 0.0],
            [0.0, 0.0, 100.0],
        ];
        for (i, s) in stage.iter().enumerate() {
            // mirror in z
            kabsch
                .update(&pairing(i as u64, *s, [s[0], s[1], -s[2]]))
                .unwrap();
        }

        let determinant = kabsch.rotation_matrix().unwrap().determinant();
        assert!((determinant - 1.0).abs() < EPS);
        assert!(kabsch.rmsd().unwrap() > 1.0);
    }

    #[test]
    fn test_invalid_transform_errors() {
        let mut kabsch = KabschRotation::new();
        kabsch
            .update(&pairing(1, [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]))
            .unwrap();
        assert!(kabsch.rmsd().is_none());
        assert!(kabsch.stage_offset().is_some());
        assert_eq!(
            kabsch.chip_to_stage(ChipCoordinate::zero()).unwrap_err(),
            TransformError::NotValid {
                transformation: "Kabsch rotation".to_string()
            }
        );
        assert_eq!(kabsch.to_string(), "Rotation not yet defined (1 of 3 points)");
    }

    #[test]
    fn test_reset_clears_everything() {
        let (_, _, pairings) = rigid_pairings();
        let mut kabsch = KabschRotation::new();
        for p in &pairings {
            kabsch.update(p).unwrap();
        }
        assert!(kabsch.to_string().starts_with("Rotation defined with 4 points"));

        kabsch.reset();
        assert_eq!(kabsch, KabschRotation::new());
        assert!(kabsch.chip_offset().is_none());
    }
}
