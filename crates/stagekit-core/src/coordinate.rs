//! Frame-tagged 3D coordinates
//!
//! A [`Coordinate`] carries a zero-sized frame marker so that stage and chip
//! values cannot be mixed by accident. Arithmetic is only implemented between
//! two coordinates of the same frame; combining [`StageCoordinate`] with
//! [`ChipCoordinate`], or either with the untagged [`Coordinate`], does not
//! compile.
//!
//! ```rust
//! use stagekit_core::{ChipCoordinate, StageCoordinate};
//!
//! let a = StageCoordinate::new(1.0, 2.0, 3.0);
//! let b = StageCoordinate::from_slice(&[1.0, 1.0]);
//! assert_eq!((a - b).to_array(), [0.0, 1.0, 3.0]);
//!
//! let chip = ChipCoordinate::new(4.0, 5.0, 6.0);
//! assert_eq!(chip.to_vec(), vec![4.0, 5.0, 6.0]);
//! ```
//!
//! ```rust,compile_fail
//! use stagekit_core::{ChipCoordinate, StageCoordinate};
//!
//! let _ = StageCoordinate::new(1.0, 2.0, 3.0) + ChipCoordinate::new(4.0, 5.0, 6.0);
//! ```

use crate::data::{Axis, CoordinateSystem};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Marker trait for coordinate frames
pub trait Frame:
    fmt::Debug + Clone + Copy + PartialEq + Default + Send + Sync + 'static
{
    /// Coordinate system this frame stands for
    const SYSTEM: CoordinateSystem;
    /// Human-readable frame name
    const NAME: &'static str;
}

/// Native frame of a stage's actuators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageFrame;

/// Frame fixed to the chip surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChipFrame;

/// Untagged frame for raw and legacy values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenericFrame;

impl Frame for StageFrame {
    const SYSTEM: CoordinateSystem = CoordinateSystem::Stage;
    const NAME: &'static str = "StageCoordinate";
}

impl Frame for ChipFrame {
    const SYSTEM: CoordinateSystem = CoordinateSystem::Chip;
    const NAME: &'static str = "ChipCoordinate";
}

impl Frame for GenericFrame {
    const SYSTEM: CoordinateSystem = CoordinateSystem::Generic;
    const NAME: &'static str = "Coordinate";
}

/// Three double-precision components tagged with a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Coordinate<F: Frame = GenericFrame> {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
    #[serde(skip)]
    frame: PhantomData<F>,
}

/// Coordinate in a stage's native frame
pub type StageCoordinate = Coordinate<StageFrame>;

/// Coordinate in the chip frame
pub type ChipCoordinate = Coordinate<ChipFrame>;

impl<F: Frame> Coordinate<F> {
    /// Create a coordinate from three components
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            frame: PhantomData,
        }
    }

    /// Origin of the frame
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Build from up to three values, zero-padding missing trailing
    /// components and dropping extras
    pub fn from_slice(values: &[f64]) -> Self {
        let component = |i: usize| values.get(i).copied().unwrap_or(0.0);
        Self::new(component(0), component(1), component(2))
    }

    /// Build from a fixed-size array
    pub fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    /// Unit step of `distance` along one axis
    pub fn along(axis: Axis, distance: f64) -> Self {
        let mut values = [0.0; 3];
        values[axis.index()] = distance;
        Self::from_array(values)
    }

    /// Components as an array
    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Components as a vector
    pub fn to_vec(&self) -> Vec<f64> {
        self.to_array().to_vec()
    }

    /// Component along `axis`
    pub fn component(&self, axis: Axis) -> f64 {
        self.to_array()[axis.index()]
    }

    /// Copy with a replaced z component
    pub fn with_z(self, z: f64) -> Self {
        Self::new(self.x, self.y, z)
    }

    /// Coordinate system of this value
    pub fn system(&self) -> CoordinateSystem {
        F::SYSTEM
    }

    /// Drop the frame tag
    pub fn untagged(self) -> Coordinate<GenericFrame> {
        Coordinate::new(self.x, self.y, self.z)
    }
}

impl Coordinate<GenericFrame> {
    /// Attach a frame tag to an untagged value
    pub fn tag<G: Frame>(self) -> Coordinate<G> {
        Coordinate::new(self.x, self.y, self.z)
    }
}

impl<F: Frame> Default for Coordinate<F> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<F: Frame> From<[f64; 3]> for Coordinate<F> {
    fn from(values: [f64; 3]) -> Self {
        Self::from_array(values)
    }
}

impl<F: Frame> From<Coordinate<F>> for [f64; 3] {
    fn from(coordinate: Coordinate<F>) -> Self {
        coordinate.to_array()
    }
}

impl<F: Frame> Add for Coordinate<F> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<F: Frame> Sub for Coordinate<F> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<F: Frame> AddAssign for Coordinate<F> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<F: Frame> SubAssign for Coordinate<F> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<F: Frame> Neg for Coordinate<F> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl<F: Frame> Mul<f64> for Coordinate<F> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl<F: Frame> fmt::Display for Coordinate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:.3}, {:.3}, {:.3})",
            F::NAME,
            self.x,
            self.y,
            self.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_pads_and_truncates() {
        let cases: [(&[f64], [f64; 3]); 5] = [
            (&[1.0, 2.0, 3.0, 4.0], [1.0, 2.0, 3.0]),
            (&[1.0, 2.0, 3.0], [1.0, 2.0, 3.0]),
            (&[1.0, 2.0], [1.0, 2.0, 0.0]),
            (&[1.0], [1.0, 0.0, 0.0]),
            (&[], [0.0, 0.0, 0.0]),
        ];
        for (input, expected) in cases {
            assert_eq!(StageCoordinate::from_slice(input).to_array(), expected);
            assert_eq!(ChipCoordinate::from_slice(input).to_array(), expected);
            assert_eq!(Coordinate::<GenericFrame>::from_slice(input).to_array(), expected);
        }
    }

    #[test]
    fn test_same_frame_arithmetic() {
        let sum = StageCoordinate::new(1.0, 2.0, 3.0) + StageCoordinate::new(4.0, 5.0, 6.0);
        assert_eq!(sum.to_vec(), vec![5.0, 7.0, 9.0]);
        assert_eq!(sum.system(), CoordinateSystem::Stage);

        let diff = ChipCoordinate::new(1.0, 2.0, 0.0) - ChipCoordinate::new(3.0, 4.0, 0.0);
        assert_eq!(diff.to_vec(), vec![-2.0, -2.0, 0.0]);
        assert_eq!(diff.system(), CoordinateSystem::Chip);

        let mut acc = ChipCoordinate::zero();
        acc += ChipCoordinate::new(1.0, 1.0, 1.0);
        acc -= ChipCoordinate::new(0.5, 0.0, 2.0);
        assert_eq!(acc.to_array(), [0.5, 1.0, -1.0]);
        assert_eq!((-acc * 2.0).to_array(), [-1.0, -2.0, 2.0]);
    }

    #[test]
    fn test_tagging_generic() {
        let raw = Coordinate::<GenericFrame>::new(1.0, 2.0, 3.0);
        let stage: StageCoordinate = raw.tag();
        assert_eq!(stage.system(), CoordinateSystem::Stage);
        assert_eq!(stage.untagged(), raw);
    }

    #[test]
    fn test_along_axis() {
        assert_eq!(ChipCoordinate::along(Axis::Y, 5.0).to_array(), [0.0, 5.0, 0.0]);
        assert_eq!(ChipCoordinate::along(Axis::Z, -2.0).component(Axis::Z), -2.0);
    }

    #[test]
    fn test_display() {
        let c = StageCoordinate::new(1.0, 2.5, -3.0);
        assert_eq!(c.to_string(), "StageCoordinate(1.000, 2.500, -3.000)");
    }

    #[test]
    fn test_serde_round_trip_keeps_components() {
        let c = ChipCoordinate::new(1.0, 2.0, 3.0);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0,"z":3.0}"#);
        let back: ChipCoordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
