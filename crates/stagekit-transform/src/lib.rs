//! # StageKit Transform
//!
//! Chip/stage coordinate transformations:
//! - [`AxesRotation`]: signed permutation between chip and stage axes
//! - [`SinglePointTransformation`]: translation anchored by one pairing
//! - [`KabschRotation`]: least-squares rigid fit from three or more pairings
//!
//! All three consume [`CoordinatePairing`] values and convert between
//! [`ChipCoordinate`](stagekit_core::ChipCoordinate) and
//! [`StageCoordinate`](stagekit_core::StageCoordinate).

pub mod axes_rotation;
pub mod kabsch;
pub mod pairing;
pub mod single_point;

pub use axes_rotation::AxesRotation;
pub use kabsch::{KabschRotation, MIN_POINTS};
pub use pairing::CoordinatePairing;
pub use single_point::{BoundSinglePoint, SinglePointTransformation};

use stagekit_core::{ChipCoordinate, StageCoordinate, TransformError};

/// Common interface of a ready-to-use chip/stage mapping
pub trait Transformation {
    /// Whether conversions are currently possible
    fn is_valid(&self) -> bool;

    /// Convert a chip coordinate into the stage frame
    fn chip_to_stage(&self, chip: ChipCoordinate) -> Result<StageCoordinate, TransformError>;

    /// Convert a stage coordinate into the chip frame
    fn stage_to_chip(&self, stage: StageCoordinate) -> Result<ChipCoordinate, TransformError>;
}
