//! # StageKit Movement
//!
//! Calibration state machine and collision-aware mover.
//!
//! - [`Calibration`]: one stage with its axes rotation, single point and
//!   full transformation, frame-scoped position and move operations
//! - [`Mover`]: all calibrations of a setup, aggregate speed settings,
//!   arbitrated left/right moves, lift/lower and move-to-device
//! - [`stages::SimulatedStage`]: in-memory stage driver

pub mod calibration;
pub mod guard;
pub mod mover;
pub mod ordering;
pub mod stages;

pub use calibration::{Calibration, CoordinateSystemScope};
pub use guard::{ActiveFrame, Requirement};
pub use mover::{Mover, SharedMover};
pub use ordering::{plan_order, Side, SidePositions};
pub use stages::{journal, FailureInjection, Journal, JournalEntry, SimulatedStage, StageCommand};
