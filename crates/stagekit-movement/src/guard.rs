//! Preconditions of frame-dependent calibration operations
//!
//! Each guarded operation names the minimum calibration state it needs per
//! coordinate system. The check runs at the top of the operation.

use stagekit_core::{CalibrationError, CoordinateSystem, Frame, State};

/// Minimum states of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub operation: &'static str,
    pub stage: State,
    pub chip: State,
}

pub const POSITION: Requirement = Requirement {
    operation: "position",
    stage: State::Connected,
    chip: State::SinglePointFixed,
};

pub const MOVE_RELATIVE: Requirement = Requirement {
    operation: "move_relative",
    stage: State::Connected,
    chip: State::CoordinateSystemFixed,
};

pub const MOVE_ABSOLUTE: Requirement = Requirement {
    operation: "move_absolute",
    stage: State::Connected,
    chip: State::SinglePointFixed,
};

/// Coordinate system a guarded operation may run in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFrame {
    Stage,
    Chip,
}

impl From<ActiveFrame> for CoordinateSystem {
    fn from(frame: ActiveFrame) -> Self {
        match frame {
            ActiveFrame::Stage => CoordinateSystem::Stage,
            ActiveFrame::Chip => CoordinateSystem::Chip,
        }
    }
}

/// Check the active coordinate system and the state against a requirement
pub fn require_state(
    requirement: &Requirement,
    active: Option<CoordinateSystem>,
    state: State,
) -> Result<ActiveFrame, CalibrationError> {
    let operation = requirement.operation.to_string();
    let system = active.ok_or_else(|| CalibrationError::NoCoordinateSystem {
        operation: operation.clone(),
    })?;

    let (frame, required) = match system {
        CoordinateSystem::Stage => (ActiveFrame::Stage, requirement.stage),
        CoordinateSystem::Chip => (ActiveFrame::Chip, requirement.chip),
        CoordinateSystem::Generic => {
            return Err(CalibrationError::UnsupportedCoordinateSystem { operation, system })
        }
    };

    if state < required {
        return Err(CalibrationError::InsufficientState {
            operation,
            required,
            system,
        });
    }
    Ok(frame)
}

/// Reject a coordinate tagged with another frame than the active one
///
/// Untagged coordinates are accepted in either frame.
pub fn require_frame<F: Frame>(
    requirement: &Requirement,
    active: ActiveFrame,
) -> Result<(), CalibrationError> {
    let expected = CoordinateSystem::from(active);
    if F::SYSTEM == CoordinateSystem::Generic || F::SYSTEM == expected {
        Ok(())
    } else {
        Err(CalibrationError::CoordinateSystemMismatch {
            operation: requirement.operation.to_string(),
            expected,
            actual: F::SYSTEM,
        })
    }
}
