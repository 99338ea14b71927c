//! Collision-avoidance ordering for the left and right stage
//!
//! The left and right stage share the chip x axis. Before and after every
//! coordinated move the left stage must stay strictly left of the right
//! stage minus a clearance. A plan that violates this for the start or the
//! target configuration is rejected before anything moves.

use stagekit_core::MoverError;
use std::fmt;

/// One of the two stages that can collide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// x positions of both stages, in chip coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SidePositions {
    pub left: f64,
    pub right: f64,
}

/// Command order for a coordinated move
///
/// A side without a target keeps its position. Both the start and the
/// effective target configuration must keep the clearance.
pub fn plan_order(
    current: SidePositions,
    target_left: Option<f64>,
    target_right: Option<f64>,
    clearance: f64,
) -> Result<Vec<Side>, MoverError> {
    if clearance.is_nan() || clearance <= 0.0 {
        return Err(MoverError::CollisionPrecondition {
            reason: format!(
                "clearance must be greater than 0, got {}; otherwise the half-planes of the fibers overlap",
                clearance
            ),
        });
    }

    check_separation("start", current, clearance)?;
    let target = SidePositions {
        left: target_left.unwrap_or(current.left),
        right: target_right.unwrap_or(current.right),
    };
    check_separation("target", target, clearance)?;

    let (delta_left, delta_right) = match (target_left, target_right) {
        (None, None) => return Ok(Vec::new()),
        (Some(_), None) => return Ok(vec![Side::Left]),
        (None, Some(_)) => return Ok(vec![Side::Right]),
        (Some(left), Some(right)) => (left - current.left, right - current.right),
    };

    if delta_left < 0.0 && delta_right < 0.0 {
        // left retreats first, away from right
        Ok(vec![Side::Left, Side::Right])
    } else if delta_left < 0.0 && delta_right >= 0.0 {
        // both move apart
        Ok(vec![Side::Left, Side::Right])
    } else if delta_left >= 0.0 && delta_right < 0.0 {
        // right retreats before left approaches
        Ok(vec![Side::Right, Side::Left])
    } else if delta_left >= 0.0 && delta_right >= 0.0 {
        Ok(vec![Side::Right, Side::Left])
    } else {
        Err(MoverError::UnreachableOrdering {
            delta_left,
            delta_right,
        })
    }
}

fn check_separation(
    configuration: &str,
    positions: SidePositions,
    clearance: f64,
) -> Result<(), MoverError> {
    if positions.left < positions.right - clearance {
        Ok(())
    } else {
        Err(MoverError::CollisionPrecondition {
            reason: format!(
                "{} positions not far enough apart: left x={} must be below right x={} minus clearance {}",
                configuration, positions.left, positions.right, clearance
            ),
        })
    }
}
