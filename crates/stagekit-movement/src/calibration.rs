//! Calibration of one stage
//!
//! A calibration owns the three chip/stage transformations of a stage and
//! derives an ordered [`State`] from their validity. Frame-dependent
//! operations run inside a coordinate system scope and check the state
//! required for that frame first.
//!
//! Changing the axes rotation does not reset the single point
//! transformation. Callers that change the rotation after a single point
//! was fixed must reset it themselves (the mover does).

use crate::guard::{self, ActiveFrame, Requirement};
use stagekit_core::{
    check_speed, Axis, CalibrationKey, ChipCoordinate, ChipFrame, Coordinate, CoordinateSystem,
    DevicePort, Direction, EventDispatcher, Frame, MovementEvent, Orientation, Result,
    SharedStage, StageCoordinate, StageFrame, State,
};
use stagekit_transform::{
    AxesRotation, CoordinatePairing, KabschRotation, SinglePointTransformation,
};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Calibration of one stage at an orientation and port
pub struct Calibration {
    stage: SharedStage,
    orientation: Orientation,
    port: DevicePort,
    axes_rotation: AxesRotation,
    single_point: SinglePointTransformation,
    full: KabschRotation,
    state: State,
    coordinate_system: Option<CoordinateSystem>,
    events: Option<EventDispatcher>,
}

impl Calibration {
    /// New calibration; `Connected` if the stage has an open connection
    pub fn new(stage: SharedStage, orientation: Orientation, port: DevicePort) -> Self {
        let state = if stage.lock().is_connected() {
            State::Connected
        } else {
            State::NotConfigured
        };

        Self {
            stage,
            orientation,
            port,
            axes_rotation: AxesRotation::new(),
            single_point: SinglePointTransformation::new(),
            full: KabschRotation::new(),
            state,
            coordinate_system: None,
            events: None,
        }
    }

    /// Publish state changes through `events`
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = Some(events);
        self
    }

    pub fn key(&self) -> CalibrationKey {
        CalibrationKey::new(self.orientation, self.port)
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn port(&self) -> DevicePort {
        self.port
    }

    /// Shared handle of the calibrated stage
    pub fn stage(&self) -> &SharedStage {
        &self.stage
    }

    /// Whether the stage moves to device inputs
    pub fn is_input_stage(&self) -> bool {
        self.port == DevicePort::Input
    }

    /// Whether the stage moves to device outputs
    pub fn is_output_stage(&self) -> bool {
        self.port == DevicePort::Output
    }

    /// e.g. "Left Stage (Input)"
    pub fn short_name(&self) -> String {
        self.key().to_string()
    }

    /// State as of the last [`determine_state`](Self::determine_state)
    pub fn state(&self) -> State {
        self.state
    }

    //
    // Connection
    //

    /// Open the stage connection and recompute the state
    pub fn connect_to_stage(&mut self) -> Result<()> {
        self.stage.lock().connect()?;
        self.determine_state(false);
        Ok(())
    }

    /// Close the stage connection and recompute the state
    pub fn disconnect_from_stage(&mut self) -> Result<()> {
        self.stage.lock().disconnect()?;
        self.determine_state(false);
        Ok(())
    }

    //
    // Transformations
    //

    pub fn axes_rotation(&self) -> &AxesRotation {
        &self.axes_rotation
    }

    /// Map a chip axis onto a signed stage axis
    pub fn update_axes_rotation(&mut self, chip_axis: Axis, direction: Direction, stage_axis: Axis) {
        self.axes_rotation.update(chip_axis, direction, stage_axis);
        self.determine_state(true);
    }

    pub fn single_point_transformation(&self) -> &SinglePointTransformation {
        &self.single_point
    }

    /// Anchor the single point transformation with `pairing`
    pub fn update_single_point_transformation(&mut self, pairing: &CoordinatePairing) -> Result<()> {
        let result = self.single_point.update(pairing, &self.axes_rotation);
        self.determine_state(true);
        Ok(result?)
    }

    pub fn full_transformation(&self) -> &KabschRotation {
        &self.full
    }

    /// Add `pairing` to the full transformation
    pub fn update_full_transformation(&mut self, pairing: &CoordinatePairing) -> Result<()> {
        let result = self.full.update(pairing);
        self.determine_state(true);
        Ok(result?)
    }

    /// Drop the single point anchor
    pub fn reset_single_point_transformation(&mut self) {
        self.single_point.reset();
        self.determine_state(true);
    }

    /// Drop all pairings of the full transformation
    pub fn reset_full_transformation(&mut self) {
        self.full.reset();
        self.determine_state(true);
    }

    /// Pairings of both transformations, single point first
    pub fn coordinate_pairings(&self) -> Vec<CoordinatePairing> {
        let mut pairings = self.full.pairings().to_vec();
        if let Some(single) = self.single_point.pairing() {
            if !pairings.contains(single) {
                pairings.insert(0, *single);
            }
        }
        pairings
    }

    //
    // State machine
    //

    /// Reset all transformations and recompute the state from the stage alone
    pub fn reset(&mut self) -> State {
        self.axes_rotation.reset();
        self.single_point.reset();
        self.full.reset();
        self.determine_state(false)
    }

    /// Recompute the state from scratch
    ///
    /// Probes the stage unless `skip_connection`, then the validity of the
    /// axes rotation, the single point and the full transformation. The
    /// first failing probe fixes the state. A failing stage probe yields
    /// `NotConfigured`.
    pub fn determine_state(&mut self, skip_connection: bool) -> State {
        let previous = self.state;
        self.state = self.probe_state(skip_connection);

        if previous != self.state {
            info!("{}: {} -> {}", self.short_name(), previous, self.state);
            if let Some(events) = &self.events {
                events.publish(MovementEvent::CalibrationStateChanged {
                    key: self.key(),
                    previous,
                    current: self.state,
                });
            }
        }
        self.state
    }

    fn probe_state(&self, skip_connection: bool) -> State {
        if !skip_connection {
            match self.stage.lock().get_status() {
                Ok(Some(_)) => {}
                Ok(None) => return State::NotConfigured,
                Err(e) => {
                    warn!("{} did not respond: {}", self.short_name(), e);
                    return State::NotConfigured;
                }
            }
        }

        if !self.axes_rotation.is_valid() {
            return State::Connected;
        }
        if !self.single_point.is_valid(&self.axes_rotation) {
            return State::CoordinateSystemFixed;
        }
        if !self.full.is_valid() {
            return State::SinglePointFixed;
        }
        State::FullyCalibrated
    }

    //
    // Coordinate system scope
    //

    /// Coordinate system of the enclosing scope, if any
    pub fn coordinate_system(&self) -> Option<CoordinateSystem> {
        self.coordinate_system
    }

    /// Enter a coordinate system until the returned scope is dropped
    pub fn in_coordinate_system(&mut self, system: CoordinateSystem) -> CoordinateSystemScope<'_> {
        let previous = self.coordinate_system.replace(system);
        CoordinateSystemScope {
            calibration: self,
            previous,
        }
    }

    /// Run `f` inside a coordinate system scope
    pub fn with_coordinate_system<T>(
        &mut self,
        system: CoordinateSystem,
        f: impl FnOnce(&mut Calibration) -> T,
    ) -> T {
        let mut scope = self.in_coordinate_system(system);
        f(&mut scope)
    }

    //
    // Guarded operations
    //

    /// Current position in the active coordinate system
    ///
    /// The chip position uses the full transformation once fully calibrated
    /// and the single point transformation otherwise.
    pub fn position<F: Frame>(&mut self) -> Result<Coordinate<F>> {
        let frame = self.require(&guard::POSITION)?;
        guard::require_frame::<F>(&guard::POSITION, frame)?;

        let raw = self.stage.lock().position()?;
        let stage = StageCoordinate::from_slice(&raw);
        let position = match frame {
            ActiveFrame::Stage => stage.untagged(),
            ActiveFrame::Chip => self.stage_to_chip(stage)?.untagged(),
        };
        Ok(position.tag())
    }

    /// Move by `difference` in the active coordinate system
    ///
    /// A chip frame step only needs the axes rotation.
    pub fn move_relative<F: Frame>(&mut self, difference: Coordinate<F>) -> Result<()> {
        let frame = self.require(&guard::MOVE_RELATIVE)?;
        guard::require_frame::<F>(&guard::MOVE_RELATIVE, frame)?;

        let step = match frame {
            ActiveFrame::Stage => difference.untagged().tag::<StageFrame>(),
            ActiveFrame::Chip => self
                .axes_rotation
                .rotate_chip_to_stage(difference.untagged().tag::<ChipFrame>())?,
        };

        debug!("{}: relative move by {}", self.short_name(), step);
        self.stage.lock().move_relative(step.x, step.y, step.z)?;
        Ok(())
    }

    /// Move to `target` in the active coordinate system
    pub fn move_absolute<F: Frame>(&mut self, target: Coordinate<F>) -> Result<()> {
        let frame = self.require(&guard::MOVE_ABSOLUTE)?;
        guard::require_frame::<F>(&guard::MOVE_ABSOLUTE, frame)?;

        let stage = match frame {
            ActiveFrame::Stage => target.untagged().tag::<StageFrame>(),
            ActiveFrame::Chip => self.chip_to_stage(target.untagged().tag::<ChipFrame>())?,
        };

        debug!("{}: absolute move to {}", self.short_name(), stage);
        self.stage.lock().move_absolute(stage.x, stage.y, stage.z)?;
        Ok(())
    }

    /// Move forth and back along a chip axis at `speed`
    ///
    /// The stage speeds are restored afterwards, also when a move fails.
    /// Runs through [`Mover::wiggle_axis`](crate::Mover::wiggle_axis), which
    /// holds the mover-wide wiggle flag.
    pub(crate) fn wiggle_axis(
        &mut self,
        axis: Axis,
        distance: f64,
        speed: f64,
        pause: Duration,
    ) -> Result<()> {
        check_speed("wiggle speed", speed)?;

        let (speed_xy, speed_z) = {
            let mut stage = self.stage.lock();
            (stage.get_speed_xy()?, stage.get_speed_z()?)
        };

        info!("Wiggling {} of {}", axis, self.short_name());
        let wiggle = self.perform_wiggle(axis, distance, speed, pause);

        let restore = {
            let mut stage = self.stage.lock();
            stage
                .set_speed_xy(speed_xy)
                .and_then(|_| stage.set_speed_z(speed_z))
        };

        wiggle?;
        restore?;
        Ok(())
    }

    fn perform_wiggle(&mut self, axis: Axis, distance: f64, speed: f64, pause: Duration) -> Result<()> {
        {
            let mut stage = self.stage.lock();
            stage.set_speed_xy(speed)?;
            stage.set_speed_z(speed)?;
        }

        let difference = ChipCoordinate::along(axis, distance);
        self.with_coordinate_system(CoordinateSystem::Chip, |calibration| {
            calibration.move_relative(difference)?;
            std::thread::sleep(pause);
            calibration.move_relative(-difference)
        })
    }

    fn require(&self, requirement: &Requirement) -> Result<ActiveFrame> {
        Ok(guard::require_state(
            requirement,
            self.coordinate_system,
            self.state,
        )?)
    }

    fn chip_to_stage(&self, chip: ChipCoordinate) -> Result<StageCoordinate> {
        if self.state == State::FullyCalibrated {
            Ok(self.full.chip_to_stage(chip)?)
        } else {
            Ok(self.single_point.chip_to_stage(chip, &self.axes_rotation)?)
        }
    }

    fn stage_to_chip(&self, stage: StageCoordinate) -> Result<ChipCoordinate> {
        if self.state == State::FullyCalibrated {
            Ok(self.full.stage_to_chip(stage)?)
        } else {
            Ok(self.single_point.stage_to_chip(stage, &self.axes_rotation)?)
        }
    }
}

impl fmt::Display for Calibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Stage ({})", self.orientation, self.stage.lock().name())
    }
}

impl fmt::Debug for Calibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calibration")
            .field("key", &self.key())
            .field("state", &self.state)
            .field("axes_rotation", &self.axes_rotation)
            .field("single_point", &self.single_point)
            .field("full", &self.full)
            .field("coordinate_system", &self.coordinate_system)
            .finish()
    }
}

/// Active coordinate system of a calibration
///
/// Derefs to the calibration. The previous coordinate system (none, outside
/// of nested scopes) is restored on drop, on every exit path.
pub struct CoordinateSystemScope<'a> {
    calibration: &'a mut Calibration,
    previous: Option<CoordinateSystem>,
}

impl Deref for CoordinateSystemScope<'_> {
    type Target = Calibration;

    fn deref(&self) -> &Calibration {
        self.calibration
    }
}

impl DerefMut for CoordinateSystemScope<'_> {
    fn deref_mut(&mut self) -> &mut Calibration {
        self.calibration
    }
}

impl Drop for CoordinateSystemScope<'_> {
    fn drop(&mut self) {
        self.calibration.coordinate_system = self.previous;
    }
}
