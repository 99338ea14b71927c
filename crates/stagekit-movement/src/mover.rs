//! Mover
//!
//! Owns the calibrations of all stages, keyed by orientation and port,
//! applies speed and acceleration settings to every connected stage and
//! arbitrates coordinated moves of the left and right stage so that they
//! never come closer than the configured clearance.

use crate::calibration::Calibration;
use crate::guard;
use crate::ordering::{plan_order, Side, SidePositions};
use stagekit_core::{
    check_acceleration, check_speed, thread_safe, Axis, CalibrationKey, ChipCoordinate, ChipFrame,
    CoordinateSystem, Device, DevicePort, Direction, EventDispatcher, MovementEvent, MoverError,
    Orientation, Result, SharedStage, Stage, StageResult, State, ThreadSafe,
};
use stagekit_settings::{MovementSettings, WiggleSettings};
use stagekit_transform::CoordinatePairing;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Mover shared between threads; one coordinated move at a time
pub type SharedMover = ThreadSafe<Mover>;

/// Speed and acceleration settings mirrored on every connected stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageSetting {
    SpeedXy,
    SpeedZ,
    AccelerationXy,
}

impl StageSetting {
    fn name(self) -> &'static str {
        match self {
            Self::SpeedXy => "speed_xy",
            Self::SpeedZ => "speed_z",
            Self::AccelerationXy => "acceleration_xy",
        }
    }

    fn check(self, value: f64) -> std::result::Result<(), MoverError> {
        match self {
            Self::SpeedXy | Self::SpeedZ => check_speed(self.name(), value),
            Self::AccelerationXy => check_acceleration(self.name(), value),
        }
    }

    fn read(self, stage: &mut dyn Stage) -> StageResult<f64> {
        match self {
            Self::SpeedXy => stage.get_speed_xy(),
            Self::SpeedZ => stage.get_speed_z(),
            Self::AccelerationXy => stage.get_acceleration_xy(),
        }
    }

    fn write(self, stage: &mut dyn Stage, value: f64) -> StageResult<()> {
        match self {
            Self::SpeedXy => stage.set_speed_xy(value),
            Self::SpeedZ => stage.set_speed_z(value),
            Self::AccelerationXy => stage.set_acceleration_xy(value),
        }
    }
}

/// Releases the mover-wide wiggle flag on drop
struct WiggleGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> WiggleGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> std::result::Result<Self, MoverError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| MoverError::WiggleInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for WiggleGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Entry point for all stage movement
pub struct Mover {
    calibrations: BTreeMap<CalibrationKey, Calibration>,
    speed_xy: f64,
    speed_z: f64,
    acceleration_xy: f64,
    z_lift: f64,
    min_fiber_distance: f64,
    wiggle: WiggleSettings,
    /// Calibrations currently lifted, with the height they were lifted by
    lifted: BTreeMap<CalibrationKey, f64>,
    performing_wiggle: AtomicBool,
    events: EventDispatcher,
}

impl Mover {
    /// Mover with default movement settings
    pub fn new() -> Self {
        let settings = MovementSettings::default();
        Self {
            calibrations: BTreeMap::new(),
            speed_xy: settings.speed_xy,
            speed_z: settings.speed_z,
            acceleration_xy: settings.acceleration_xy,
            z_lift: settings.z_lift,
            min_fiber_distance: settings.min_fiber_distance,
            wiggle: settings.wiggle,
            lifted: BTreeMap::new(),
            performing_wiggle: AtomicBool::new(false),
            events: EventDispatcher::default(),
        }
    }

    /// Mover caching `settings` after range-checking them
    ///
    /// Nothing is sent to a stage yet.
    pub fn with_settings(settings: &MovementSettings) -> Result<Self> {
        let mut mover = Self::new();
        mover.apply_settings(settings)?;
        Ok(mover)
    }

    /// Wrap into a [`SharedMover`]
    pub fn into_shared(self) -> SharedMover {
        thread_safe(self)
    }

    /// Dispatcher of calibration and movement events
    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// Drop all calibrations and restore the default settings
    pub fn reset(&mut self) {
        let events = self.events.clone();
        *self = Self::new();
        self.events = events;
        debug!("Mover reset");
    }

    //
    // Registration
    //

    /// Register a calibration for `stage` at `orientation` and `port`
    ///
    /// Orientation, port and stage must all be unused. Nothing is
    /// registered when a check fails.
    pub fn add_stage_calibration(
        &mut self,
        stage: SharedStage,
        orientation: Orientation,
        port: DevicePort,
    ) -> Result<&mut Calibration> {
        if self.calibration_by_orientation(orientation).is_some() {
            return Err(MoverError::OrientationTaken { orientation }.into());
        }
        if self.calibration_by_port(port).is_some() {
            return Err(MoverError::PortTaken { port }.into());
        }
        if self
            .calibrations
            .values()
            .any(|c| Arc::ptr_eq(c.stage(), &stage))
        {
            let name = stage.lock().name();
            return Err(MoverError::StageAlreadyAssigned { stage: name }.into());
        }

        let key = CalibrationKey::new(orientation, port);
        let calibration =
            Calibration::new(stage, orientation, port).with_events(self.events.clone());
        info!("Registered {}", calibration);
        Ok(self.calibrations.entry(key).or_insert(calibration))
    }

    //
    // Lookup
    //

    pub fn calibration(&self, key: CalibrationKey) -> Option<&Calibration> {
        self.calibrations.get(&key)
    }

    pub fn calibration_mut(&mut self, key: CalibrationKey) -> Option<&mut Calibration> {
        self.calibrations.get_mut(&key)
    }

    /// All calibrations, ordered by orientation and port
    pub fn calibrations(&self) -> impl Iterator<Item = &Calibration> {
        self.calibrations.values()
    }

    pub fn calibration_by_orientation(&self, orientation: Orientation) -> Option<&Calibration> {
        self.calibrations
            .values()
            .find(|c| c.orientation() == orientation)
    }

    pub fn calibration_by_port(&self, port: DevicePort) -> Option<&Calibration> {
        self.calibrations.values().find(|c| c.port() == port)
    }

    pub fn left_calibration(&self) -> Option<&Calibration> {
        self.calibration_by_orientation(Orientation::Left)
    }

    pub fn right_calibration(&self) -> Option<&Calibration> {
        self.calibration_by_orientation(Orientation::Right)
    }

    pub fn top_calibration(&self) -> Option<&Calibration> {
        self.calibration_by_orientation(Orientation::Top)
    }

    pub fn bottom_calibration(&self) -> Option<&Calibration> {
        self.calibration_by_orientation(Orientation::Bottom)
    }

    pub fn input_calibration(&self) -> Option<&Calibration> {
        self.calibration_by_port(DevicePort::Input)
    }

    pub fn output_calibration(&self) -> Option<&Calibration> {
        self.calibration_by_port(DevicePort::Output)
    }

    /// Stages of all registered calibrations
    pub fn active_stages(&self) -> Vec<SharedStage> {
        self.calibrations.values().map(|c| c.stage().clone()).collect()
    }

    /// Registered stages with an open connection
    pub fn connected_stages(&self) -> Vec<SharedStage> {
        self.calibrations
            .values()
            .filter(|c| c.stage().lock().is_connected())
            .map(|c| c.stage().clone())
            .collect()
    }

    pub fn has_connected_stages(&self) -> bool {
        self.calibrations
            .values()
            .any(|c| c.stage().lock().is_connected())
    }

    //
    // State
    //

    /// Common state of all calibrations
    ///
    /// `NotConfigured` while no stage is connected.
    pub fn state(&self) -> Result<State> {
        if !self.has_connected_stages() {
            return Ok(State::NotConfigured);
        }

        let mut states = self.calibrations.values().map(Calibration::state);
        let first = states.next().unwrap_or_default();
        if states.all(|state| state == first) {
            Ok(first)
        } else {
            Err(MoverError::InconsistentState.into())
        }
    }

    /// Reset the transformations of every calibration
    pub fn reset_calibrations(&mut self) {
        for calibration in self.calibrations.values_mut() {
            calibration.reset();
        }
    }

    /// Probe every stage and recompute every calibration state
    pub fn reload_calibration_states(&mut self) {
        for calibration in self.calibrations.values_mut() {
            calibration.determine_state(false);
        }
    }

    /// Whether every calibration is fully calibrated after reloading
    ///
    /// A mover without calibrations is not sane.
    pub fn perform_sanity_check(&mut self) -> bool {
        self.reload_calibration_states();
        !self.calibrations.is_empty()
            && self
                .calibrations
                .values()
                .all(|c| c.state() == State::FullyCalibrated)
    }

    //
    // Calibration updates
    //

    /// Map a chip axis onto a signed stage axis of one calibration
    ///
    /// The single point transformation of that calibration is reset first,
    /// since its offset was computed with the previous rotation.
    pub fn update_axes_rotation(
        &mut self,
        key: CalibrationKey,
        chip_axis: Axis,
        direction: Direction,
        stage_axis: Axis,
    ) -> Result<()> {
        let calibration = self.require_calibration(key)?;
        calibration.reset_single_point_transformation();
        calibration.update_axes_rotation(chip_axis, direction, stage_axis);
        Ok(())
    }

    /// Route pairings to their calibrations
    ///
    /// A pairing fixes the single point if none is valid yet and is always
    /// added to the full transformation.
    pub fn save_pairings(&mut self, pairings: &[CoordinatePairing]) -> Result<()> {
        for pairing in pairings {
            let calibration = self.require_calibration(pairing.calibration())?;
            if !calibration
                .single_point_transformation()
                .is_valid(calibration.axes_rotation())
            {
                calibration.update_single_point_transformation(pairing)?;
            }
            calibration.update_full_transformation(pairing)?;
        }
        Ok(())
    }

    //
    // Settings
    //

    /// Apply movement settings
    ///
    /// Speeds and acceleration go to every connected stage right away;
    /// without connected stages they are only cached.
    pub fn apply_settings(&mut self, settings: &MovementSettings) -> Result<()> {
        StageSetting::SpeedXy.check(settings.speed_xy)?;
        StageSetting::SpeedZ.check(settings.speed_z)?;
        StageSetting::AccelerationXy.check(settings.acceleration_xy)?;
        self.set_wiggle_settings(settings.wiggle)?;
        self.set_z_lift(settings.z_lift)?;
        self.set_min_fiber_distance(settings.min_fiber_distance)?;

        if self.has_connected_stages() {
            self.set_speed_xy(settings.speed_xy)?;
            self.set_speed_z(settings.speed_z)?;
            self.set_acceleration_xy(settings.acceleration_xy)?;
        } else {
            self.speed_xy = settings.speed_xy;
            self.speed_z = settings.speed_z;
            self.acceleration_xy = settings.acceleration_xy;
        }
        Ok(())
    }

    /// Snapshot of the cached settings
    pub fn settings(&self) -> MovementSettings {
        MovementSettings {
            speed_xy: self.speed_xy,
            speed_z: self.speed_z,
            acceleration_xy: self.acceleration_xy,
            z_lift: self.z_lift,
            min_fiber_distance: self.min_fiber_distance,
            wiggle: self.wiggle,
        }
    }

    /// xy speed of all connected stages
    ///
    /// Stages that drifted from the cached value are set back to it.
    pub fn speed_xy(&mut self) -> Result<f64> {
        self.get_setting(StageSetting::SpeedXy)
    }

    /// Set the xy speed of all connected stages
    pub fn set_speed_xy(&mut self, umps: f64) -> Result<()> {
        self.set_setting(StageSetting::SpeedXy, umps)
    }

    /// z speed of all connected stages
    pub fn speed_z(&mut self) -> Result<f64> {
        self.get_setting(StageSetting::SpeedZ)
    }

    /// Set the z speed of all connected stages
    pub fn set_speed_z(&mut self, umps: f64) -> Result<()> {
        self.set_setting(StageSetting::SpeedZ, umps)
    }

    /// xy acceleration of all connected stages
    pub fn acceleration_xy(&mut self) -> Result<f64> {
        self.get_setting(StageSetting::AccelerationXy)
    }

    /// Set the xy acceleration of all connected stages
    pub fn set_acceleration_xy(&mut self, umps2: f64) -> Result<()> {
        self.set_setting(StageSetting::AccelerationXy, umps2)
    }

    /// Lift height in um
    pub fn z_lift(&self) -> f64 {
        self.z_lift
    }

    pub fn set_z_lift(&mut self, height: f64) -> Result<()> {
        if !(0.0..).contains(&height) {
            return Err(MoverError::OutOfRange {
                setting: "z_lift".to_string(),
                value: height,
                min: 0.0,
                max: f64::INFINITY,
            }
            .into());
        }
        self.z_lift = height;
        Ok(())
    }

    /// Minimum x separation of left and right stage in um
    pub fn min_fiber_distance(&self) -> f64 {
        self.min_fiber_distance
    }

    pub fn set_min_fiber_distance(&mut self, distance: f64) -> Result<()> {
        if !(distance.is_finite() && distance > 0.0) {
            return Err(MoverError::OutOfRange {
                setting: "min_fiber_distance".to_string(),
                value: distance,
                min: f64::MIN_POSITIVE,
                max: f64::INFINITY,
            }
            .into());
        }
        self.min_fiber_distance = distance;
        Ok(())
    }

    pub fn wiggle_settings(&self) -> WiggleSettings {
        self.wiggle
    }

    pub fn set_wiggle_settings(&mut self, wiggle: WiggleSettings) -> Result<()> {
        check_speed("wiggle speed", wiggle.speed)?;
        if !(wiggle.distance.is_finite() && wiggle.distance > 0.0) {
            return Err(MoverError::OutOfRange {
                setting: "wiggle distance".to_string(),
                value: wiggle.distance,
                min: f64::MIN_POSITIVE,
                max: f64::INFINITY,
            }
            .into());
        }
        self.wiggle = wiggle;
        Ok(())
    }

    fn cached(&self, setting: StageSetting) -> f64 {
        match setting {
            StageSetting::SpeedXy => self.speed_xy,
            StageSetting::SpeedZ => self.speed_z,
            StageSetting::AccelerationXy => self.acceleration_xy,
        }
    }

    fn get_setting(&mut self, setting: StageSetting) -> Result<f64> {
        self.require_connected(setting.name())?;
        let cached = self.cached(setting);

        let mut drifted = false;
        for stage in self.connected_stages() {
            if setting.read(&mut *stage.lock())? != cached {
                drifted = true;
            }
        }
        if drifted {
            debug!("Resynchronizing {} to {}", setting.name(), cached);
            self.set_setting(setting, cached)?;
        }
        Ok(cached)
    }

    fn set_setting(&mut self, setting: StageSetting, value: f64) -> Result<()> {
        self.require_connected(setting.name())?;
        setting.check(value)?;

        for stage in self.connected_stages() {
            setting
                .write(&mut *stage.lock(), value)
                .map_err(|source| MoverError::SettingFailed {
                    setting: setting.name().to_string(),
                    source,
                })?;
        }

        match setting {
            StageSetting::SpeedXy => self.speed_xy = value,
            StageSetting::SpeedZ => self.speed_z = value,
            StageSetting::AccelerationXy => self.acceleration_xy = value,
        }
        self.events.publish(MovementEvent::SettingChanged {
            setting: setting.name().to_string(),
            value,
        });
        Ok(())
    }

    //
    // Movement
    //

    /// Flattened [x, y] stage positions of all active stages
    pub fn absolute_stage_coords(&self) -> Result<Vec<f64>> {
        self.require_connected("absolute_stage_coords")?;
        let mut coords = Vec::with_capacity(2 * self.calibrations.len());
        for stage in self.active_stages() {
            let position = stage.lock().position()?;
            coords.extend((0..2).map(|i| position.get(i).copied().unwrap_or(0.0)));
        }
        Ok(coords)
    }

    /// Whether any stage is currently lifted
    pub fn stages_lifted(&self) -> bool {
        !self.lifted.is_empty()
    }

    /// Move every calibration up by the lift height in chip z
    ///
    /// Calibrations that are already lifted stay where they are, so after
    /// an interrupted lift a second call only lifts the remaining stages.
    pub fn lift_stages(&mut self) -> Result<()> {
        self.require_connected("lift_stages")?;
        let pending: Vec<CalibrationKey> = self
            .calibrations
            .keys()
            .filter(|key| !self.lifted.contains_key(*key))
            .copied()
            .collect();
        if pending.is_empty() {
            return Ok(());
        }
        self.require_z_moves(&pending)?;

        let z_lift = self.z_lift;
        for key in pending {
            self.move_z(key, z_lift)?;
            self.lifted.insert(key, z_lift);
        }
        self.events.publish(MovementEvent::StagesLifted(z_lift));
        Ok(())
    }

    /// Move every lifted calibration down by the height it was lifted by
    ///
    /// No-op unless a stage is lifted.
    pub fn lower_stages(&mut self) -> Result<()> {
        self.require_connected("lower_stages")?;
        let pending: Vec<(CalibrationKey, f64)> =
            self.lifted.iter().map(|(key, height)| (*key, *height)).collect();
        if pending.is_empty() {
            return Ok(());
        }
        let keys: Vec<CalibrationKey> = pending.iter().map(|(key, _)| *key).collect();
        self.require_z_moves(&keys)?;

        let mut lowered_by = 0.0_f64;
        for (key, height) in pending {
            self.move_z(key, -height)?;
            self.lifted.remove(&key);
            lowered_by = lowered_by.max(height);
        }
        self.events.publish(MovementEvent::StagesLowered(lowered_by));
        Ok(())
    }

    /// Arbitrated move of the left and right stage to chip coordinates
    ///
    /// The command order keeps the stages apart by the minimum fiber
    /// distance. Plans violating the clearance are rejected before any
    /// stage moves. With `lift`, the stages are lifted first and lowered
    /// afterwards, so targets are given at lift height.
    ///
    /// Returns the calibrations in the order they were moved.
    pub fn move_absolute(
        &mut self,
        left: Option<ChipCoordinate>,
        right: Option<ChipCoordinate>,
        lift: bool,
    ) -> Result<Vec<CalibrationKey>> {
        self.require_connected("move_absolute")?;

        let order = self.plan(left, right)?;
        if lift {
            self.lift_stages()?;
        }

        let mut moved = Vec::with_capacity(order.len());
        for (key, target) in order {
            debug!("Moving {} to {}", key, target);
            self.require_calibration(key)?
                .with_coordinate_system(CoordinateSystem::Chip, |c| c.move_absolute(target))?;
            moved.push(key);
        }

        if lift {
            self.lower_stages()?;
        }

        let names: Vec<String> = moved.iter().map(|k| k.to_string()).collect();
        info!("Coordinated move completed: {}", names.join(", "));
        self.events.publish(MovementEvent::MoveCompleted(moved.clone()));
        Ok(moved)
    }

    /// Arbitrated move by chip offsets from each stage's own position
    pub fn move_relative(
        &mut self,
        left: Option<ChipCoordinate>,
        right: Option<ChipCoordinate>,
        lift: bool,
    ) -> Result<Vec<CalibrationKey>> {
        self.require_connected("move_relative")?;

        let left = match left {
            Some(offset) => Some(self.chip_position(Orientation::Left)? + offset),
            None => None,
        };
        let right = match right {
            Some(offset) => Some(self.chip_position(Orientation::Right)? + offset),
            None => None,
        };
        self.move_absolute(left, right, lift)
    }

    /// Move the stages onto the ports of `device`
    ///
    /// Each stage travels to the port it services, at lift height, and is
    /// lowered onto it afterwards.
    pub fn move_to_device(&mut self, device: &dyn Device) -> Result<Vec<CalibrationKey>> {
        self.require_connected("move_to_device")?;

        let target = |calibration: Option<&Calibration>, z_lift: f64| {
            calibration.map(|c| {
                let port = match c.port() {
                    DevicePort::Input => device.input_position(),
                    DevicePort::Output => device.output_position(),
                };
                port.with_z(port.z + z_lift)
            })
        };
        let left = target(self.left_calibration(), self.z_lift);
        let right = target(self.right_calibration(), self.z_lift);

        info!("Moving to device {}", device.id());
        self.move_absolute(left, right, true)
    }

    /// Wiggle one calibration along a chip axis with the wiggle settings
    ///
    /// Only one wiggle may run per mover.
    pub fn wiggle_axis(&mut self, key: CalibrationKey, axis: Axis) -> Result<()> {
        self.require_connected("wiggle_axis")?;

        let _guard = WiggleGuard::acquire(&self.performing_wiggle)?;
        let wiggle = self.wiggle;
        let calibration = self
            .calibrations
            .get_mut(&key)
            .ok_or_else(|| missing(&key.to_string()))?;
        calibration.wiggle_axis(
            axis,
            wiggle.distance,
            wiggle.speed,
            Duration::from_millis(wiggle.pause_ms),
        )
    }

    /// Whether a wiggle is running
    pub fn is_performing_wiggle(&self) -> bool {
        self.performing_wiggle.load(Ordering::Acquire)
    }

    /// Resolve targets into an ordered list of calibration moves
    fn plan(
        &mut self,
        left: Option<ChipCoordinate>,
        right: Option<ChipCoordinate>,
    ) -> Result<Vec<(CalibrationKey, ChipCoordinate)>> {
        let left_key = self.left_calibration().map(Calibration::key);
        let right_key = self.right_calibration().map(Calibration::key);

        let targets = |key: Option<CalibrationKey>, target: Option<ChipCoordinate>, slot: &str| {
            match (key, target) {
                (Some(key), Some(target)) => Ok(Some((key, target))),
                (None, Some(_)) => Err(missing(slot)),
                (_, None) => Ok(None),
            }
        };
        let left_move = targets(left_key, left, "Left Stage")?;
        let right_move = targets(right_key, right, "Right Stage")?;

        // collision avoidance needs both stages
        if left_key.is_none() || right_key.is_none() {
            return Ok(left_move.into_iter().chain(right_move).collect());
        }

        let current = SidePositions {
            left: self.chip_position(Orientation::Left)?.x,
            right: self.chip_position(Orientation::Right)?.x,
        };
        let order = plan_order(
            current,
            left.map(|c| c.x),
            right.map(|c| c.x),
            self.min_fiber_distance,
        )
        .inspect_err(|e| warn!("Rejected move: {}", e))?;

        Ok(order
            .into_iter()
            .filter_map(|side| match side {
                Side::Left => left_move,
                Side::Right => right_move,
            })
            .collect())
    }

    fn chip_position(&mut self, orientation: Orientation) -> Result<ChipCoordinate> {
        let key = self
            .calibration_by_orientation(orientation)
            .map(Calibration::key)
            .ok_or_else(|| missing(&format!("{} Stage", orientation)))?;
        self.require_calibration(key)?
            .with_coordinate_system(CoordinateSystem::Chip, |c| c.position::<ChipFrame>())
    }

    /// Fail before any motion if a calibration cannot move in chip z
    fn require_z_moves(&self, keys: &[CalibrationKey]) -> Result<()> {
        for key in keys {
            let calibration = self
                .calibrations
                .get(key)
                .ok_or_else(|| missing(&key.to_string()))?;
            guard::require_state(
                &guard::MOVE_RELATIVE,
                Some(CoordinateSystem::Chip),
                calibration.state(),
            )
            .inspect_err(|e| warn!("{} cannot move in z: {}", key, e))?;
        }
        Ok(())
    }

    fn move_z(&mut self, key: CalibrationKey, height: f64) -> Result<()> {
        let step = ChipCoordinate::new(0.0, 0.0, height);
        self.require_calibration(key)?
            .with_coordinate_system(CoordinateSystem::Chip, |c| c.move_relative(step))
            .inspect_err(|e| warn!("z move of {} by {} failed: {}", key, height, e))
    }

    fn require_calibration(&mut self, key: CalibrationKey) -> Result<&mut Calibration> {
        self.calibrations
            .get_mut(&key)
            .ok_or_else(|| missing(&key.to_string()))
    }

    fn require_connected(&self, operation: &str) -> Result<()> {
        if self.has_connected_stages() {
            Ok(())
        } else {
            Err(MoverError::NoConnectedStages {
                operation: operation.to_string(),
            }
            .into())
        }
    }
}

impl Default for Mover {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Mover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mover")
            .field("calibrations", &self.calibrations)
            .field("settings", &self.settings())
            .field("lifted", &self.lifted)
            .finish()
    }
}

fn missing(slot: &str) -> stagekit_core::Error {
    MoverError::MissingCalibration {
        slot: slot.to_string(),
    }
    .into()
}
