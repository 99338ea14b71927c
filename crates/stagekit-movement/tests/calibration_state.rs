use stagekit_core::{
    Axis, CalibrationError, CalibrationKey, ChipCoordinate, ChipFrame, CoordinateSystem, DeviceId,
    DevicePort, Direction, Error, EventDispatcher, MovementEvent, Orientation, SharedStage,
    StageCoordinate, StageFrame, State, ThreadSafe,
};
use stagekit_movement::{Calibration, SimulatedStage};
use stagekit_transform::CoordinatePairing;

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

/// Three pairings of a chip shifted by (10, -5, 0) against the stage
fn full_pairings() -> Vec<CoordinatePairing> {
    [[0.0, 0.0, 0.0], [1000.0, 0.0, 0.0], [0.0, 1000.0, 0.0]]
        .iter()
        .enumerate()
        .map(|(i, s)| pairing(i as u64 + 1, *s, [s[0] + 10.0, s[1] - 5.0, s[2]]))
        .collect()
}

fn connected_calibration() -> (Calibration, ThreadSafe<SimulatedStage>) {
    let stage = SimulatedStage::new("left").connected().into_shared();
    let shared: SharedStage = stage.clone();
    let calibration = Calibration::new(shared, Orientation::Left, DevicePort::Input);
    (calibration, stage)
}

#[test]
fn test_state_follows_transformation_validity() {
    for axes_valid in [false, true] {
        for single_point in [false, true] {
            for full in [false, true] {
                let (mut calibration, _stage) = connected_calibration();
                if full {
                    for p in full_pairings() {
                        calibration.update_full_transformation(&p).unwrap();
                    }
                }
                if single_point {
                    calibration
                        .update_single_point_transformation(&pairing(
                            100,
                            [0.0, 0.0, 0.0],
                            [5.0, 5.0, 0.0],
                        ))
                        .unwrap();
                }
                if !axes_valid {
                    // chip x and chip y both on stage y
                    calibration.update_axes_rotation(Axis::X, Direction::Positive, Axis::Y);
                }

                let expected = match (axes_valid, single_point, full) {
                    (false, _, _) => State::Connected,
                    (true, false, _) => State::CoordinateSystemFixed,
                    (true, true, false) => State::SinglePointFixed,
                    (true, true, true) => State::FullyCalibrated,
                };
                assert_eq!(
                    calibration.determine_state(false),
                    expected,
                    "axes {} single {} full {}",
                    axes_valid,
                    single_point,
                    full
                );
                assert_eq!(calibration.state(), expected);
            }
        }
    }
}

#[test]
fn test_failed_probe_collapses_to_not_configured() {
    let (mut calibration, stage) = connected_calibration();
    calibration
        .update_single_point_transformation(&pairing(1, [0.0; 3], [0.0; 3]))
        .unwrap();
    assert_eq!(calibration.state(), State::SinglePointFixed);

    stage.lock().failures.status = true;
    assert_eq!(calibration.determine_state(false), State::NotConfigured);
    // geometric updates skip the probe
    assert_eq!(calibration.determine_state(true), State::SinglePointFixed);

    stage.lock().failures.status = false;
    stage.lock().failures.silent = true;
    assert_eq!(calibration.determine_state(false), State::NotConfigured);

    stage.lock().failures.silent = false;
    assert_eq!(calibration.determine_state(false), State::SinglePointFixed);
}

#[test]
fn test_connection_changes_recompute_state() {
    let (mut calibration, _stage) = connected_calibration();
    calibration.disconnect_from_stage().unwrap();
    assert_eq!(calibration.state(), State::NotConfigured);

    calibration.connect_to_stage().unwrap();
    assert_eq!(calibration.state(), State::CoordinateSystemFixed);
}

#[test]
fn test_reset_keeps_connection_only() {
    let (mut calibration, _stage) = connected_calibration();
    for p in full_pairings() {
        calibration.update_full_transformation(&p).unwrap();
    }
    calibration
        .update_single_point_transformation(&full_pairings()[0])
        .unwrap();
    assert_eq!(calibration.state(), State::FullyCalibrated);

    calibration.update_axes_rotation(Axis::X, Direction::Negative, Axis::X);
    assert_eq!(calibration.reset(), State::CoordinateSystemFixed);
    assert!(calibration.coordinate_pairings().is_empty());
    assert_eq!(
        calibration.axes_rotation().mapped_stage_axis(Axis::X),
        Some((Direction::Positive, Axis::X))
    );
}

#[test]
fn test_absolute_chip_move_needs_single_point() {
    let (mut calibration, stage) = connected_calibration();
    calibration.determine_state(false);
    assert_eq!(calibration.state(), State::CoordinateSystemFixed);

    let err = calibration
        .with_coordinate_system(CoordinateSystem::Chip, |c| {
            c.move_absolute(ChipCoordinate::new(10.0, 10.0, 0.0))
        })
        .unwrap_err();
    assert_eq!(
        err,
        Error::Calibration(CalibrationError::InsufficientState {
            operation: "move_absolute".to_string(),
            required: State::SinglePointFixed,
            system: CoordinateSystem::Chip,
        })
    );
    assert!(stage.lock().journal().lock().is_empty());

    // chip = stage + (100, 50, 0)
    calibration
        .update_single_point_transformation(&pairing(1, [0.0; 3], [100.0, 50.0, 0.0]))
        .unwrap();
    calibration
        .with_coordinate_system(CoordinateSystem::Chip, |c| {
            c.move_absolute(ChipCoordinate::new(110.0, 60.0, 0.0))
        })
        .unwrap();
    assert_eq!(stage.lock().current_position(), [10.0, 10.0, 0.0]);
}

#[test]
fn test_stage_frame_needs_connection_only() {
    let (mut calibration, stage) = connected_calibration();
    let mut scope = calibration.in_coordinate_system(CoordinateSystem::Stage);
    scope
        .move_absolute(StageCoordinate::new(1.0, 2.0, 3.0))
        .unwrap();
    scope
        .move_relative(StageCoordinate::new(1.0, 0.0, 0.0))
        .unwrap();
    assert_eq!(
        scope.position::<StageFrame>().unwrap(),
        StageCoordinate::new(2.0, 2.0, 3.0)
    );
    drop(scope);
    assert_eq!(stage.lock().current_position(), [2.0, 2.0, 3.0]);
}

#[test]
fn test_relative_chip_move_uses_axes_rotation() {
    let (mut calibration, stage) = connected_calibration();
    calibration.update_axes_rotation(Axis::X, Direction::Negative, Axis::Y);
    calibration.update_axes_rotation(Axis::Y, Direction::Positive, Axis::X);
    assert_eq!(calibration.state(), State::CoordinateSystemFixed);

    calibration
        .with_coordinate_system(CoordinateSystem::Chip, |c| {
            c.move_relative(ChipCoordinate::new(10.0, 0.0, 0.0))
        })
        .unwrap();
    assert_eq!(stage.lock().current_position(), [0.0, -10.0, 0.0]);

    // a chip read-out still needs a single point
    let err = calibration
        .with_coordinate_system(CoordinateSystem::Chip, |c| c.position::<ChipFrame>())
        .unwrap_err();
    assert!(err.is_insufficient_state());
}

#[test]
fn test_state_changes_are_published() {
    let events = EventDispatcher::default();
    let mut rx = events.subscribe();

    let stage: SharedStage = SimulatedStage::new("left").connected().into_shared();
    let mut calibration =
        Calibration::new(stage, Orientation::Left, DevicePort::Input).with_events(events);

    calibration.determine_state(false);
    assert_eq!(
        rx.try_recv().unwrap(),
        MovementEvent::CalibrationStateChanged {
            key: key(),
            previous: State::Connected,
            current: State::CoordinateSystemFixed,
        }
    );

    calibration.determine_state(false);
    assert!(rx.try_recv().is_err());
}
