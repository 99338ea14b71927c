use anyhow::Context;
use stagekit::{
    init_logging_with_format, Axis, CalibrationKey, ChipCoordinate, ChipDevice, CoordinatePairing,
    DevicePort, Direction, LogFormat, Mover, MovementSettings, Orientation, SharedStage,
    SimulatedStage, StageCoordinate, BUILD_DATE, VERSION,
};
use std::path::PathBuf;
use tracing::info;

/// Chip origin in stage coordinates, per stage
const LEFT_ORIGIN: [f64; 3] = [-2000.0, 500.0, 0.0];
const RIGHT_ORIGIN: [f64; 3] = [3000.0, -500.0, 0.0];

fn main() -> anyhow::Result<()> {
    let log_format = match std::env::var("STAGEKIT_LOG_FORMAT") {
        Ok(format) => format.parse()?,
        Err(_) => LogFormat::default(),
    };
    init_logging_with_format(log_format)?;
    info!("StageKit {} (built {})", VERSION, BUILD_DATE);

    let settings = load_settings()?;
    let mut mover = Mover::with_settings(&settings)?;

    let left: SharedStage = SimulatedStage::new("sim-left")
        .connected()
        .at(-2000.0, 500.0, 0.0)
        .into_shared();
    let right: SharedStage = SimulatedStage::new("sim-right")
        .connected()
        .at(1000.0, -500.0, 0.0)
        .into_shared();

    mover.add_stage_calibration(left, Orientation::Left, DevicePort::Input)?;
    mover.add_stage_calibration(right, Orientation::Right, DevicePort::Output)?;
    mover.apply_settings(&settings)?;
    mover.reload_calibration_states();

    // right stage is mounted mirrored in x and y
    let right_key = CalibrationKey::new(Orientation::Right, DevicePort::Output);
    mover.update_axes_rotation(right_key, Axis::X, Direction::Negative, Axis::X)?;
    mover.update_axes_rotation(right_key, Axis::Y, Direction::Negative, Axis::Y)?;

    let devices = [
        ChipDevice::new(1, &[0.0, 0.0], &[1000.0, 0.0]),
        ChipDevice::new(2, &[0.0, 2000.0], &[1000.0, 2000.0]),
        ChipDevice::new(3, &[500.0, 4000.0], &[1500.0, 4000.0]),
    ];
    mover.save_pairings(&pairings(&devices))?;
    info!("Mover state: {}", mover.state()?);

    for device in &devices {
        mover
            .move_to_device(device)
            .with_context(|| format!("moving to device {}", device.id))?;
        info!("Stage coordinates: {:?}", mover.absolute_stage_coords()?);
    }

    mover.move_relative(
        Some(ChipCoordinate::new(-100.0, 0.0, 0.0)),
        Some(ChipCoordinate::new(100.0, 0.0, 0.0)),
        false,
    )?;
    info!("Sanity check passed: {}", mover.perform_sanity_check());
    Ok(())
}

/// Settings from the file given as first argument, defaults otherwise
fn load_settings() -> anyhow::Result<MovementSettings> {
    match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => MovementSettings::load_from_file(&path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(MovementSettings::default()),
    }
}

/// Pairings as an operator would record them on the simulated chip
fn pairings(devices: &[ChipDevice]) -> Vec<CoordinatePairing> {
    let mut pairings = Vec::new();
    for device in devices {
        let left = CalibrationKey::new(Orientation::Left, DevicePort::Input);
        let input = device.input;
        pairings.push(CoordinatePairing::new(
            left,
            StageCoordinate::new(
                input.x + LEFT_ORIGIN[0],
                input.y + LEFT_ORIGIN[1],
                input.z + LEFT_ORIGIN[2],
            ),
            device.id,
            input,
        ));

        let right = CalibrationKey::new(Orientation::Right, DevicePort::Output);
        let output = device.output;
        pairings.push(CoordinatePairing::new(
            right,
            StageCoordinate::new(
                RIGHT_ORIGIN[0] - output.x,
                RIGHT_ORIGIN[1] - output.y,
                output.z + RIGHT_ORIGIN[2],
            ),
            device.id,
            output,
        ));
    }
    pairings
}
