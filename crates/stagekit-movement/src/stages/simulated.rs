//! In-memory stage driver
//!
//! Honors the full [`Stage`] contract without hardware. Every accepted
//! command is appended to a journal that several simulated stages may
//! share, so the order of commands across stages can be inspected.
//! Failures can be injected per command group.

use parking_lot::Mutex;
use stagekit_core::{
    thread_safe_vec, Stage, StageError, StageResult, StageStatus, ThreadSafe, ThreadSafeVec,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Command accepted by a simulated stage
#[derive(Debug, Clone, PartialEq)]
pub enum StageCommand {
    Connect,
    Disconnect,
    MoveRelative([f64; 3]),
    MoveAbsolute([f64; 3]),
    SetSpeedXy(f64),
    SetSpeedZ(f64),
    SetAccelerationXy(f64),
}

impl StageCommand {
    /// Whether the command moves the stage
    pub fn is_motion(&self) -> bool {
        matches!(self, Self::MoveRelative(_) | Self::MoveAbsolute(_))
    }
}

/// Journal record: which stage received which command
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub stage: String,
    pub command: StageCommand,
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.stage, self.command)
    }
}

/// Command journal shared between simulated stages
pub type Journal = ThreadSafeVec<JournalEntry>;

/// Create an empty journal
pub fn journal() -> Journal {
    thread_safe_vec()
}

/// Injected failures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureInjection {
    /// Liveness probe fails with a communication error
    pub status: bool,
    /// Liveness probe answers without a status
    pub silent: bool,
    /// Motion commands fail
    pub motion: bool,
    /// Speed and acceleration setters fail
    pub settings: bool,
}

/// Simulated positioning stage
#[derive(Debug)]
pub struct SimulatedStage {
    name: String,
    connected: bool,
    position: [f64; 3],
    speed_xy: f64,
    speed_z: f64,
    acceleration_xy: f64,
    journal: Journal,
    /// Failures to inject into subsequent calls
    pub failures: FailureInjection,
}

impl SimulatedStage {
    /// Disconnected stage at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connected: false,
            position: [0.0; 3],
            speed_xy: 0.0,
            speed_z: 0.0,
            acceleration_xy: 0.0,
            journal: journal(),
            failures: FailureInjection::default(),
        }
    }

    /// Record commands into a shared journal
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Start at the given stage position
    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.position = [x, y, z];
        self
    }

    /// Start with an open connection
    pub fn connected(mut self) -> Self {
        self.connected = true;
        self
    }

    /// Wrap into a typed shared handle
    ///
    /// The handle coerces into a [`SharedStage`](stagekit_core::SharedStage)
    /// while tests keep typed access for failure injection.
    pub fn into_shared(self) -> ThreadSafe<SimulatedStage> {
        Arc::new(Mutex::new(self))
    }

    /// Current stage position without going through the driver contract
    pub fn current_position(&self) -> [f64; 3] {
        self.position
    }

    /// Change the xy speed behind the mover's back
    pub fn force_speed_xy(&mut self, umps: f64) {
        self.speed_xy = umps;
    }

    /// The journal this stage records into
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    fn record(&self, command: StageCommand) {
        debug!("Simulated stage {}: {:?}", self.name, command);
        self.journal.lock().push(JournalEntry {
            stage: self.name.clone(),
            command,
        });
    }

    fn ensure_connected(&self) -> StageResult<()> {
        if self.connected {
            Ok(())
        } else {
            Err(StageError::NotConnected {
                stage: self.name.clone(),
            })
        }
    }

    fn ensure_motion(&self) -> StageResult<()> {
        self.ensure_connected()?;
        if self.failures.motion {
            return Err(StageError::CommunicationFailure {
                reason: format!("{} did not acknowledge the move", self.name),
            });
        }
        Ok(())
    }

    fn ensure_settings(&self) -> StageResult<()> {
        self.ensure_connected()?;
        if self.failures.settings {
            return Err(StageError::CommandRejected {
                reason: format!("{} rejected the setting", self.name),
            });
        }
        Ok(())
    }
}

impl Stage for SimulatedStage {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn connect(&mut self) -> StageResult<()> {
        self.connected = true;
        self.record(StageCommand::Connect);
        Ok(())
    }

    fn disconnect(&mut self) -> StageResult<()> {
        self.connected = false;
        self.record(StageCommand::Disconnect);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn get_status(&mut self) -> StageResult<Option<StageStatus>> {
        self.ensure_connected()?;
        if self.failures.status {
            return Err(StageError::CommunicationFailure {
                reason: format!("{} did not answer the status request", self.name),
            });
        }
        if self.failures.silent {
            return Ok(None);
        }
        Ok(Some(StageStatus::Idle))
    }

    fn position(&mut self) -> StageResult<Vec<f64>> {
        self.ensure_connected()?;
        Ok(self.position.to_vec())
    }

    fn move_relative(&mut self, x: f64, y: f64, z: f64) -> StageResult<()> {
        self.ensure_motion()?;
        self.position[0] += x;
        self.position[1] += y;
        self.position[2] += z;
        self.record(StageCommand::MoveRelative([x, y, z]));
        Ok(())
    }

    fn move_absolute(&mut self, x: f64, y: f64, z: f64) -> StageResult<()> {
        self.ensure_motion()?;
        self.position = [x, y, z];
        self.record(StageCommand::MoveAbsolute([x, y, z]));
        Ok(())
    }

    fn get_speed_xy(&mut self) -> StageResult<f64> {
        self.ensure_connected()?;
        Ok(self.speed_xy)
    }

    fn set_speed_xy(&mut self, umps: f64) -> StageResult<()> {
        self.ensure_settings()?;
        self.speed_xy = umps;
        self.record(StageCommand::SetSpeedXy(umps));
        Ok(())
    }

    fn get_speed_z(&mut self) -> StageResult<f64> {
        self.ensure_connected()?;
        Ok(self.speed_z)
    }

    fn set_speed_z(&mut self, umps: f64) -> StageResult<()> {
        self.ensure_settings()?;
        self.speed_z = umps;
        self.record(StageCommand::SetSpeedZ(umps));
        Ok(())
    }

    fn get_acceleration_xy(&mut self) -> StageResult<f64> {
        self.ensure_connected()?;
        Ok(self.acceleration_xy)
    }

    fn set_acceleration_xy(&mut self, umps2: f64) -> StageResult<()> {
        self.ensure_settings()?;
        self.acceleration_xy = umps2;
        self.record(StageCommand::SetAccelerationXy(umps2));
        Ok(())
    }
}
