//! Event system for movement notifications
//!
//! Provides:
//! - Event types for calibration state changes and coordinated moves
//! - Event dispatcher for publishing events to subscribers

use crate::data::{CalibrationKey, State};
use tokio::sync::broadcast;
use tracing::trace;

/// Movement event types
#[derive(Debug, Clone, PartialEq)]
pub enum MovementEvent {
    /// A calibration moved to another state
    CalibrationStateChanged {
        /// The calibration slot.
        key: CalibrationKey,
        /// State before the recomputation.
        previous: State,
        /// State after the recomputation.
        current: State,
    },
    /// All stages were lifted by the given height
    StagesLifted(f64),
    /// All stages were lowered by the given height
    StagesLowered(f64),
    /// A coordinated move finished; slots in command order
    MoveCompleted(Vec<CalibrationKey>),
    /// An aggregate setting was applied to all connected stages
    SettingChanged {
        /// The setting name.
        setting: String,
        /// The applied value.
        value: f64,
    },
}

impl std::fmt::Display for MovementEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementEvent::CalibrationStateChanged {
                key,
                previous,
                current,
            } => write!(f, "{}: {} -> {}", key, previous, current),
            MovementEvent::StagesLifted(height) => write!(f, "Stages lifted by {} um", height),
            MovementEvent::StagesLowered(height) => write!(f, "Stages lowered by {} um", height),
            MovementEvent::MoveCompleted(order) => {
                let names: Vec<String> = order.iter().map(|k| k.to_string()).collect();
                write!(f, "Move completed: {}", names.join(", "))
            }
            MovementEvent::SettingChanged { setting, value } => {
                write!(f, "{} set to {}", setting, value)
            }
        }
    }
}

/// Event dispatcher for publishing events to subscribers
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    /// Broadcast sender channel for movement events.
    tx: broadcast::Sender<MovementEvent>,
}

impl EventDispatcher {
    /// Create a new event dispatcher
    ///
    /// # Arguments
    /// * `buffer_size` - Size of the broadcast buffer (default 100)
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size);
        Self { tx }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<MovementEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of subscribers reached; zero when nobody listens.
    pub fn publish(&self, event: MovementEvent) -> usize {
        trace!("Publishing event: {}", event);
        self.tx.send(event).unwrap_or(0)
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(100)
    }
}
