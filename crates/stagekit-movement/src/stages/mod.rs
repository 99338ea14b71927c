//! Stage driver implementations
//!
//! Hardware drivers live outside this crate and only need to implement
//! [`Stage`](stagekit_core::Stage).

pub mod simulated;

pub use simulated::{journal, FailureInjection, Journal, JournalEntry, SimulatedStage, StageCommand};
