//! Simulated incoming calls
//!
//! This module provides:
//! - The call workflow driver ([`CallSimulator`])
//! - The roster of mock callers
//! - Workflow variants and mock delays

pub mod call;
pub mod roster;
pub mod timings;

pub use call::{CallOutcome, CallSimulator, CallStage};
pub use roster::{CallerRoster, MOCK_CALLERS};
pub use timings::{SimulationMode, SimulatorTimings};
