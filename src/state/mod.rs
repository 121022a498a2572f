//! State management module
//!
//! This module contains the cycle state machine, its snapshot type and the
//! shared application state that drives it.

pub mod app_state;
pub mod controller;
pub mod cycle_phase;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use controller::{CycleController, TickOutcome};
pub use cycle_phase::{CyclePhase, PhaseDurations};
pub use timer_state::{format_time, TimerState};
