//! Timer snapshot handed to rendering clients

use serde::{Deserialize, Serialize};

use super::{CyclePhase, PhaseDurations};

/// Read-only view of the cycle timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: CyclePhase,
    pub remaining_seconds: u64,
    pub is_running: bool,
    pub is_blinking: bool,
    /// Countdown formatted as `MM:SS`
    pub display: String,
    /// Percent of the current phase already elapsed
    pub progress: f64,
    pub label: String,
}

impl TimerState {
    /// Create the idle snapshot
    pub fn new() -> Self {
        Self::idle()
    }

    /// Idle timer, nothing counting down
    pub fn idle() -> Self {
        Self {
            phase: CyclePhase::Idle,
            remaining_seconds: 0,
            is_running: false,
            is_blinking: false,
            display: format_time(0),
            progress: 0.0,
            label: String::new(),
        }
    }

    /// Build a snapshot from the controller's raw fields
    pub fn capture(
        phase: CyclePhase,
        remaining_seconds: u64,
        is_running: bool,
        is_blinking: bool,
        durations: &PhaseDurations,
    ) -> Self {
        let total = durations.for_phase(phase);
        let progress = if total == 0 {
            0.0
        } else {
            total.saturating_sub(remaining_seconds) as f64 / total as f64 * 100.0
        };

        Self {
            phase,
            remaining_seconds,
            is_running,
            is_blinking,
            display: format_time(remaining_seconds),
            progress,
            label: phase.label().to_string(),
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Format seconds as zero-padded `MM:SS`
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(3000), "50:00");
        assert_eq!(format_time(6001), "100:01");
    }

    #[test]
    fn progress_tracks_elapsed_share_of_phase() {
        let durations = PhaseDurations::default();
        let state = TimerState::capture(CyclePhase::WarmUp, 15, true, false, &durations);
        assert!((state.progress - 50.0).abs() < f64::EPSILON);
        assert_eq!(state.label, "Wait");
        assert_eq!(state.display, "00:15");
    }

    #[test]
    fn idle_snapshot_is_zeroed() {
        let state = TimerState::default();
        assert_eq!(state.phase, CyclePhase::Idle);
        assert_eq!(state.remaining_seconds, 0);
        assert!(!state.is_running);
        assert!(!state.is_blinking);
        assert_eq!(state.progress, 0.0);
    }
}
