//! Cycle phases and their durations

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five mutually exclusive phases of the drive/pause cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    /// No active cycle
    Idle,
    /// Lead-in before driving begins
    WarmUp,
    /// Driving window
    Driving,
    /// Pre-rest alert window
    Warning,
    /// Mandatory pause
    Rest,
}

impl CyclePhase {
    /// Phase entered when this phase's countdown reaches zero.
    ///
    /// `Idle` has no successor: it is left only through an explicit start.
    pub fn next(self) -> Option<CyclePhase> {
        match self {
            CyclePhase::Idle => None,
            CyclePhase::WarmUp => Some(CyclePhase::Driving),
            CyclePhase::Driving => Some(CyclePhase::Warning),
            CyclePhase::Warning => Some(CyclePhase::Rest),
            CyclePhase::Rest => Some(CyclePhase::Driving),
        }
    }

    /// Whether the countdown display blinks during this phase
    pub fn blinks(self) -> bool {
        matches!(self, CyclePhase::WarmUp | CyclePhase::Warning)
    }

    /// Short caption shown next to the countdown
    pub fn label(self) -> &'static str {
        match self {
            CyclePhase::Idle => "",
            CyclePhase::WarmUp => "Wait",
            CyclePhase::Driving => "Go",
            CyclePhase::Warning => "Attention",
            CyclePhase::Rest => "Stop",
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CyclePhase::Idle => write!(f, "idle"),
            CyclePhase::WarmUp => write!(f, "warm_up"),
            CyclePhase::Driving => write!(f, "driving"),
            CyclePhase::Warning => write!(f, "warning"),
            CyclePhase::Rest => write!(f, "rest"),
        }
    }
}

/// Length of each phase in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub warm_up: u64,
    pub driving: u64,
    pub warning: u64,
    pub rest: u64,
}

impl PhaseDurations {
    /// Countdown loaded when `phase` is entered
    pub fn for_phase(&self, phase: CyclePhase) -> u64 {
        match phase {
            CyclePhase::Idle => 0,
            CyclePhase::WarmUp => self.warm_up,
            CyclePhase::Driving => self.driving,
            CyclePhase::Warning => self.warning,
            CyclePhase::Rest => self.rest,
        }
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            warm_up: 30,
            driving: 50,
            warning: 10,
            rest: 60,
        }
    }
}
