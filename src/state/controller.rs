//! Drive/pause cycle state machine
//!
//! ```text
//!            start()
//!  Idle ─────────────► WarmUp ──► Driving ──► Warning ──► Rest
//!   ▲                                ▲                      │
//!   │  stop() / reset()              └──────────────────────┘
//!   └──────────────── from any phase          (reports a completed cycle)
//! ```
//!
//! The controller never schedules anything itself. The ticker tasks call
//! [`CycleController::tick`] once per second and
//! [`CycleController::toggle_blink`] twice per second, passing the epoch they
//! were spawned with. Every start and stop moves the epoch forward, so calls
//! from a cancelled run are ignored.

use std::sync::Arc;

use tracing::{debug, info};

use super::{CyclePhase, PhaseDurations, TimerState};
use crate::services::{AchievementSink, AlertEmitter, ToneKind};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick came from a cancelled run, or the timer is stopped
    Stale,
    /// Countdown moved down by one
    Counted,
    /// Countdown hit zero and the phase changed
    Transitioned { from: CyclePhase, to: CyclePhase },
}

pub struct CycleController {
    durations: PhaseDurations,
    phase: CyclePhase,
    remaining_seconds: u64,
    running: bool,
    blink_on: bool,
    epoch: u64,
    emitter: Arc<dyn AlertEmitter>,
    sink: Arc<dyn AchievementSink>,
}

impl CycleController {
    pub fn new(
        durations: PhaseDurations,
        emitter: Arc<dyn AlertEmitter>,
        sink: Arc<dyn AchievementSink>,
    ) -> Self {
        Self {
            durations,
            phase: CyclePhase::Idle,
            remaining_seconds: 0,
            running: false,
            blink_on: false,
            epoch: 0,
            emitter,
            sink,
        }
    }

    /// Begin a cycle run.
    ///
    /// Returns the epoch the ticker tasks must carry, or `None` when a run is
    /// already in progress and nothing changed.
    pub fn start(&mut self) -> Option<u64> {
        self.emitter.prime();
        if self.running {
            debug!("Start ignored, cycle already running");
            return None;
        }

        self.epoch += 1;
        self.running = true;
        self.enter(CyclePhase::WarmUp);
        info!("Cycle started (epoch {})", self.epoch);

        self.emitter.emit(ToneKind::Click);
        self.sink.report_cycle_start();
        Some(self.epoch)
    }

    /// Stop the run and return to idle from any phase
    pub fn stop(&mut self) {
        self.emitter.prime();
        if self.running {
            info!("Cycle stopped during {}", self.phase);
        }

        self.epoch += 1;
        self.running = false;
        self.phase = CyclePhase::Idle;
        self.remaining_seconds = 0;
        self.blink_on = false;
    }

    /// Stop and zero every field, blink flag included
    pub fn reset(&mut self) {
        self.stop();
        self.blink_on = false;
        debug!("Cycle timer reset");
    }

    /// Start when idle, stop when running. Returns the new epoch on start.
    pub fn toggle(&mut self) -> Option<u64> {
        if self.running {
            self.stop();
            None
        } else {
            self.start()
        }
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self, epoch: u64) -> TickOutcome {
        if !self.running || epoch != self.epoch {
            debug!("Dropping stale tick (epoch {} vs {})", epoch, self.epoch);
            return TickOutcome::Stale;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return TickOutcome::Counted;
        }

        let from = self.phase;
        // Running phases always have a successor
        let Some(to) = from.next() else {
            return TickOutcome::Stale;
        };

        self.enter(to);
        info!("Phase {} finished, entering {}", from, to);
        self.emitter.emit(ToneKind::Alert);
        if from == CyclePhase::Rest {
            self.sink.report_cycle_start();
        }

        TickOutcome::Transitioned { from, to }
    }

    /// Flip the blink flag. Returns whether it changed.
    pub fn toggle_blink(&mut self, epoch: u64) -> bool {
        if !self.running || epoch != self.epoch || !self.phase.blinks() {
            return false;
        }
        self.blink_on = !self.blink_on;
        true
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_blinking(&self) -> bool {
        self.running && self.phase.blinks() && self.blink_on
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn durations(&self) -> &PhaseDurations {
        &self.durations
    }

    /// Current state for rendering
    pub fn snapshot(&self) -> TimerState {
        TimerState::capture(
            self.phase,
            self.remaining_seconds,
            self.running,
            self.is_blinking(),
            &self.durations,
        )
    }

    fn enter(&mut self, phase: CyclePhase) {
        self.phase = phase;
        self.remaining_seconds = self.durations.for_phase(phase);
        self.blink_on = false;
    }
}
