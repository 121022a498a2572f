//! Cycle reporting towards the achievement tracker

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::state::PhaseDurations;

/// Receives cycle notifications from the timer.
///
/// Calls are fire-and-forget: implementations handle their own failures and
/// dedup.
pub trait AchievementSink: Send + Sync {
    /// Called on the first start of a cycle run and whenever a rest completes
    fn report_cycle_start(&self);
}

/// Summary of everything reported so far
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    /// Total reports received
    pub reports: u64,
    /// Reports that came from a fresh start
    pub starts: u64,
    /// Reports that came from a completed rest
    pub completed_cycles: u64,
    pub first_report: Option<DateTime<Utc>>,
    pub last_report: Option<DateTime<Utc>>,
}

/// Driving/rest totals derived from completed cycles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleStats {
    pub completed_cycles: u64,
    pub driving_seconds: u64,
    pub rest_seconds: u64,
    pub completed_today: u64,
}

/// How a cycle run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    InProgress,
    /// Stopped after at least one full cycle
    Completed,
    /// Stopped before the first rest finished
    Interrupted,
}

/// One entry of the run history, from start to stop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub completed_cycles: u64,
    pub status: RunStatus,
}

impl RunRecord {
    fn open(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            ended_at: None,
            completed_cycles: 0,
            status: RunStatus::InProgress,
        }
    }

    /// Seconds between start and stop, or up to `now` while still running
    pub fn duration_seconds(&self, now: DateTime<Utc>) -> u64 {
        let end = self.ended_at.unwrap_or(now);
        (end - self.started_at).num_seconds().max(0) as u64
    }
}

#[derive(Debug, Default)]
struct LogInner {
    reports: Vec<DateTime<Utc>>,
    /// Set while a run is in progress so the next report counts as a completion
    run_open: bool,
    starts: u64,
    completions: Vec<DateTime<Utc>>,
    runs: Vec<RunRecord>,
}

/// In-memory record of cycle reports
#[derive(Debug, Default)]
pub struct CycleLog {
    inner: Mutex<LogInner>,
}

impl CycleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the current run as finished, so the next report is a new start
    pub fn close_run(&self) {
        let Ok(mut inner) = self.inner.lock() else {
            warn!("Cycle log lock poisoned");
            return;
        };
        if !inner.run_open {
            return;
        }

        inner.run_open = false;
        if let Some(run) = inner.runs.last_mut() {
            run.ended_at = Some(Utc::now());
            run.status = if run.completed_cycles > 0 {
                RunStatus::Completed
            } else {
                RunStatus::Interrupted
            };
            info!("Cycle run closed as {:?}", run.status);
        }
    }

    /// Every run so far, newest first
    pub fn history(&self) -> Vec<RunRecord> {
        let Ok(inner) = self.inner.lock() else {
            warn!("Cycle log lock poisoned");
            return Vec::new();
        };
        inner.runs.iter().rev().cloned().collect()
    }

    /// Current report counts
    pub fn summary(&self) -> CycleSummary {
        let Ok(inner) = self.inner.lock() else {
            warn!("Cycle log lock poisoned");
            return CycleSummary::default();
        };

        CycleSummary {
            reports: inner.reports.len() as u64,
            starts: inner.starts,
            completed_cycles: inner.completions.len() as u64,
            first_report: inner.reports.first().copied(),
            last_report: inner.reports.last().copied(),
        }
    }

    /// Totals for the completed cycles, using `durations` for phase lengths
    pub fn stats(&self, durations: &PhaseDurations, now: DateTime<Utc>) -> CycleStats {
        let Ok(inner) = self.inner.lock() else {
            warn!("Cycle log lock poisoned");
            return CycleStats::default();
        };

        let completed = inner.completions.len() as u64;
        let today = now.date_naive();
        CycleStats {
            completed_cycles: completed,
            driving_seconds: completed * durations.driving,
            rest_seconds: completed * durations.rest,
            completed_today: inner
                .completions
                .iter()
                .filter(|at| at.date_naive() == today)
                .count() as u64,
        }
    }
}

impl AchievementSink for CycleLog {
    fn report_cycle_start(&self) {
        let Ok(mut inner) = self.inner.lock() else {
            warn!("Cycle log lock poisoned, dropping report");
            return;
        };

        let now = Utc::now();
        inner.reports.push(now);
        if inner.run_open {
            inner.completions.push(now);
            if let Some(run) = inner.runs.last_mut() {
                run.completed_cycles += 1;
            }
            info!("Cycle completed ({} total)", inner.completions.len());
        } else {
            inner.run_open = true;
            inner.starts += 1;
            inner.runs.push(RunRecord::open(now));
            info!("Cycle run started ({} total)", inner.starts);
        }
    }
}
