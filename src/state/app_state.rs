//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{CycleController, PhaseDurations, TickOutcome, TimerState};
use crate::{
    services::{
        AchievementSink, AlertEmitter, BellEmitter, BroadcastEmitter, CycleLog,
        EntitlementStore, InMemoryEntitlements, MultiEmitter, SilentEmitter, ToneEvent,
    },
    tasks::{blink_ticker_task, cycle_ticker_task, Tickers},
};

/// Main application state that owns the cycle controller and its tickers
pub struct AppState {
    /// The drive/pause state machine
    controller: Mutex<CycleController>,
    /// Tasks driving the current run, if any
    tickers: Mutex<Option<Tickers>>,
    /// Collaborators
    pub cycle_log: Arc<CycleLog>,
    pub entitlements: Arc<dyn EntitlementStore>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for timer updates
    pub timer_update_tx: watch::Sender<TimerState>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<TimerState>,
    /// Tones forwarded to connected clients
    pub tone_tx: broadcast::Sender<ToneEvent>,
}

impl AppState {
    /// Create a new AppState with the default collaborators.
    ///
    /// The terminal bell rings unless `silent` is set.
    pub fn new(port: u16, host: String, durations: PhaseDurations, silent: bool) -> Self {
        let emitter: Arc<dyn AlertEmitter> = if silent {
            Arc::new(SilentEmitter)
        } else {
            Arc::new(BellEmitter::stderr())
        };

        Self::build(
            port,
            host,
            durations,
            emitter,
            Arc::new(CycleLog::new()),
            Arc::new(InMemoryEntitlements::new()),
        )
    }

    /// Create an AppState with explicit collaborators
    pub fn with_collaborators(
        durations: PhaseDurations,
        emitter: Arc<dyn AlertEmitter>,
        cycle_log: Arc<CycleLog>,
        entitlements: Arc<dyn EntitlementStore>,
    ) -> Self {
        Self::build(
            0,
            "127.0.0.1".to_string(),
            durations,
            emitter,
            cycle_log,
            entitlements,
        )
    }

    /// Tones reach `emitter` and every `tone_tx` subscriber
    fn build(
        port: u16,
        host: String,
        durations: PhaseDurations,
        emitter: Arc<dyn AlertEmitter>,
        cycle_log: Arc<CycleLog>,
        entitlements: Arc<dyn EntitlementStore>,
    ) -> Self {
        let (tone_tx, _) = broadcast::channel(32);
        let (timer_update_tx, timer_update_rx) = watch::channel(TimerState::new());
        let emitter = MultiEmitter::new()
            .with(emitter)
            .with(Arc::new(BroadcastEmitter::new(tone_tx.clone())));
        let sink: Arc<dyn AchievementSink> = Arc::clone(&cycle_log) as Arc<dyn AchievementSink>;

        Self {
            controller: Mutex::new(CycleController::new(durations, Arc::new(emitter), sink)),
            tickers: Mutex::new(None),
            cycle_log,
            entitlements,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
            tone_tx,
        }
    }

    /// Controller updates are plain field writes, so a poisoned lock is still usable
    fn controller(&self) -> MutexGuard<'_, CycleController> {
        self.controller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tickers(&self) -> MutexGuard<'_, Option<Tickers>> {
        self.tickers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a cycle run. Idempotent while running.
    ///
    /// Returns the snapshot and whether this call started the run. Must be
    /// called from within a tokio runtime, the tickers are spawned on it.
    pub fn start(self: &Arc<Self>) -> (TimerState, bool) {
        self.record_action("start");
        let mut controller = self.controller();
        let started = match controller.start() {
            Some(epoch) => {
                self.spawn_tickers(epoch);
                true
            }
            None => false,
        };
        (self.publish(controller.snapshot()), started)
    }

    /// Stop the run from any phase
    pub fn stop(&self) -> TimerState {
        self.record_action("stop");
        let mut controller = self.controller();
        controller.stop();
        self.finish_run();
        self.publish(controller.snapshot())
    }

    /// Stop and zero the timer
    pub fn reset(&self) -> TimerState {
        self.record_action("reset");
        let mut controller = self.controller();
        controller.reset();
        self.finish_run();
        self.publish(controller.snapshot())
    }

    /// Start when idle, stop when running
    pub fn toggle(self: &Arc<Self>) -> TimerState {
        self.record_action("toggle");
        let mut controller = self.controller();
        match controller.toggle() {
            Some(epoch) => self.spawn_tickers(epoch),
            None => self.finish_run(),
        }
        self.publish(controller.snapshot())
    }

    /// Apply one countdown tick from the run tagged `epoch`.
    ///
    /// Returns false once that run is over, telling the ticker to exit.
    pub fn tick(&self, epoch: u64) -> bool {
        let mut controller = self.controller();
        match controller.tick(epoch) {
            TickOutcome::Stale => false,
            TickOutcome::Counted | TickOutcome::Transitioned { .. } => {
                self.publish(controller.snapshot());
                true
            }
        }
    }

    /// Apply one blink toggle from the run tagged `epoch`.
    ///
    /// Returns false once that run is over.
    pub fn toggle_blink(&self, epoch: u64) -> bool {
        let mut controller = self.controller();
        if controller.toggle_blink(epoch) {
            self.publish(controller.snapshot());
        }
        controller.is_running() && controller.epoch() == epoch
    }

    /// Current timer snapshot
    pub fn get_timer_state(&self) -> TimerState {
        self.controller().snapshot()
    }

    /// Phase lengths the controller runs with
    pub fn durations(&self) -> PhaseDurations {
        *self.controller().durations()
    }

    /// Stop the timer and cancel its tasks before the process exits
    pub fn shutdown(&self) {
        info!("Shutting down cycle timer");
        let mut controller = self.controller();
        controller.stop();
        self.finish_run();
        self.publish(controller.snapshot());
    }

    fn spawn_tickers(self: &Arc<Self>, epoch: u64) {
        let countdown = tokio::spawn(cycle_ticker_task(Arc::clone(self), epoch));
        let blink = tokio::spawn(blink_ticker_task(Arc::clone(self), epoch));

        // Replacing drops and aborts any leftover tickers
        if let Some(old) = self.tickers().replace(Tickers::new(epoch, countdown, blink)) {
            debug!("Replaced tickers of epoch {}", old.epoch);
        }
    }

    fn finish_run(&self) {
        if let Some(tickers) = self.tickers().take() {
            debug!("Cancelling tickers of epoch {}", tickers.epoch);
            tickers.abort();
        }
        self.cycle_log.close_run();
    }

    fn publish(&self, snapshot: TimerState) -> TimerState {
        if let Err(e) = self.timer_update_tx.send(snapshot.clone()) {
            warn!("Failed to send timer update: {}", e);
        }
        snapshot
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Whether the ticker tasks for a run are alive
    pub fn has_tickers(&self) -> bool {
        self.tickers().is_some()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
