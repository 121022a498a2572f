//! Countdown ticker background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval_at, Instant};
use tracing::debug;

use crate::state::AppState;

/// One countdown unit per real second
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Background task that advances the countdown once per second.
///
/// Exits as soon as the controller reports the tick as stale, which happens
/// once the run it was spawned for has been stopped.
pub async fn cycle_ticker_task(state: Arc<AppState>, epoch: u64) {
    debug!("Starting countdown ticker for epoch {}", epoch);

    let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);

    loop {
        interval.tick().await;

        if !state.tick(epoch) {
            debug!("Countdown ticker for epoch {} finished", epoch);
            break;
        }
    }
}
