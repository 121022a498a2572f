//! Blink toggle background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval_at, Instant};
use tracing::debug;

use crate::state::AppState;

pub const BLINK_PERIOD: Duration = Duration::from_millis(500);

/// Background task that flips the blink flag every half second.
///
/// Runs on its own interval, independent of the countdown.
pub async fn blink_ticker_task(state: Arc<AppState>, epoch: u64) {
    debug!("Starting blink ticker for epoch {}", epoch);

    let mut interval = interval_at(Instant::now() + BLINK_PERIOD, BLINK_PERIOD);

    loop {
        interval.tick().await;

        if !state.toggle_blink(epoch) {
            debug!("Blink ticker for epoch {} finished", epoch);
            break;
        }
    }
}
