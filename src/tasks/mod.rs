//! Background tasks module
//!
//! The two periodic tasks that drive the cycle timer while it runs.

pub mod blink_ticker;
pub mod cycle_ticker;

use tokio::task::JoinHandle;

// Re-export main functions
pub use blink_ticker::{blink_ticker_task, BLINK_PERIOD};
pub use cycle_ticker::{cycle_ticker_task, TICK_PERIOD};

/// Handles of the tasks spawned for one cycle run
#[derive(Debug)]
pub struct Tickers {
    pub epoch: u64,
    countdown: JoinHandle<()>,
    blink: JoinHandle<()>,
}

impl Tickers {
    pub fn new(epoch: u64, countdown: JoinHandle<()>, blink: JoinHandle<()>) -> Self {
        Self {
            epoch,
            countdown,
            blink,
        }
    }

    /// Cancel both tasks
    pub fn abort(&self) {
        self.countdown.abort();
        self.blink.abort();
    }
}

impl Drop for Tickers {
    fn drop(&mut self) {
        self.abort();
    }
}
