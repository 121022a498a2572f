//! Pause Tracker - A drive/pause cycle timer for long-haul drivers
//!
//! This library runs the warm-up, driving, warning and rest countdown, plays
//! alert tones on phase changes, reports completed cycles to the achievement
//! tracker and serves the timer to rendering clients over HTTP.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
