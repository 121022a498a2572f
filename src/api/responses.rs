//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    services::{PremiumStatus, RunRecord},
    state::TimerState,
};

/// API response structure for timer command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerState,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerState) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Response reflecting whether the timer ended up running
    pub fn for_timer(message: String, timer: TimerState) -> Self {
        if timer.is_running {
            Self::active(message, timer)
        } else {
            Self::inactive(message, timer)
        }
    }

    /// Create an active response
    pub fn active(message: String, timer: TimerState) -> Self {
        Self::new("active".to_string(), message, timer)
    }

    /// Create an inactive response
    pub fn inactive(message: String, timer: TimerState) -> Self {
        Self::new("inactive".to_string(), message, timer)
    }
}

/// Status response with timer and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerState,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Premium status with the time left on a timed unlock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumResponse {
    #[serde(flatten)]
    pub status: PremiumStatus,
    pub remaining_seconds: Option<i64>,
}

impl PremiumResponse {
    pub fn new(status: PremiumStatus, now: DateTime<Utc>) -> Self {
        let remaining_seconds = status.remaining_seconds(now);
        Self {
            status,
            remaining_seconds,
        }
    }
}

/// One history row with its elapsed time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub run: RunRecord,
    pub duration_seconds: u64,
}

impl HistoryEntry {
    pub fn new(run: RunRecord, now: DateTime<Utc>) -> Self {
        let duration_seconds = run.duration_seconds(now);
        Self {
            run,
            duration_seconds,
        }
    }
}

/// Body of POST /premium/unlock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockRequest {
    pub code: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
