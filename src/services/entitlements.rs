//! Premium entitlement store

use std::{str::FromStr, sync::Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::EntitlementError;

/// Codes that unlock premium access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockCode {
    /// Two hour pass
    Desmayao,
    /// One year pass
    DesmayaoTotal,
    /// Paid, never expires
    Purchase,
}

impl UnlockCode {
    /// How long the unlock lasts, `None` for permanent
    pub fn lifetime(self) -> Option<Duration> {
        match self {
            UnlockCode::Desmayao => Some(Duration::hours(2)),
            UnlockCode::DesmayaoTotal => Some(Duration::days(365)),
            UnlockCode::Purchase => None,
        }
    }
}

impl FromStr for UnlockCode {
    type Err = EntitlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "desmayao" => Ok(UnlockCode::Desmayao),
            "desmayaototal" => Ok(UnlockCode::DesmayaoTotal),
            _ => Err(EntitlementError::UnknownCode(s.to_string())),
        }
    }
}

/// Current premium state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumStatus {
    pub is_premium: bool,
    pub code: Option<UnlockCode>,
    /// `None` while premium means the unlock is permanent
    pub expires_at: Option<DateTime<Utc>>,
}

impl PremiumStatus {
    pub fn free() -> Self {
        Self {
            is_premium: false,
            code: None,
            expires_at: None,
        }
    }

    /// Seconds left on a timed unlock
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at
            .map(|expiry| (expiry - now).num_seconds().max(0))
    }
}

/// Storage for the premium unlock
pub trait EntitlementStore: Send + Sync {
    /// Premium state at `now`, clearing expired unlocks
    fn status(&self, now: DateTime<Utc>) -> PremiumStatus;

    /// Record an unlock
    fn unlock(&self, code: UnlockCode, now: DateTime<Utc>) -> PremiumStatus;

    /// Fail with [`EntitlementError::NotPremium`] unless premium is active
    fn require_premium(&self, now: DateTime<Utc>) -> Result<(), EntitlementError> {
        if self.status(now).is_premium {
            Ok(())
        } else {
            Err(EntitlementError::NotPremium)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Grant {
    code: UnlockCode,
    expires_at: Option<DateTime<Utc>>,
}

/// Entitlements kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryEntitlements {
    grant: Mutex<Option<Grant>>,
}

impl InMemoryEntitlements {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntitlementStore for InMemoryEntitlements {
    fn status(&self, now: DateTime<Utc>) -> PremiumStatus {
        let Ok(mut grant) = self.grant.lock() else {
            warn!("Entitlement lock poisoned, treating as free tier");
            return PremiumStatus::free();
        };

        let current = *grant;
        match current {
            Some(Grant { code, expires_at: None }) => PremiumStatus {
                is_premium: true,
                code: Some(code),
                expires_at: None,
            },
            Some(Grant { code, expires_at: Some(expiry) }) if now < expiry => PremiumStatus {
                is_premium: true,
                code: Some(code),
                expires_at: Some(expiry),
            },
            Some(_) => {
                info!("Premium unlock expired");
                *grant = None;
                PremiumStatus::free()
            }
            None => PremiumStatus::free(),
        }
    }

    fn unlock(&self, code: UnlockCode, now: DateTime<Utc>) -> PremiumStatus {
        let expires_at = code.lifetime().map(|lifetime| now + lifetime);
        match self.grant.lock() {
            Ok(mut grant) => {
                *grant = Some(Grant { code, expires_at });
                info!("Premium unlocked with {:?}, expires at {:?}", code, expires_at);
            }
            Err(e) => warn!("Failed to store premium unlock: {}", e),
        }
        self.status(now)
    }
}
