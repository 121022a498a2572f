//! Collaborator services module
//!
//! This module contains the outbound collaborators of the cycle timer: audio
//! output, cycle reporting and premium entitlements.

pub mod achievements;
pub mod audio;
pub mod entitlements;

// Re-export main types
pub use achievements::{AchievementSink, CycleLog, CycleStats, CycleSummary, RunRecord, RunStatus};
pub use audio::{
    AlertEmitter, BellEmitter, BroadcastEmitter, MultiEmitter, SilentEmitter, ToneEvent, ToneKind,
    ToneShape,
};
pub use entitlements::{EntitlementStore, InMemoryEntitlements, PremiumStatus, UnlockCode};
