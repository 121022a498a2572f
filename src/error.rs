//! Error types for the timer's collaborators

use thiserror::Error;

/// Errors raised while producing a tone
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio output has not been primed by a user action")]
    NotPrimed,

    #[error("Failed to write tone to audio output: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the entitlement store
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EntitlementError {
    #[error("Unknown unlock code: {0}")]
    UnknownCode(String),

    #[error("Premium access required")]
    NotPremium,
}
