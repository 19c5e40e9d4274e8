//! Error types shared by the engine, the feed and the CLI.
//!
//! `MarketError` covers the failure taxonomy of the dashboard core: missing
//! symbols, throttled or failing quote sources, malformed requests, mock auth
//! failures, plus the plumbing errors (I/O, JSON, channels, poisoned locks)
//! raised by the binaries and the account store.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type for the workspace.
#[derive(Error, Debug)]
pub enum MarketError {
    /// Requested symbol is not part of the universe or the source has no data for it.
    #[error("Symbol not found: {0}")]
    NotFound(String),

    /// The external quote source refused the call because of its request budget.
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Any other failure of an external quote source.
    #[error("Quote source failure: {0}")]
    Transient(String),

    /// Malformed request parameters (unknown timeframe, model, empty input...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Mock authentication or account lookup failure.
    #[error("Auth error: {0}")]
    Auth(String),

    /// I/O error originating from the standard library or files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Channel receive failed (e.g., sender closed or timed out).
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),

    /// Installing the Ctrl+C handler failed.
    #[error("Signal handler error: {0}")]
    Signal(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for MarketError {
    fn from(err: PoisonError<T>) -> Self {
        MarketError::MutexLock(err.to_string())
    }
}
