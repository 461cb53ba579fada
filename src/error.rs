//! Error types for Pulse Sentinel

use thiserror::Error;

/// Errors raised by a reading/profile store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store state corrupted: {0}")]
    Corrupted(String),
}

/// Errors that can occur while evaluating readings
///
/// Insufficient data and degenerate statistics are never errors; they
/// resolve to GREEN outcomes or neutral baselines.
#[derive(Debug, Error)]
pub enum SentinelError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Invalid reading: {0}")]
    ValidationError(String),
}
