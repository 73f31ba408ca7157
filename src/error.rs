//! Error types for vitalscore

use thiserror::Error;

/// Errors that can occur while computing a score
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Invalid window: {0} days (must be between 1 and 3650)")]
    InvalidWindow(i64),

    /// Returned by fallible `MetricStore` implementations (e.g. a database
    /// adapter); the bundled in-memory store never produces it
    #[error("Store query failed: {0}")]
    Store(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
