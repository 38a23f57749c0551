use std::io;
use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
///
/// Nothing in the detector itself fails; every variant comes from a collaborator
/// (storage, snapshot source, effects) or from the actor plumbing around them.
#[derive(Debug, Error)]
pub enum AppError {
    /// Represents errors originating from the counter database, typically from `sqlx`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents a malformed snapshot file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Represents configuration-related errors (e.g., unparsable environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents data validation errors.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents a failing alert or notification effect.
    #[error("Effect failed: {0}")]
    Effect(String),

    /// Represents errors from the watcher actor, such as a closed channel.
    #[error("Actor error: {0}")]
    Actor(String),

    /// Represents errors from operations that did not complete in time.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout(format!("Operation timed out: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation errors: {}", err))
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for AppError {
    fn from(err: tokio::sync::oneshot::error::RecvError) -> Self {
        AppError::Actor(format!("Responder dropped: {}", err))
    }
}
