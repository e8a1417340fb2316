use thiserror::Error;

/// Custom error type for Fabula operations.
#[derive(Debug, Clone, Error)]
pub enum FabulaError {
    /// Background task failed to complete.
    #[error("Task error: {0}")]
    Task(String),

    /// Internal invariant was violated (programming error).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for FabulaError {
    fn from(err: tokio::task::JoinError) -> Self {
        FabulaError::Task(err.to_string())
    }
}
