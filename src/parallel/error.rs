//! Worker pool error types.

use std::fmt;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool was constructed with zero workers.
    InvalidWorkerCount,

    /// The pool has been stopped and no longer accepts records.
    Stopped,

    /// A worker thread could not be spawned.
    Spawn(String),

    /// A transformation or sink call panicked inside a worker.
    WorkerPanic(String),
}

impl PoolError {
    /// Check if this is a stopped-pool error.
    pub fn is_stopped(&self) -> bool {
        matches!(self, PoolError::Stopped)
    }

    /// Get the error message for logging.
    pub fn message(&self) -> &str {
        match self {
            PoolError::InvalidWorkerCount => "Invalid worker count",
            PoolError::Stopped => "Pool stopped",
            PoolError::Spawn(_) => "Worker spawn failed",
            PoolError::WorkerPanic(_) => "Worker panic",
        }
    }

    /// Build a `WorkerPanic` from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        PoolError::WorkerPanic(msg)
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::InvalidWorkerCount => {
                write!(f, "worker count must be at least 1")
            }
            PoolError::Stopped => {
                write!(f, "pool has been stopped")
            }
            PoolError::Spawn(msg) => {
                write!(f, "failed to spawn worker: {}", msg)
            }
            PoolError::WorkerPanic(msg) => {
                write!(f, "worker panic: {}", msg)
            }
        }
    }
}

impl std::error::Error for PoolError {}

impl From<std::io::Error> for PoolError {
    fn from(e: std::io::Error) -> Self {
        PoolError::Spawn(e.to_string())
    }
}

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
