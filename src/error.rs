//! Pool error types.

use std::fmt;

/// Errors surfaced by pool operations and task handles.
#[derive(Debug, Clone)]
pub enum PoolError {
    /// The submission was rejected because the pool is no longer running.
    Rejected,

    /// The pool was hard-stopped before the awaited task completed.
    Stopped,

    /// The task panicked while executing; the payload message is captured.
    Panicked(String),

    /// The task's outcome was already taken through this handle.
    Taken,
}

impl PoolError {
    /// Check if this is a rejected-submission error.
    pub fn is_rejected(&self) -> bool {
        matches!(self, PoolError::Rejected)
    }

    /// Check if this is a pool-stopped error.
    pub fn is_stopped(&self) -> bool {
        matches!(self, PoolError::Stopped)
    }

    /// Check if this is a captured task panic.
    pub fn is_panicked(&self) -> bool {
        matches!(self, PoolError::Panicked(_))
    }

    /// Check if this is an already-taken outcome.
    pub fn is_taken(&self) -> bool {
        matches!(self, PoolError::Taken)
    }

    /// Get the error message for logging.
    pub fn message(&self) -> &str {
        match self {
            PoolError::Rejected => "Submission rejected",
            PoolError::Stopped => "Pool stopped",
            PoolError::Panicked(msg) => msg,
            PoolError::Taken => "Outcome taken",
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Rejected => {
                write!(f, "submission rejected: pool is not running")
            }
            PoolError::Stopped => {
                write!(f, "pool stopped before the task completed")
            }
            PoolError::Panicked(msg) => {
                write!(f, "task panicked: {}", msg)
            }
            PoolError::Taken => {
                write!(f, "task outcome already taken")
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
