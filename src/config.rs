//! Pool configuration from the environment.

use std::fmt;
use std::num::NonZeroUsize;

/// Errors from configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse an environment variable.
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// A value parsed but is not usable.
    Invalid { key: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, error } => {
                write!(f, "failed to parse {}={:?}: {}", key, value, error)
            }
            ConfigError::Invalid { key, message } => {
                write!(f, "invalid value for {}: {}", key, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Get an environment variable, falling back to a default.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// `0` means auto-detect; the result is always at least one.
fn resolve_workers(workers: usize) -> NonZeroUsize {
    NonZeroUsize::new(workers)
        .or_else(|| NonZeroUsize::new(num_cpus::get()))
        .unwrap_or(NonZeroUsize::MIN)
}

/// Pool configuration.
///
/// | Variable           | Default    | Meaning                              |
/// |--------------------|------------|--------------------------------------|
/// | `TASKPOOL_WORKERS` | `0`        | worker threads, `0` = one per CPU    |
/// | `TASKPOOL_NAME`    | `taskpool` | pool name for thread names and logs  |
///
/// ```
/// use taskpool::{PoolConfig, TaskPool};
///
/// let config = PoolConfig::from_env().expect("pool config");
/// let pool = TaskPool::from_config(&config);
/// assert!(pool.worker_count() >= 1);
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Resolved worker count, never zero.
    workers: NonZeroUsize,
    /// Pool name used in thread names and log fields.
    name: String,
}

impl PoolConfig {
    /// Build a config with an explicit worker count; `0` means one per CPU.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: resolve_workers(workers),
            name: "taskpool".to_string(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = env_or("TASKPOOL_WORKERS", "0");
        let workers: usize = raw.parse().map_err(|e| ConfigError::Parse {
            key: "TASKPOOL_WORKERS".to_string(),
            value: raw.clone(),
            error: format!("{}", e),
        })?;

        let name = env_or("TASKPOOL_NAME", "taskpool");
        if name.is_empty() {
            return Err(ConfigError::Invalid {
                key: "TASKPOOL_NAME".to_string(),
                message: "pool name cannot be empty".to_string(),
            });
        }

        Ok(Self {
            workers: resolve_workers(workers),
            name,
        })
    }

    /// Replace the pool name.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty, the same rule `TASKPOOL_NAME` is held to.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "pool name cannot be empty");
        self.name = name;
        self
    }

    /// Worker threads to spawn, pre-resolved and never zero.
    pub fn worker_count(&self) -> usize {
        self.workers.get()
    }

    /// Pool name used for worker threads and logging.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
