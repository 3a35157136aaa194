//! Pool configuration.

use super::parse::{env_or, parse_value};
use super::ConfigError;
use std::num::NonZeroUsize;

/// Pool configuration loaded from environment.
///
/// The worker count is resolved at load time, so it is never zero.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Pool name (thread prefix, metric label).
    pub name: String,
    /// Resolved worker count, also the queue capacity.
    workers: NonZeroUsize,
}

impl PoolConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            name: env_or("POOL_NAME", "processor"),
            workers: Self::parse_worker_count(&env_or("POOL_WORKERS", "0"))?,
        })
    }

    pub fn new(name: impl Into<String>, workers: NonZeroUsize) -> Self {
        Self {
            name: name.into(),
            workers,
        }
    }

    /// Get worker count.
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers.get()
    }

    /// Queue capacity always equals the worker count.
    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.workers.get()
    }

    fn parse_worker_count(raw: &str) -> Result<NonZeroUsize, ConfigError> {
        let workers: usize = parse_value("POOL_WORKERS", raw)?;

        // Resolve 0 to CPU count
        let count = if workers == 0 {
            num_cpus::get()
        } else {
            workers
        };

        NonZeroUsize::new(count).ok_or_else(|| ConfigError::Invalid {
            key: "POOL_WORKERS".into(),
            message: "worker count cannot be zero".into(),
        })
    }
}
