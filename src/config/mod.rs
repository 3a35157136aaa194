//! Configuration module for metric_pool.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use metric_pool::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Workers: {}", config.pool.worker_count());
//! println!("Processor: {}", config.processor.name);
//! ```

mod error;
mod logging;
mod parse;
mod pool;
mod processor;

use std::path::PathBuf;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use pool::PoolConfig;
pub use processor::ProcessorConfig;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Worker pool configuration.
    pub pool: PoolConfig,
    /// Processor selection.
    pub processor: ProcessorConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Where to write prometheus metrics on exit.
    pub metrics_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            pool: PoolConfig::from_env()?,
            processor: ProcessorConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            metrics_file: parse::env_opt("METRICS_FILE").map(PathBuf::from),
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Pool: {}", self.pool.name);
        info!("  Workers: {}", self.pool.worker_count());
        info!("  Queue capacity: {}", self.pool.queue_capacity());
        info!("  Processor: {}", self.processor.name);

        if let Some(ref pattern) = self.processor.pattern {
            info!("  Pattern: {}", pattern);
        }

        if let Some(ref path) = self.metrics_file {
            info!("  Metrics file: {}", path.display());
        }
    }
}
