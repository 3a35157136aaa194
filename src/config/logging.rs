//! Logging configuration.

use std::str::FromStr;

use super::parse::{env_opt, env_or, env_parse};
use super::ConfigError;

/// Output format for log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable tracing fmt output.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected text or json, got '{}'", other)),
        }
    }
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Line format.
    pub format: LogFormat,
    /// Service name for structured logging.
    pub service_name: String,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// RUST_LOG accepts full tracing filter syntax: metric_pool=debug
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            filter: Self::resolve_log_filter(env_opt("LOG_LEVEL"), env_opt("RUST_LOG")),
            format: env_parse("LOG_FORMAT", LogFormat::Text)?,
            service_name: env_or("SERVICE_NAME", "metric_pool"),
        })
    }

    /// Resolve log filter from LOG_LEVEL and RUST_LOG values.
    fn resolve_log_filter(level: Option<String>, rust_log: Option<String>) -> String {
        if let Some(level) = level {
            let level = level.to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    return format!("metric_pool={}", level);
                }
                _ => {
                    // Logging is not up yet
                    eprintln!(
                        "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                        level
                    );
                }
            }
        }

        rust_log.unwrap_or_else(|| "metric_pool=info".to_string())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "metric_pool=info".to_string(),
            format: LogFormat::Text,
            service_name: "metric_pool".to_string(),
        }
    }
}
