//! Processor selection and arguments.

use super::parse::{env_opt, env_or};
use super::ConfigError;

/// Which registered processor to run, plus its arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Registry name.
    pub name: String,
    /// Regex used by `rename` and `filter`.
    pub pattern: Option<String>,
    /// Replacement used by `rename`.
    pub replacement: Option<String>,
}

impl ProcessorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            name: env_or("PROCESSOR", "passthrough").to_lowercase(),
            pattern: env_opt("PROCESSOR_PATTERN"),
            replacement: env_opt("PROCESSOR_REPLACEMENT"),
        })
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = Some(replacement.into());
        self
    }

    /// The pattern, or `ConfigError::Missing` naming its variable.
    pub fn require_pattern(&self) -> Result<&str, ConfigError> {
        self.pattern.as_deref().ok_or_else(|| ConfigError::Missing {
            key: "PROCESSOR_PATTERN".into(),
        })
    }

    /// The replacement, or `ConfigError::Missing` naming its variable.
    pub fn require_replacement(&self) -> Result<&str, ConfigError> {
        self.replacement
            .as_deref()
            .ok_or_else(|| ConfigError::Missing {
                key: "PROCESSOR_REPLACEMENT".into(),
            })
    }
}
