//! Named metric processors.
//!
//! A [`Registry`] maps a processor name to a constructor that builds the
//! transformation from a [`ProcessorConfig`]. The binary looks the
//! configured name up here and hands the result to the pool.
//!
//! # Built-in Processors
//!
//! | Name | Output |
//! |------|--------|
//! | `passthrough` | the input metric unchanged |
//! | `duplicate` | the input metric twice |
//! | `rename` | the metric with `PROCESSOR_PATTERN` replaced in its name |
//! | `filter` | the metric if its name matches `PROCESSOR_PATTERN`, else nothing |
//! | `split` | one metric per field, named `{name}_{field}` |

mod builtin;

use std::collections::HashMap;

use crate::config::{ConfigError, ProcessorConfig};
use crate::types::Metric;

/// A transformation ready to run on the pool.
pub type Processor = Box<dyn Fn(Metric) -> Vec<Metric> + Send + Sync>;

/// Builds a processor from its configuration.
pub type Constructor = fn(&ProcessorConfig) -> Result<Processor, ConfigError>;

/// Name -> constructor map.
#[derive(Clone, Default)]
pub struct Registry {
    entries: HashMap<String, Constructor>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in processor.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("passthrough", builtin::passthrough);
        registry.register("duplicate", builtin::duplicate);
        registry.register("rename", builtin::rename);
        registry.register("filter", builtin::filter);
        registry.register("split", builtin::split);
        registry
    }

    /// Insert a constructor, replacing any existing entry of that name.
    pub fn register(&mut self, name: impl Into<String>, constructor: Constructor) {
        self.entries.insert(name.into(), constructor);
    }

    /// Look a constructor up by exact name.
    pub fn get(&self, name: &str) -> Option<Constructor> {
        self.entries.get(name).copied()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the processor `config.name` refers to.
    pub fn build(&self, config: &ProcessorConfig) -> Result<Processor, ConfigError> {
        let constructor = self.get(&config.name).ok_or_else(|| ConfigError::Invalid {
            key: "PROCESSOR".into(),
            message: format!(
                "unknown processor '{}', expected one of: {}",
                config.name,
                self.names().join(", ")
            ),
        })?;
        constructor(config)
    }
}
