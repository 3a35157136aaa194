//! Built-in processor constructors.

use regex::Regex;

use super::Processor;
use crate::config::{ConfigError, ProcessorConfig};
use crate::types::Metric;

pub(super) fn passthrough(_: &ProcessorConfig) -> Result<Processor, ConfigError> {
    Ok(Box::new(|m: Metric| vec![m]))
}

pub(super) fn duplicate(_: &ProcessorConfig) -> Result<Processor, ConfigError> {
    Ok(Box::new(|m: Metric| vec![m.clone(), m]))
}

pub(super) fn rename(config: &ProcessorConfig) -> Result<Processor, ConfigError> {
    let re = compile(config.require_pattern()?)?;
    let replacement = config.require_replacement()?.to_string();

    Ok(Box::new(move |mut m: Metric| {
        let renamed = re.replace_all(&m.name, replacement.as_str()).into_owned();
        m.name = renamed;
        vec![m]
    }))
}

pub(super) fn filter(config: &ProcessorConfig) -> Result<Processor, ConfigError> {
    let re = compile(config.require_pattern()?)?;

    Ok(Box::new(move |m: Metric| {
        if re.is_match(&m.name) {
            vec![m]
        } else {
            Vec::new()
        }
    }))
}

pub(super) fn split(_: &ProcessorConfig) -> Result<Processor, ConfigError> {
    Ok(Box::new(|m: Metric| {
        m.fields
            .iter()
            .map(|(field, value)| Metric {
                name: format!("{}_{}", m.name, field),
                tags: m.tags.clone(),
                fields: [("value".to_string(), value.clone())].into_iter().collect(),
                timestamp: m.timestamp,
            })
            .collect()
    }))
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::Invalid {
        key: "PROCESSOR_PATTERN".into(),
        message: e.to_string(),
    })
}
