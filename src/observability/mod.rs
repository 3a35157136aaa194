//! Observability for the processing pool.
//!
//! # Prometheus Metrics
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use metric_pool::observability::Metrics;
//! use metric_pool::parallel::{PoolOptions, Unordered};
//!
//! let metrics = Arc::new(Metrics::new()?);
//! let options = PoolOptions::new(4).with_metrics(metrics.clone());
//! let pool = Unordered::with_options(sink, |m| vec![m], options)?;
//! // ... enqueue, stop ...
//! println!("{}", metrics.export());
//! ```

pub mod metrics;

pub use metrics::Metrics;
