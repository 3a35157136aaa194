//! metric_pool - Unordered parallel metric processing.
//!
//! This crate runs a caller-supplied transformation over a stream of
//! records on a fixed pool of worker threads, forwarding every output to a
//! shared sink. Arrival order is not preserved; the outputs of a single
//! record keep the order the transformation produced them in.
//!
//! # Features
//!
//! - **Bounded queue**: capacity equals the worker count, a slow sink
//!   blocks the producer instead of growing memory
//! - **Drain-and-stop**: `stop` returns only after every accepted record
//!   has been processed
//! - **Panic isolation**: a panicking transformation is logged and counted,
//!   the worker keeps going
//! - **Processor registry**: built-in metric transformations by name
//! - **Prometheus metrics**: throughput, latency and queue depth per pool
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use metric_pool::parallel::Unordered;
//! use metric_pool::sink::MemorySink;
//!
//! let sink = Arc::new(MemorySink::new());
//! let pool = Unordered::new(sink.clone(), |x: u32| vec![x, x], 2)?;
//! for x in [1, 2, 3] {
//!     pool.enqueue(x);
//! }
//! pool.stop();
//! assert_eq!(sink.len(), 6);
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars), empty outside a git checkout
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod config;
pub mod ingest;
pub mod logging;
pub mod observability;
pub mod parallel;
pub mod processors;
pub mod sink;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use parallel::{Parallel, PoolError, PoolOptions, PoolResult, PoolStats, Unordered};
pub use sink::Sink;
pub use types::Metric;
