//! Unordered parallel processing pool.
//!
//! A fixed set of worker threads drains one bounded queue, applies a
//! transformation to every record and forwards each output to a shared sink.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      Unordered                             │
//! ├────────────────────────────────────────────────────────────┤
//! │              ┌───────────────┐                             │
//! │              │   enqueue()   │  (blocks when full)         │
//! │              └───────┬───────┘                             │
//! │                      │                                     │
//! │              ┌───────▼───────┐                             │
//! │              │ sync_channel  │  (capacity = workers)       │
//! │              └───────┬───────┘                             │
//! │       ┌──────────────┼──────────────┐                      │
//! │  ┌────▼────┐    ┌────▼────┐    ┌────▼────┐                 │
//! │  │ Worker0 │    │ Worker1 │    │ Worker2 │  ...            │
//! │  └────┬────┘    └────┬────┘    └────┬────┘                 │
//! │       │  transform(record) -> [out, ...]                   │
//! │       └──────────────┼──────────────┘                      │
//! │              ┌───────▼───────┐                             │
//! │              │  Sink::accept │  (shared, thread-safe)      │
//! │              └───────────────┘                             │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Outputs of one transformation reach the sink in the order produced.
//! Nothing is guaranteed across records.

mod error;
mod unordered;

pub use error::{PoolError, PoolResult};
pub use unordered::{PoolOptions, Unordered};

/// Interface of a parallel record processor.
///
/// Implementations must be thread-safe so several producers can share one
/// handle.
pub trait Parallel: Send + Sync {
    /// The record type flowing through the pool.
    type Record: Send + 'static;

    /// Enqueue a record, blocking while the queue is full.
    ///
    /// # Panics
    ///
    /// Panics if the pool has been stopped.
    fn enqueue(&self, record: Self::Record);

    /// Enqueue a record, blocking while the queue is full.
    ///
    /// Returns `PoolError::Stopped` instead of panicking on a stopped pool.
    fn submit(&self, record: Self::Record) -> PoolResult<()>;

    /// Close the input and wait until every worker has drained the queue
    /// and exited.
    fn stop(&self);

    /// Returns the number of worker threads.
    fn worker_count(&self) -> usize;

    /// Returns the maximum queue capacity.
    fn queue_capacity(&self) -> usize;

    /// Returns the number of records not yet picked up by a worker.
    fn pending_count(&self) -> usize;
}

/// Counters describing what a pool has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Records accepted by `enqueue`/`submit`.
    pub received: u64,
    /// Records a worker finished with (including panicked ones).
    pub processed: u64,
    /// Output records forwarded to the sink.
    pub emitted: u64,
    /// Records whose transformation or forwarding panicked.
    pub panicked: u64,
}
