//! Destinations for pool output records.
//!
//! Workers call [`Sink::accept`] concurrently, so every implementation
//! synchronizes internally. The pool itself never serializes sink access.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

/// Accepts completed records, one at a time.
pub trait Sink<R>: Send + Sync {
    /// Accept one output record. Always completes; failures are the
    /// sink's own concern.
    fn accept(&self, record: R);
}

impl<R, S> Sink<R> for Arc<S>
where
    S: Sink<R> + ?Sized,
{
    fn accept(&self, record: R) {
        (**self).accept(record)
    }
}

/// Collects records in memory.
#[derive(Debug)]
pub struct MemorySink<R> {
    records: Mutex<Vec<R>>,
}

impl<R> MemorySink<R> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Remove and return everything collected so far.
    pub fn take(&self) -> Vec<R> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Clone> MemorySink<R> {
    /// Copy of the collected records, in acceptance order.
    pub fn records(&self) -> Vec<R> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<R> Default for MemorySink<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Send> Sink<R> for MemorySink<R> {
    fn accept(&self, record: R) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

/// Writes each record as one JSON line.
///
/// The writer sits behind a mutex so concurrent workers never interleave
/// partial lines. Write and encode failures are logged and counted.
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
    written: AtomicU64,
    errors: AtomicU64,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            written: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    /// Number of lines written successfully.
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Number of records that failed to encode or write.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn flush(&self) -> std::io::Result<()> {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R, W> Sink<R> for JsonLinesSink<W>
where
    R: Serialize,
    W: Write + Send,
{
    fn accept(&self, record: R) {
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                tracing::error!(error = %e, "failed to encode record");
                return;
            }
        };

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        match writeln!(writer, "{}", line) {
            Ok(()) => {
                self.written.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                tracing::error!(error = %e, "failed to write record");
            }
        }
    }
}
