//! Unordered worker pool implementation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use super::error::{PoolError, PoolResult};
use super::{Parallel, PoolStats};
use crate::observability::Metrics;
use crate::sink::Sink;

/// Default pool name used for thread names and metric labels.
const DEFAULT_POOL_NAME: &str = "parallel";

/// Construction options for [`Unordered`].
#[derive(Clone)]
pub struct PoolOptions {
    /// Pool name for logging, thread names and metric labels.
    pub name: String,
    /// Number of workers, also the queue capacity.
    pub workers: usize,
    /// Optional prometheus metrics to update while running.
    pub metrics: Option<Arc<Metrics>>,
}

impl PoolOptions {
    pub fn new(workers: usize) -> Self {
        Self {
            name: DEFAULT_POOL_NAME.to_string(),
            workers,
            metrics: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

#[derive(Default)]
struct Counters {
    received: AtomicU64,
    processed: AtomicU64,
    emitted: AtomicU64,
    panicked: AtomicU64,
}

/// State shared between the pool handle and its workers.
struct Shared<R, F, S> {
    name: String,
    transform: F,
    sink: S,
    receiver: Mutex<mpsc::Receiver<R>>,
    /// Records accepted (or blocked in `submit`) but not yet dequeued.
    pending: AtomicUsize,
    /// Workers that have not exited yet.
    running: AtomicUsize,
    counters: Counters,
    metrics: Option<Arc<Metrics>>,
}

/// A bounded pool that transforms records concurrently and forwards the
/// outputs to a sink without preserving arrival order.
///
/// Workers start on construction. [`Unordered::stop`] closes the queue and
/// returns once every accepted record has been processed.
pub struct Unordered<R, F, S>
where
    R: Send + 'static,
    F: Fn(R) -> Vec<R> + Send + Sync + 'static,
    S: Sink<R> + 'static,
{
    /// `None` once stopped.
    sender: RwLock<Option<mpsc::SyncSender<R>>>,
    /// Worker thread handles.
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
    shared: Arc<Shared<R, F, S>>,
}

impl<R, F, S> Unordered<R, F, S>
where
    R: Send + 'static,
    F: Fn(R) -> Vec<R> + Send + Sync + 'static,
    S: Sink<R> + 'static,
{
    /// Create a pool with `workers` threads and a queue of the same size.
    ///
    /// Returns `PoolError::InvalidWorkerCount` when `workers` is zero.
    pub fn new(sink: S, transform: F, workers: usize) -> PoolResult<Self> {
        Self::with_options(sink, transform, PoolOptions::new(workers))
    }

    /// Create a pool from explicit options.
    pub fn with_options(sink: S, transform: F, options: PoolOptions) -> PoolResult<Self> {
        let PoolOptions {
            name,
            workers,
            metrics,
        } = options;

        if workers == 0 {
            return Err(PoolError::InvalidWorkerCount);
        }

        let (sender, receiver) = mpsc::sync_channel::<R>(workers);
        let shared = Arc::new(Shared {
            name,
            transform,
            sink,
            receiver: Mutex::new(receiver),
            pending: AtomicUsize::new(0),
            running: AtomicUsize::new(0),
            counters: Counters::default(),
            metrics,
        });

        let mut handles = Vec::with_capacity(workers);

        for id in 0..workers {
            let worker_shared = Arc::clone(&shared);
            // Counted before spawning so an early exit never underflows
            shared.worker_started();

            let spawned = thread::Builder::new()
                .name(format!("{}-{}", shared.name, id))
                .spawn(move || worker_shared.worker_loop(id));

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    shared.worker_exited();
                    tracing::error!(
                        pool = %shared.name,
                        worker = id,
                        error = %e,
                        "failed to spawn worker"
                    );
                    // Release the workers that did start
                    drop(sender);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(e.into());
                }
            }
        }

        shared.observe(|m, pool| m.record_pool_started(pool, workers));

        tracing::info!(
            pool = %shared.name,
            workers = workers,
            capacity = workers,
            "pool created"
        );

        Ok(Self {
            sender: RwLock::new(Some(sender)),
            workers: Mutex::new(handles),
            worker_count: workers,
            shared,
        })
    }

    /// Enqueue a record, blocking while the queue is full.
    ///
    /// # Panics
    ///
    /// Panics if the pool has been stopped. Use [`Unordered::submit`] to
    /// get an error instead.
    pub fn enqueue(&self, record: R) {
        if let Err(e) = self.submit(record) {
            panic!("enqueue on pool '{}': {}", self.shared.name, e);
        }
    }

    /// Enqueue a record, blocking while the queue is full.
    pub fn submit(&self, record: R) -> PoolResult<()> {
        // Clone so a blocked send does not hold the lock `stop` needs.
        let sender = self
            .sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(PoolError::Stopped)?;

        self.shared.pending_add();

        if sender.send(record).is_err() {
            self.shared.pending_sub();
            return Err(PoolError::Stopped);
        }

        self.shared.counters.received.fetch_add(1, Ordering::Relaxed);
        self.shared.observe(|m, pool| m.record_received(pool));

        Ok(())
    }

    /// Close the queue and wait for every worker to drain it and exit.
    ///
    /// Calling `stop` again, or concurrently, waits for the same shutdown
    /// and then returns.
    pub fn stop(&self) {
        let sender = self
            .sender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let stopping = sender.is_some();
        if stopping {
            tracing::info!(
                pool = %self.shared.name,
                pending = self.pending_count(),
                "stopping pool"
            );
        }

        // Workers exit once the channel is closed and empty
        drop(sender);

        // Held across the joins so a second caller waits too
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        for handle in workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!(pool = %self.shared.name, "worker exited abnormally");
            }
        }

        if stopping {
            let stats = self.stats();
            tracing::info!(
                pool = %self.shared.name,
                received = stats.received,
                processed = stats.processed,
                emitted = stats.emitted,
                panicked = stats.panicked,
                "pool stopped"
            );
        }
    }

    /// True once `stop` has been called.
    pub fn is_stopped(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Get the number of workers.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Get the queue capacity (equal to the worker count).
    pub fn queue_capacity(&self) -> usize {
        self.worker_count
    }

    /// Get the number of records not yet picked up by a worker.
    pub fn pending_count(&self) -> usize {
        self.shared.pending.load(Ordering::SeqCst)
    }

    /// Get the number of workers that have not exited.
    pub fn running_workers(&self) -> usize {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Get the pool name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        let c = &self.shared.counters;
        PoolStats {
            received: c.received.load(Ordering::Relaxed),
            processed: c.processed.load(Ordering::Relaxed),
            emitted: c.emitted.load(Ordering::Relaxed),
            panicked: c.panicked.load(Ordering::Relaxed),
        }
    }
}

impl<R, F, S> Shared<R, F, S>
where
    R: Send + 'static,
    F: Fn(R) -> Vec<R> + Send + Sync + 'static,
    S: Sink<R> + 'static,
{
    /// Worker thread main loop.
    fn worker_loop(&self, id: usize) {
        tracing::debug!(pool = %self.name, worker = id, "worker started");

        loop {
            let work = {
                let guard = self.receiver.lock().unwrap_or_else(PoisonError::into_inner);
                guard.recv()
            };

            match work {
                Ok(record) => {
                    self.pending_sub();
                    self.process(id, record);
                }
                Err(_) => {
                    // Channel closed and drained
                    break;
                }
            }
        }

        self.worker_exited();

        tracing::debug!(pool = %self.name, worker = id, "worker stopped");
    }

    /// Transform one record and forward its outputs in order.
    ///
    /// A panic in the transformation or the sink is contained here so the
    /// worker keeps serving the queue.
    fn process(&self, worker: usize, record: R) {
        let started = Instant::now();
        self.observe(|m, pool| m.record_busy(pool, true));

        let mut emitted = 0usize;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            for output in (self.transform)(record) {
                self.sink.accept(output);
                emitted += 1;
            }
        }));

        self.observe(|m, pool| m.record_busy(pool, false));

        self.counters.processed.fetch_add(1, Ordering::Relaxed);
        self.counters
            .emitted
            .fetch_add(emitted as u64, Ordering::Relaxed);

        let panicked = match result {
            Ok(()) => false,
            Err(payload) => {
                self.counters.panicked.fetch_add(1, Ordering::Relaxed);
                let err = PoolError::from_panic(payload.as_ref());
                tracing::error!(
                    pool = %self.name,
                    worker = worker,
                    emitted = emitted,
                    kind = err.message(),
                    error = %err,
                    "record processing panicked"
                );
                true
            }
        };

        let elapsed = started.elapsed().as_secs_f64();
        self.observe(|m, pool| m.record_processed(pool, emitted, elapsed, panicked));
    }

    /// Run `update` against the attached metrics, if any.
    fn observe(&self, update: impl FnOnce(&Metrics, &str)) {
        if let Some(ref metrics) = self.metrics {
            update(metrics, &self.name);
        }
    }

    fn pending_add(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.observe(|m, pool| m.record_queue_change(pool, true));
    }

    fn pending_sub(&self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
        self.observe(|m, pool| m.record_queue_change(pool, false));
    }

    fn worker_started(&self) {
        self.running.fetch_add(1, Ordering::SeqCst);
        self.observe(|m, pool| m.record_worker_change(pool, true));
    }

    fn worker_exited(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
        self.observe(|m, pool| m.record_worker_change(pool, false));
    }
}

impl<R, F, S> Parallel for Unordered<R, F, S>
where
    R: Send + 'static,
    F: Fn(R) -> Vec<R> + Send + Sync + 'static,
    S: Sink<R> + 'static,
{
    type Record = R;

    fn enqueue(&self, record: R) {
        Unordered::enqueue(self, record)
    }

    fn submit(&self, record: R) -> PoolResult<()> {
        Unordered::submit(self, record)
    }

    fn stop(&self) {
        Unordered::stop(self)
    }

    fn worker_count(&self) -> usize {
        Unordered::worker_count(self)
    }

    fn queue_capacity(&self) -> usize {
        Unordered::queue_capacity(self)
    }

    fn pending_count(&self) -> usize {
        Unordered::pending_count(self)
    }
}

impl<R, F, S> Drop for Unordered<R, F, S>
where
    R: Send + 'static,
    F: Fn(R) -> Vec<R> + Send + Sync + 'static,
    S: Sink<R> + 'static,
{
    fn drop(&mut self) {
        if !self.is_stopped() {
            tracing::warn!(pool = %self.shared.name, "pool dropped without stop, draining");
            self.stop();
        }
    }
}
