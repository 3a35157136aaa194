//! Test helpers and utilities

use metric_pool::sink::{MemorySink, Sink};
use metric_pool::Unordered;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Run `inputs` through a fresh pool and return the sorted sink contents.
pub fn run_sorted<F>(workers: usize, inputs: &[u64], transform: F) -> Vec<u64>
where
    F: Fn(u64) -> Vec<u64> + Send + Sync + 'static,
{
    let sink = Arc::new(MemorySink::<u64>::new());
    let pool = Unordered::new(sink.clone(), transform, workers).expect("Failed to create pool");

    for &x in inputs {
        pool.enqueue(x);
    }
    pool.stop();

    let mut out = sink.take();
    out.sort_unstable();
    out
}

/// Sorted copy, for multiset comparison.
pub fn sorted(mut values: Vec<u64>) -> Vec<u64> {
    values.sort_unstable();
    values
}

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Sink that records which thread delivered each value.
#[derive(Default)]
pub struct ThreadTaggingSink {
    inner: MemorySink<(String, u64)>,
}

impl ThreadTaggingSink {
    pub fn records(&self) -> Vec<(String, u64)> {
        self.inner.records()
    }
}

impl Sink<u64> for ThreadTaggingSink {
    fn accept(&self, record: u64) {
        let name = std::thread::current()
            .name()
            .unwrap_or_default()
            .to_string();
        self.inner.accept((name, record));
    }
}
