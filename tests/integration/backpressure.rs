//! A full queue blocks the producer until a worker dequeues.

use crate::helpers::*;
use metric_pool::sink::MemorySink;
use metric_pool::Unordered;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Transformation that reports each record and then waits for a release token.
fn gated() -> (
    impl Fn(u64) -> Vec<u64> + Send + Sync + 'static,
    mpsc::Receiver<u64>,
    mpsc::Sender<()>,
) {
    let (started_tx, started_rx) = mpsc::channel::<u64>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let started_tx = Mutex::new(started_tx);
    let release_rx = Mutex::new(release_rx);

    let transform = move |x: u64| {
        let _ = started_tx.lock().unwrap().send(x);
        let _ = release_rx.lock().unwrap().recv();
        vec![x]
    };

    (transform, started_rx, release_tx)
}

/// With capacity C = 1, the (C+1)-th outstanding enqueue blocks
#[test]
fn test_full_queue_blocks_producer() {
    let (transform, started, release) = gated();
    let sink = Arc::new(MemorySink::<u64>::new());
    let pool = Arc::new(Unordered::new(sink.clone(), transform, 1).unwrap());
    assert_eq!(pool.queue_capacity(), 1);

    // Worker picks up record 1 and holds it
    pool.enqueue(1);
    assert_eq!(started.recv_timeout(Duration::from_secs(5)).unwrap(), 1);

    // Record 2 fills the only queue slot
    pool.enqueue(2);

    let done = Arc::new(AtomicBool::new(false));
    let producer = {
        let pool = Arc::clone(&pool);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            pool.enqueue(3);
            done.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(200));
    assert!(
        !done.load(Ordering::SeqCst),
        "enqueue beyond capacity should block"
    );
    assert_eq!(pool.pending_count(), 2);

    // Finishing record 1 lets the worker dequeue 2, which frees the slot for 3
    release.send(()).unwrap();
    assert!(wait_until(Duration::from_secs(5), || done.load(Ordering::SeqCst)));
    producer.join().unwrap();

    release.send(()).unwrap();
    release.send(()).unwrap();
    pool.stop();

    assert_eq!(sorted(sink.take()), vec![1, 2, 3]);
}

/// Capacity plus busy workers can be absorbed without blocking
#[test]
fn test_capacity_absorbs_without_blocking() {
    let (transform, started, release) = gated();
    let sink = Arc::new(MemorySink::<u64>::new());
    let pool = Arc::new(Unordered::new(sink.clone(), transform, 2).unwrap());

    pool.enqueue(1);
    pool.enqueue(2);
    // Both workers busy
    let mut busy = vec![
        started.recv_timeout(Duration::from_secs(5)).unwrap(),
        started.recv_timeout(Duration::from_secs(5)).unwrap(),
    ];
    busy.sort_unstable();
    assert_eq!(busy, vec![1, 2]);

    // Two more fit in the queue; these calls return immediately
    pool.enqueue(3);
    pool.enqueue(4);
    assert_eq!(pool.pending_count(), 2);

    for _ in 0..4 {
        release.send(()).unwrap();
    }
    pool.stop();

    assert_eq!(sorted(sink.take()), vec![1, 2, 3, 4]);
}
