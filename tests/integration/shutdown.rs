//! Drain-and-stop lifecycle, misuse and failure isolation.

use crate::helpers::*;
use metric_pool::sink::MemorySink;
use metric_pool::{PoolError, Unordered};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Stop returns only after slow records are all processed
#[test]
fn test_stop_drains_queue() {
    let sink = Arc::new(MemorySink::<u64>::new());
    let pool = Unordered::new(
        sink.clone(),
        |x: u64| {
            thread::sleep(Duration::from_millis(10));
            vec![x]
        },
        4,
    )
    .unwrap();

    for x in 0..40 {
        pool.enqueue(x);
    }
    pool.stop();

    assert_eq!(sink.len(), 40);
    assert_eq!(pool.pending_count(), 0);
    assert_eq!(pool.running_workers(), 0);

    let stats = pool.stats();
    assert_eq!(stats.received, 40);
    assert_eq!(stats.processed, 40);
    assert_eq!(stats.emitted, 40);
}

/// Stop blocks while a transformation is still running
#[test]
fn test_stop_waits_for_in_flight_record() {
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let started_tx = Mutex::new(started_tx);
    let release_rx = Mutex::new(release_rx);

    let sink = Arc::new(MemorySink::<u64>::new());
    let pool = Arc::new(
        Unordered::new(
            sink.clone(),
            move |x: u64| {
                let _ = started_tx.lock().unwrap().send(());
                let _ = release_rx.lock().unwrap().recv();
                vec![x]
            },
            1,
        )
        .unwrap(),
    );

    pool.enqueue(7);
    started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    let stopped = Arc::new(AtomicBool::new(false));
    let stopper = {
        let pool = Arc::clone(&pool);
        let stopped = Arc::clone(&stopped);
        thread::spawn(move || {
            pool.stop();
            stopped.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(200));
    assert!(!stopped.load(Ordering::SeqCst), "stop returned early");
    assert!(sink.is_empty());

    release_tx.send(()).unwrap();
    stopper.join().unwrap();

    assert!(stopped.load(Ordering::SeqCst));
    assert_eq!(sink.records(), vec![7]);
}

/// Several producers share one pool
#[test]
fn test_concurrent_producers() {
    let sink = Arc::new(MemorySink::<u64>::new());
    let pool = Arc::new(Unordered::new(sink.clone(), |x: u64| vec![x], 4).unwrap());

    let producers: Vec<_> = (0..4u64)
        .map(|p| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for i in 0..250 {
                    pool.enqueue(p * 1000 + i);
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    pool.stop();

    let expected: Vec<u64> = (0..4u64)
        .flat_map(|p| (0..250).map(move |i| p * 1000 + i))
        .collect();
    assert_eq!(sorted(sink.take()), sorted(expected));
}

#[test]
fn test_zero_workers_rejected() {
    let result = Unordered::new(MemorySink::<u64>::new(), |x: u64| vec![x], 0);
    assert_eq!(result.err(), Some(PoolError::InvalidWorkerCount));
}

#[test]
fn test_submit_after_stop() {
    let pool = Unordered::new(MemorySink::<u64>::new(), |x: u64| vec![x], 2).unwrap();
    pool.stop();

    let err = pool.submit(1).unwrap_err();
    assert!(err.is_stopped());
    assert!(pool.is_stopped());
}

#[test]
#[should_panic(expected = "enqueue on pool")]
fn test_enqueue_after_stop_panics() {
    let pool = Unordered::new(MemorySink::<u64>::new(), |x: u64| vec![x], 2).unwrap();
    pool.stop();
    pool.enqueue(1);
}

/// A panicking transformation does not take its worker down
#[test]
fn test_panicking_records_are_isolated() {
    let sink = Arc::new(MemorySink::<u64>::new());
    let pool = Unordered::new(
        sink.clone(),
        |x: u64| {
            if x % 7 == 0 {
                panic!("record {} rejected", x);
            }
            vec![x]
        },
        2,
    )
    .unwrap();

    for x in 1..=70 {
        pool.enqueue(x);
    }
    pool.stop();

    let expected: Vec<u64> = (1..=70).filter(|x| x % 7 != 0).collect();
    assert_eq!(sorted(sink.take()), expected);

    let stats = pool.stats();
    assert_eq!(stats.processed, 70);
    assert_eq!(stats.panicked, 10);
    assert_eq!(pool.running_workers(), 0);
}
