//! Outputs of a single record keep their relative order.

use crate::helpers::*;
use metric_pool::sink::MemorySink;
use metric_pool::Unordered;
use std::collections::HashMap;
use std::sync::Arc;

/// Record x emits x*10, x*10+1, x*10+2 in that order
fn triple(x: u64) -> Vec<u64> {
    vec![x * 10, x * 10 + 1, x * 10 + 2]
}

#[test]
fn test_per_record_order_preserved() {
    let sink = Arc::new(MemorySink::<u64>::new());
    let pool = Unordered::new(sink.clone(), triple, 8).unwrap();

    for x in 0..500 {
        pool.enqueue(x);
    }
    pool.stop();

    let records = sink.take();
    assert_eq!(records.len(), 1500);

    // Position of each output in the sink's arrival order
    let position: HashMap<u64, usize> = records
        .iter()
        .enumerate()
        .map(|(i, &value)| (value, i))
        .collect();

    for x in 0..500u64 {
        let first = position[&(x * 10)];
        let second = position[&(x * 10 + 1)];
        let third = position[&(x * 10 + 2)];
        assert!(
            first < second && second < third,
            "outputs of record {} out of order",
            x
        );
    }
}

/// All outputs of one record are delivered by the worker that processed it
#[test]
fn test_outputs_delivered_by_worker_threads() {
    let sink = Arc::new(ThreadTaggingSink::default());
    let pool = Unordered::new(sink.clone(), triple, 4).unwrap();

    for x in 0..200 {
        pool.enqueue(x);
    }
    pool.stop();

    let records = sink.records();
    assert_eq!(records.len(), 600);

    let mut owner: HashMap<u64, &str> = HashMap::new();
    for (thread, value) in &records {
        assert!(
            thread.starts_with("parallel-"),
            "unexpected delivering thread {:?}",
            thread
        );
        let record = value / 10;
        let previous = owner.entry(record).or_insert(thread.as_str());
        assert_eq!(*previous, thread.as_str());
    }
    assert_eq!(owner.len(), 200);
}
