//! Every enqueued record is processed exactly once, whatever the worker count.

use crate::helpers::*;

/// Two workers duplicating {1,2,3} yield {1,1,2,2,3,3}
#[test]
fn test_duplicate_example() {
    let out = run_sorted(2, &[1, 2, 3], |x| vec![x, x]);
    assert_eq!(out, vec![1, 1, 2, 2, 3, 3]);
}

/// The sink multiset is the union of all transformation outputs
#[test]
fn test_union_of_outputs() {
    let inputs: Vec<u64> = (0..500).collect();
    // Record n produces n % 4 outputs: n*10, n*10+1, ...
    let transform = |n: u64| (0..n % 4).map(|i| n * 10 + i).collect::<Vec<_>>();

    let expected = sorted(inputs.iter().flat_map(|&n| transform(n)).collect());
    let out = run_sorted(8, &inputs, transform);

    assert_eq!(out, expected);
}

/// Worker counts 1, 4 and 64 agree on the output multiset
#[test]
fn test_no_loss_across_worker_counts() {
    let inputs: Vec<u64> = (0..1000).collect();
    let transform = |x: u64| vec![x * 3, x * 3 + 1];

    let one = run_sorted(1, &inputs, transform);
    let four = run_sorted(4, &inputs, transform);
    let many = run_sorted(64, &inputs, transform);

    assert_eq!(one.len(), 2000);
    assert_eq!(one, four);
    assert_eq!(one, many);
}

/// Transformations returning nothing leave the sink empty
#[test]
fn test_empty_outputs() {
    let out = run_sorted(4, &[1, 2, 3, 4], |_| Vec::new());
    assert!(out.is_empty());
}

/// Stop right after construction with no input
#[test]
fn test_no_input() {
    let out = run_sorted(3, &[], |x| vec![x]);
    assert!(out.is_empty());
}
