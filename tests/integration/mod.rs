//! Integration tests for metric_pool
//!
//! These tests drive the public pool API from the outside: records go in
//! through `enqueue`, results are observed on a sink after `stop`.
//!
//! Run with: cargo test --test integration

mod helpers;

mod backpressure;
mod completeness;
mod ordering;
mod shutdown;
