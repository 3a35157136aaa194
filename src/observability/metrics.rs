//! Prometheus metrics for metric_pool.
//!
//! Tracks throughput (records in/out), failures (isolated panics),
//! transformation latency and queue saturation per pool.

use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::path::Path;

/// Prometheus metrics registry with all pool metrics.
///
/// Every metric carries a `pool` label so several pools can share one
/// registry.
pub struct Metrics {
    registry: Registry,

    /// Records accepted into a pool
    pub records_received_total: CounterVec,

    /// Records forwarded to the sink
    pub records_emitted_total: CounterVec,

    /// Transformations that panicked and were isolated
    pub transform_panics_total: CounterVec,

    /// Time spent in the transformation plus sink forwarding
    pub transform_duration_seconds: HistogramVec,

    /// Records waiting for a worker
    pub queue_depth: GaugeVec,

    /// Bounded queue capacity
    pub queue_capacity: GaugeVec,

    /// Workers currently processing a record
    pub workers_busy: GaugeVec,

    /// Workers still running
    pub workers_total: GaugeVec,
}

impl Metrics {
    /// Create a new metrics registry with all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Transformation buckets (in seconds)
        let transform_buckets = vec![
            0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
        ];

        let records_received_total = CounterVec::new(
            Opts::new(
                "metric_pool_records_received_total",
                "Total records accepted into the pool",
            ),
            &["pool"],
        )?;
        registry.register(Box::new(records_received_total.clone()))?;

        let records_emitted_total = CounterVec::new(
            Opts::new(
                "metric_pool_records_emitted_total",
                "Total records forwarded to the sink",
            ),
            &["pool"],
        )?;
        registry.register(Box::new(records_emitted_total.clone()))?;

        let transform_panics_total = CounterVec::new(
            Opts::new(
                "metric_pool_transform_panics_total",
                "Total transformations that panicked",
            ),
            &["pool"],
        )?;
        registry.register(Box::new(transform_panics_total.clone()))?;

        let transform_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "metric_pool_transform_duration_seconds",
                "Transformation and forwarding duration in seconds",
            )
            .buckets(transform_buckets),
            &["pool"],
        )?;
        registry.register(Box::new(transform_duration_seconds.clone()))?;

        let queue_depth = GaugeVec::new(
            Opts::new("metric_pool_queue_depth", "Records waiting for a worker"),
            &["pool"],
        )?;
        registry.register(Box::new(queue_depth.clone()))?;

        let queue_capacity = GaugeVec::new(
            Opts::new("metric_pool_queue_capacity", "Queue capacity"),
            &["pool"],
        )?;
        registry.register(Box::new(queue_capacity.clone()))?;

        let workers_busy = GaugeVec::new(
            Opts::new("metric_pool_workers_busy", "Number of busy workers"),
            &["pool"],
        )?;
        registry.register(Box::new(workers_busy.clone()))?;

        let workers_total = GaugeVec::new(
            Opts::new("metric_pool_workers_total", "Number of running workers"),
            &["pool"],
        )?;
        registry.register(Box::new(workers_total.clone()))?;

        Ok(Self {
            registry,
            records_received_total,
            records_emitted_total,
            transform_panics_total,
            transform_duration_seconds,
            queue_depth,
            queue_capacity,
            workers_busy,
            workers_total,
        })
    }

    /// Record pool sizing at construction. Worker gauges are maintained
    /// by the workers themselves.
    pub fn record_pool_started(&self, pool: &str, capacity: usize) {
        self.queue_capacity
            .with_label_values(&[pool])
            .set(capacity as f64);
    }

    /// Record one processed input record.
    pub fn record_processed(&self, pool: &str, emitted: usize, duration_secs: f64, panicked: bool) {
        self.records_emitted_total
            .with_label_values(&[pool])
            .inc_by(emitted as f64);
        self.transform_duration_seconds
            .with_label_values(&[pool])
            .observe(duration_secs);
        if panicked {
            self.transform_panics_total.with_label_values(&[pool]).inc();
        }
    }

    /// Record one record accepted by `submit`.
    pub fn record_received(&self, pool: &str) {
        self.records_received_total.with_label_values(&[pool]).inc();
    }

    /// Adjust the queue depth gauge by one record.
    pub fn record_queue_change(&self, pool: &str, added: bool) {
        let gauge = self.queue_depth.with_label_values(&[pool]);
        if added {
            gauge.inc();
        } else {
            gauge.dec();
        }
    }

    /// Adjust the running worker gauge.
    pub fn record_worker_change(&self, pool: &str, started: bool) {
        let gauge = self.workers_total.with_label_values(&[pool]);
        if started {
            gauge.inc();
        } else {
            gauge.dec();
        }
    }

    /// Mark a worker busy or idle.
    pub fn record_busy(&self, pool: &str, busy: bool) {
        let gauge = self.workers_busy.with_label_values(&[pool]);
        if busy {
            gauge.inc();
        } else {
            gauge.dec();
        }
    }

    /// Export metrics in Prometheus text format.
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Write the text export to a file, replacing its contents.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.export())
    }

    /// Get the Prometheus registry (for custom metrics).
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
