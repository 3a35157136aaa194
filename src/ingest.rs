//! Line-delimited JSON metric input.
//!
//! Each non-blank line is one JSON-encoded [`Metric`]. Malformed lines are
//! logged and skipped; they never stop the stream.

use std::io::BufRead;

use crate::parallel::Parallel;
use crate::types::Metric;

/// What happened to the lines of one input stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Metrics handed to the pool.
    pub accepted: u64,
    /// Lines that did not decode as a metric.
    pub malformed: u64,
    /// Metrics refused because the pool was already stopped.
    pub rejected: u64,
}

/// Feed every metric read from `reader` into `pool`.
///
/// Returns early, without error, once the pool refuses input. I/O errors
/// from the reader are returned as-is.
pub fn ingest<B, P>(mut reader: B, pool: &P) -> std::io::Result<IngestStats>
where
    B: BufRead,
    P: Parallel<Record = Metric> + ?Sized,
{
    let mut stats = IngestStats::default();
    let mut buf = Vec::new();
    let mut line = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line += 1;

        let trimmed = buf.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }

        // Bad UTF-8 surfaces here as a decode error, not an I/O error
        let metric: Metric = match serde_json::from_slice(trimmed) {
            Ok(metric) => metric,
            Err(e) => {
                stats.malformed += 1;
                tracing::warn!(line, error = %e, "skipping malformed metric");
                continue;
            }
        };

        if let Err(e) = pool.submit(metric) {
            stats.rejected += 1;
            tracing::warn!(
                line,
                kind = e.message(),
                error = %e,
                "pool refused input, stopping ingest"
            );
            break;
        }
        stats.accepted += 1;
    }

    tracing::debug!(
        accepted = stats.accepted,
        malformed = stats.malformed,
        rejected = stats.rejected,
        "ingest finished"
    );

    Ok(stats)
}
