use std::io::{self, BufRead, BufReader};
use std::sync::Arc;

use tracing::{error, info, warn};

use metric_pool::config::Config;
use metric_pool::ingest::{ingest, IngestStats};
use metric_pool::observability::Metrics;
use metric_pool::parallel::{PoolOptions, Unordered};
use metric_pool::processors::Registry;
use metric_pool::sink::JsonLinesSink;
use metric_pool::{logging, Parallel, VERSION};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), BoxError> {
    let config = Config::from_env()?;

    // Initialize logging
    logging::init(&config.logging)?;

    info!("Starting metric_pool {}", VERSION);
    config.log_summary();

    let registry = Registry::builtin();
    let processor = registry.build(&config.processor)?;

    let metrics = Arc::new(Metrics::new().map_err(|e| e.to_string())?);
    let sink = Arc::new(JsonLinesSink::new(io::stdout()));

    let options = PoolOptions::new(config.pool.worker_count())
        .with_name(config.pool.name.clone())
        .with_metrics(Arc::clone(&metrics));
    let pool = Arc::new(Unordered::with_options(
        Arc::clone(&sink),
        processor,
        options,
    )?);

    // Workers are OS threads; the runtime only waits on stdin and signals
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let input = BufReader::new(io::stdin());
    let result = runtime.block_on(run(Arc::clone(&pool), input));
    // Don't wait on a reader still blocked in stdin
    runtime.shutdown_background();

    let stats = pool.stats();
    if let Err(e) = sink.flush() {
        warn!(error = %e, "failed to flush output");
    }

    info!(
        received = stats.received,
        emitted = stats.emitted,
        panicked = stats.panicked,
        written = sink.written(),
        write_errors = sink.errors(),
        "done"
    );

    if let Some(ref path) = config.metrics_file {
        metrics.write_to(path)?;
        info!("Metrics written to {}", path.display());
    }

    // Reported after the pool's output and metrics are flushed
    result
}

async fn run<P, B>(pool: Arc<P>, input: B) -> Result<(), BoxError>
where
    P: Parallel<Record = metric_pool::Metric> + 'static,
    B: BufRead + Send + 'static,
{
    let producer = Arc::clone(&pool);
    let reader = tokio::task::spawn_blocking(move || ingest(input, producer.as_ref()));

    // Handle shutdown gracefully
    let outcome: Result<(), BoxError> = tokio::select! {
        result = reader => match result {
            Ok(Ok(stats)) => {
                log_ingest(&stats);
                Ok(())
            }
            Ok(Err(e)) => Err(e.into()),
            Err(e) => Err(e.into()),
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, draining pool...");
            Ok(())
        }
    };

    if let Err(ref e) = outcome {
        error!(error = %e, "input failed, draining pool");
    }

    // Stop even when the reader failed so accepted records still reach the
    // sink. A reader blocked on stdin exits once the pool refuses its next
    // record.
    let stopper = Arc::clone(&pool);
    tokio::task::spawn_blocking(move || stopper.stop()).await?;

    outcome
}

fn log_ingest(stats: &IngestStats) {
    info!(
        accepted = stats.accepted,
        malformed = stats.malformed,
        "input exhausted"
    );
}
