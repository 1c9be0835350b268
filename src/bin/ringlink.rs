//! Demo runner: the pipeline over a synthetic sensor.
//!
//! Runs the producer/consumer pair for a number of batches and prints
//! every displayed observation through tracing.

use clap::Parser;
use ringlink::sensor::SyntheticSensor;
use ringlink::sink::MemorySink;
use ringlink::{PipelineConfig, Result};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ringlink", about = "Run the authenticated sensor pipeline")]
struct Args {
    /// Number of batches to display before shutting down.
    #[arg(long, default_value_t = 5)]
    batches: usize,

    /// Base integer value of the synthetic sensor.
    #[arg(long, default_value_t = 21)]
    base: i32,

    /// Calibration offset applied to each sample's integer part.
    #[arg(long, default_value_t = 0)]
    calibration: i32,

    /// Delay between samples, in milliseconds.
    #[arg(long, default_value_t = 20)]
    sample_period_ms: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = PipelineConfig {
        sample_period: Duration::from_millis(args.sample_period_ms),
        settle_delay: Duration::from_millis(200),
        calibration: args.calibration,
        ..PipelineConfig::default()
    };
    let batch_size = config.batch_size;
    let wanted = args.batches * batch_size;

    let sink = MemorySink::new();
    let handle = ringlink::spawn(config, SyntheticSensor::new(args.base), sink.clone())?;
    tracing::info!(batches = args.batches, "pipeline running");

    let deadline = Instant::now() + Duration::from_secs(60);
    while sink.len() < wanted && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }

    handle.shutdown_and_join()?;

    for observation in sink.snapshot().iter().take(wanted) {
        tracing::info!("{observation}");
    }
    tracing::info!(displayed = sink.len().min(wanted), "pipeline stopped");
    Ok(())
}
