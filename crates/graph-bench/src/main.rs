//! GraphTool point-buffer benchmark.
//!
//! Renders a large random point cloud every frame while rewriting one batch
//! of the vertex buffer per frame, then prints the mean frame time (ms) and
//! the frame count on stdout.

mod bench;
mod config;
mod cursor;
mod points;
mod report;
mod target;

use anyhow::{Context, Result};
use graph_engine::logging::{init_logging, LoggingConfig};
use graph_engine::window::Runtime;

use crate::bench::Benchmark;
use crate::config::BenchConfig;
use crate::points::PointGenerator;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = BenchConfig::from_env().context("invalid configuration")?;
    log::info!(
        "{}x{}, {} points ({} bytes), batch {}, mutation {}, timing {:?}, vsync {}",
        config.width,
        config.height,
        config.point_count,
        config.buffer_bytes(),
        config.batch_size,
        if config.enable_batch_mutation { "on" } else { "off" },
        config.timed_section,
        config.vsync
    );
    if let Some(patches) = config.expected_patches() {
        log::info!("expecting {patches} patches, {} frames", u64::from(patches) + 1);
    }

    let bench: Benchmark = Benchmark::new(&config, PointGenerator::default());
    let bench = Runtime::run(config.runtime_config(), config.gpu_init(), bench)?;

    let report = bench.report();
    report.log_summary();
    report
        .write_to(&mut std::io::stdout().lock())
        .context("failed to write results")?;

    Ok(())
}
