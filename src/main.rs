//! dnscc - covert channel over a shared DNS resolver cache
//!
//! Without `-s` or `-r` the tool calibrates: it prints the upper latency bound
//! of a cached response and the lower bound of an uncached one (3-sigma).
//! If the second value is below the first, the two latency distributions
//! overlap and the channel will not decode reliably; try another seed.

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use dns_cache_channel::{ChannelConfig, Mode, RunReport, Session, SystemResolver};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "dnscc")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Covert data channel over a shared DNS resolver cache", long_about = None)]
struct Cli {
    /// Shared seed for name generation (default: days since the Unix epoch)
    seed: Option<u32>,

    /// Run in transmitter mode: send stdin through the channel
    #[arg(short = 's', long = "send", conflicts_with = "receive")]
    send: bool,

    /// Run in receiver mode: write decoded data to stdout
    #[arg(short = 'r', long)]
    receive: bool,

    /// Latency threshold (ms); slower responses decode as uncached
    #[arg(short = 'e', long = "edge", value_name = "MS", value_parser = clap::value_parser!(i64).range(1..))]
    edge: Option<i64>,

    /// Active requests per block
    #[arg(short = 'b', long = "block-size", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    block_size: Option<u32>,

    /// Pause after each request (ms)
    #[arg(short = 't', long = "cycle-delay", value_name = "MS")]
    cycle_delay: Option<u64>,

    /// Pause after each block of requests (ms)
    #[arg(short = 'T', long = "block-delay", value_name = "MS")]
    block_delay: Option<u64>,

    /// Cold/warm sample pairs to collect when calibrating (2 * N lookups)
    #[arg(short = 'n', long = "samples", value_name = "N", value_parser = clap::value_parser!(u64).range(2..))]
    samples: Option<u64>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging (every lookup and chunk)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Layer command-line values over `base`
    fn apply(&self, mut base: ChannelConfig) -> ChannelConfig {
        if self.send {
            base.mode = Mode::Transmit;
        } else if self.receive {
            base.mode = Mode::Receive;
        }
        if self.seed.is_some() {
            base.seed = self.seed;
        }
        if let Some(edge) = self.edge {
            base.threshold_ms = edge;
        }
        if let Some(block_size) = self.block_size {
            base.block_size = block_size;
        }
        if let Some(ms) = self.cycle_delay {
            base.cycle_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.block_delay {
            base.block_delay = Duration::from_millis(ms);
        }
        if let Some(samples) = self.samples {
            base.samples = samples as usize;
        }
        base.verbose |= self.verbose;
        base
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => ChannelConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ChannelConfig::default(),
    };
    let config = cli.apply(base);

    // Initialize logger
    if config.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    debug!("Configuration: {:?}", config);

    let session = Session::new(config, SystemResolver::new())?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let report = session.run(&mut stdin.lock(), &mut stdout.lock())?;

    match report {
        RunReport::Calibrated(calibration) => {
            debug!(
                "Warm mean {:.2} ms, cold mean {:.2} ms over {} pairs",
                calibration.warm.mean, calibration.cold.mean, calibration.warm.count
            );
        }
        RunReport::Transmitted(stats) | RunReport::Received(stats) => {
            info!("Done: {} bytes", stats.bytes);
        }
    }

    Ok(())
}
