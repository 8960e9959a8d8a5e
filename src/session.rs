//! Run orchestration
//!
//! A session performs exactly one mode from start to finish with one seed.

use crate::calibrate::{calibrate, Calibration};
use crate::codec::BitChannel;
use crate::config::{ChannelConfig, Mode};
use crate::framer::{receive_stream, send_stream, send_terminator, StreamStats};
use crate::pacer::Pacer;
use crate::prober::Prober;
use crate::resolver::Resolver;
use crate::sequencer::NameSequencer;
use crate::ChannelError;
use log::{info, warn};
use std::io::{Read, Write};

/// What a finished session did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunReport {
    Calibrated(Calibration),
    Transmitted(StreamStats),
    Received(StreamStats),
}

/// One run of the channel
pub struct Session<R> {
    config: ChannelConfig,
    seed: u32,
    resolver: R,
}

impl<R: Resolver> Session<R> {
    /// Validate `config` and fix the seed for the run
    pub fn new(config: ChannelConfig, resolver: R) -> Result<Self, ChannelError> {
        config.validate().map_err(ChannelError::InvalidConfig)?;
        let seed = config.effective_seed();
        Ok(Self {
            config,
            seed,
            resolver,
        })
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Run the configured mode to completion
    ///
    /// Transmit reads `input` to its end; receive writes payloads to `output`;
    /// calibrate writes one `edge_warm edge_cold` line to `output`.
    pub fn run<I: Read, O: Write>(self, input: &mut I, output: &mut O) -> Result<RunReport, ChannelError> {
        info!("Running {:?} with seed {}", self.config.mode, self.seed);

        let mut sequencer = NameSequencer::new(self.seed);
        let mut prober = Prober::new(self.resolver);
        let mut pacer = Pacer::new(
            self.config.cycle_delay,
            self.config.block_delay,
            self.config.block_size,
        );

        match self.config.mode {
            Mode::Calibrate => {
                let calibration = calibrate(&mut sequencer, &mut prober, &mut pacer, self.config.samples)?;
                let thresholds = calibration.thresholds;
                if thresholds.overlaps() {
                    warn!(
                        "Cold lower bound {} ms is below warm upper bound {} ms; \
                         hit and miss latencies overlap, calibration is unreliable",
                        thresholds.edge_cold, thresholds.edge_warm
                    );
                }
                writeln!(output, "{}", thresholds)?;
                output.flush()?;
                Ok(RunReport::Calibrated(calibration))
            }
            Mode::Transmit => {
                let mut channel = BitChannel::new(sequencer, prober, pacer, self.config.threshold_ms);
                let stats = send_stream(&mut channel, input)?;
                send_terminator(&mut channel)?;
                info!("Sent {} bytes in {} chunks", stats.bytes, stats.pdus);
                Ok(RunReport::Transmitted(stats))
            }
            Mode::Receive => {
                let mut channel = BitChannel::new(sequencer, prober, pacer, self.config.threshold_ms);
                let stats = receive_stream(&mut channel, output)?;
                info!("Received {} bytes in {} chunks", stats.bytes, stats.pdus);
                Ok(RunReport::Received(stats))
            }
        }
    }
}
