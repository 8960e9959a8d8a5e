//! Channel configuration

use crate::sequencer::day_seed;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default latency threshold separating hits from misses (ms)
pub const DEFAULT_THRESHOLD_MS: i64 = 10;

/// Default number of active cycles between block pauses
pub const DEFAULT_BLOCK_SIZE: u32 = 8;

/// Default number of cold/warm sample pairs collected by calibration
pub const DEFAULT_SAMPLES: usize = 50;

/// Main channel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// What this run does
    pub mode: Mode,

    /// Shared generator seed. `None` derives it from the current UTC day.
    pub seed: Option<u32>,

    /// Responses at or under this latency (ms) decode as `1`
    pub threshold_ms: i64,

    /// Active cycles between block pauses
    pub block_size: u32,

    /// Pause after every channel cycle
    #[serde(with = "humantime_serde")]
    pub cycle_delay: Duration,

    /// Pause after every `block_size` active cycles
    #[serde(with = "humantime_serde")]
    pub block_delay: Duration,

    /// Cold/warm sample pairs to collect in calibration mode
    pub samples: usize,

    /// Log every probe and PDU boundary
    pub verbose: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Calibrate,
            seed: None,
            threshold_ms: DEFAULT_THRESHOLD_MS,
            block_size: DEFAULT_BLOCK_SIZE,
            cycle_delay: Duration::ZERO,
            block_delay: Duration::ZERO,
            samples: DEFAULT_SAMPLES,
            verbose: false,
        }
    }
}

/// Operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Measure hit/miss latencies and print the decision edges
    #[default]
    Calibrate,
    /// Read bytes and send them through the channel
    Transmit,
    /// Decode bytes from the channel and write them out
    Receive,
}

impl ChannelConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.threshold_ms < 1 {
            return Err("Threshold must be at least 1 ms".to_string());
        }

        if self.block_size < 1 {
            return Err("Block size must be at least 1".to_string());
        }

        // Sample standard deviation divides by n - 1
        if self.mode == Mode::Calibrate && self.samples < 2 {
            return Err("Calibration needs at least 2 samples".to_string());
        }

        Ok(())
    }

    /// The configured seed, or today's day number
    pub fn effective_seed(&self) -> u32 {
        self.seed.unwrap_or_else(day_seed)
    }
}
