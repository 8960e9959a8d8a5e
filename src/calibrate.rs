//! Empirical calibration of the hit/miss latency threshold
//!
//! Each iteration draws a fresh name and resolves it twice in a row. The first
//! lookup is a cold sample (expected cache miss), the second a warm sample
//! (expected cache hit). The two sample sets are reduced to mean and sample
//! standard deviation and turned into 3-sigma edges:
//!
//! ```text
//! edge_warm = mean_warm + ceil(3 * sd_warm)   upper bound of a hit
//! edge_cold = mean_cold - ceil(3 * sd_cold)   lower bound of a miss
//! ```
//!
//! `edge_warm` is the threshold the channel commits to. When
//! `edge_cold < edge_warm` the distributions overlap and the threshold is not
//! trustworthy. That is reported, never corrected.
//!
//! Samples are assumed independent across iterations, which holds only if the
//! resolver caches each distinct name separately.

use crate::pacer::Pacer;
use crate::prober::Prober;
use crate::resolver::Resolver;
use crate::sequencer::NameSequencer;
use crate::ChannelError;
use log::{debug, info};
use std::fmt;

/// Mean and sample standard deviation of a latency sample set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
}

impl SampleStats {
    /// Returns `None` for fewer than two samples
    pub fn from_samples(samples: &[u64]) -> Option<Self> {
        if samples.len() < 2 {
            return None;
        }
        let count = samples.len();
        let mean = samples.iter().map(|&s| s as f64).sum::<f64>() / count as f64;
        let sum_sq: f64 = samples
            .iter()
            .map(|&s| {
                let d = s as f64 - mean;
                d * d
            })
            .sum();
        let std_dev = (sum_sq / (count - 1) as f64).sqrt();

        Some(Self {
            count,
            mean,
            std_dev,
        })
    }

    /// Three standard deviations, rounded up to whole milliseconds
    fn three_sigma(&self) -> f64 {
        (3.0 * self.std_dev).ceil()
    }
}

/// Decision edges derived from calibration, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Slowest response still classified as a cache hit
    pub edge_warm: i64,
    /// Fastest response still classified as a cache miss
    pub edge_cold: i64,
}

impl Thresholds {
    /// Fractional edges truncate toward zero
    pub fn from_stats(warm: &SampleStats, cold: &SampleStats) -> Self {
        Self {
            edge_warm: (warm.mean + warm.three_sigma()) as i64,
            edge_cold: (cold.mean - cold.three_sigma()) as i64,
        }
    }

    pub fn from_samples(warm: &[u64], cold: &[u64]) -> Result<Self, ChannelError> {
        let warm = SampleStats::from_samples(warm).ok_or_else(too_few_samples)?;
        let cold = SampleStats::from_samples(cold).ok_or_else(too_few_samples)?;
        Ok(Self::from_stats(&warm, &cold))
    }

    /// The threshold the channel uses: `edge_warm`
    pub fn decision_threshold(&self) -> i64 {
        self.edge_warm
    }

    /// True when hit and miss latencies cannot be told apart reliably
    pub fn overlaps(&self) -> bool {
        self.edge_cold < self.edge_warm
    }
}

/// Printed form: `edge_warm edge_cold`
impl fmt::Display for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.edge_warm, self.edge_cold)
    }
}

fn too_few_samples() -> ChannelError {
    ChannelError::InvalidConfig("calibration needs at least 2 samples".to_string())
}

/// Result of a calibration run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub warm: SampleStats,
    pub cold: SampleStats,
    pub thresholds: Thresholds,
}

/// Collect `samples` cold/warm pairs and derive the thresholds
///
/// A resolver failure on any lookup aborts the whole calibration.
pub fn calibrate<R: Resolver>(
    sequencer: &mut NameSequencer,
    prober: &mut Prober<R>,
    pacer: &mut Pacer,
    samples: usize,
) -> Result<Calibration, ChannelError> {
    if samples < 2 {
        return Err(too_few_samples());
    }

    let mut cold = Vec::with_capacity(samples);
    let mut warm = Vec::with_capacity(samples);

    info!("Calibrating with {} sample pairs", samples);
    for iteration in 1..=samples as u64 {
        let name = sequencer.next_name();
        cold.push(prober.probe(&name)?.elapsed_ms);
        warm.push(prober.probe(&name)?.elapsed_ms);
        pacer.end_calibration_step(iteration);
    }

    let warm = SampleStats::from_samples(&warm).ok_or_else(too_few_samples)?;
    let cold = SampleStats::from_samples(&cold).ok_or_else(too_few_samples)?;
    let thresholds = Thresholds::from_stats(&warm, &cold);

    debug!(
        "warm: mean {:.3} sd {:.3}; cold: mean {:.3} sd {:.3}",
        warm.mean, warm.std_dev, cold.mean, cold.std_dev
    );

    Ok(Calibration {
        warm,
        cold,
        thresholds,
    })
}
