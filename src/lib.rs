//! DNS Cache Channel: a covert channel over a shared resolver cache
//!
//! Two hosts that share a caching DNS resolver can exchange data without ever
//! talking to each other. Both sides derive the same sequence of throwaway host
//! names from a shared seed. For each bit the transmitter either looks up the
//! next name (planting it in the resolver's cache) or leaves it alone; the
//! receiver then looks up the same name and reads the bit from how fast the
//! resolver answers.
//!
//! ## Features
//!
//! - **Calibration**: 3-sigma hit/miss latency edges from live samples
//! - **Lockstep name generation**: identical on both ends, one name per bit
//! - **Framing**: length-prefixed chunks with a zero-length terminator
//! - **Pacing**: per-bit and per-block delays to spare the resolver
//!
//! ## Quick Start
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use dns_cache_channel::{ChannelConfig, Mode, Session, SystemResolver};
//!
//! fn main() -> Result<(), dns_cache_channel::ChannelError> {
//!     let config = ChannelConfig {
//!         mode: Mode::Transmit,
//!         seed: Some(20_000),
//!         ..Default::default()
//!     };
//!     let session = Session::new(config, SystemResolver::new())?;
//!     session.run(&mut "hello".as_bytes(), &mut std::io::sink())?;
//!     Ok(())
//! }
//! ```
//!
//! ### As a Command-Line Tool
//!
//! ```bash
//! # Measure the resolver; prints "edge_warm edge_cold"
//! dnscc 20000
//!
//! # Receiver first, then transmitter, same seed and threshold
//! dnscc -r -e 8 20000 > out.bin
//! dnscc -s -e 8 20000 < in.bin
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   names   ┌──────────┐  lookups  ┌──────────────┐
//! │ Sequencer  │──────────▶│  Codec   │──────────▶│    Prober    │──▶ resolver
//! └────────────┘           └──────────┘           └──────────────┘
//!                               ▲  │ bits                 ▲
//!                         bytes │  ▼                      │
//!                          ┌──────────┐            ┌──────────────┐
//!                          │  Framer  │            │  Calibrator  │
//!                          └──────────┘            └──────────────┘
//! ```
//!
//! ## Caveats
//!
//! Nothing detects desynchronisation. If the two ends disagree on the seed or
//! on how many names have been drawn, the receiver decodes garbage without any
//! error. Payloads are neither encrypted nor authenticated.

pub mod calibrate;
pub mod codec;
pub mod config;
pub mod framer;
pub mod pacer;
pub mod prober;
pub mod resolver;
pub mod sequencer;
pub mod session;

// Re-export core types
pub use calibrate::{calibrate, Calibration, SampleStats, Thresholds};
pub use codec::BitChannel;
pub use config::{ChannelConfig, Mode};
pub use framer::{StreamStats, MAX_PDU_SIZE};
pub use pacer::Pacer;
pub use prober::{Probe, Prober};
pub use resolver::{Resolution, ResolveStatus, Resolver, SystemResolver};
pub use sequencer::{day_seed, NameSequencer};
pub use session::{RunReport, Session};

/// Channel error types
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The resolver failed for a reason other than "no such name"
    #[error("Resolver failure for {name}: {reason}")]
    Resolver { name: String, reason: String },

    /// A PDU length above the maximum chunk size
    #[error("PDU of {0} bytes exceeds the {max} byte limit", max = MAX_PDU_SIZE)]
    FrameTooLarge(u64),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ChannelError::FrameTooLarge(5000);
        assert_eq!(err.to_string(), "PDU of 5000 bytes exceeds the 4096 byte limit");

        let err = ChannelError::Resolver {
            name: "abc.def".into(),
            reason: "SERVFAIL".into(),
        };
        assert_eq!(err.to_string(), "Resolver failure for abc.def: SERVFAIL");
    }
}
