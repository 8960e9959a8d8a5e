//! Channel pacing
//!
//! Two blocking delays keep the channel from flooding the shared resolver: a
//! cycle delay after every bit period, and a block delay after every
//! `block_size`-th active (querying) cycle.

use std::thread;
use std::time::Duration;

/// Throttles channel cycles
#[derive(Debug, Clone)]
pub struct Pacer {
    cycle_delay: Duration,
    block_delay: Duration,
    block_size: u32,
    /// Active cycles since the last block pause
    active: u32,
    block_pauses: u64,
}

impl Pacer {
    /// `block_size` is clamped to at least one
    pub fn new(cycle_delay: Duration, block_delay: Duration, block_size: u32) -> Self {
        Self {
            cycle_delay,
            block_delay,
            block_size: block_size.max(1),
            active: 0,
            block_pauses: 0,
        }
    }

    /// A pacer that never sleeps and pauses every `block_size` active cycles
    pub fn unthrottled(block_size: u32) -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, block_size)
    }

    /// Record one active cycle. Sleeps the block delay and resets the counter
    /// when this cycle completes a block; returns whether it did.
    pub fn record_active(&mut self) -> bool {
        self.active += 1;
        if self.active < self.block_size {
            return false;
        }
        self.active = 0;
        self.block_pauses += 1;
        sleep(self.block_delay);
        true
    }

    /// Close a channel cycle
    pub fn end_cycle(&mut self) {
        sleep(self.cycle_delay);
    }

    /// Pause after calibration iteration `iteration` (1-based): the block delay
    /// on every `block_size`-th iteration, the cycle delay otherwise.
    /// Returns whether the block delay was used.
    pub fn end_calibration_step(&mut self, iteration: u64) -> bool {
        if iteration % u64::from(self.block_size) == 0 {
            self.block_pauses += 1;
            sleep(self.block_delay);
            true
        } else {
            sleep(self.cycle_delay);
            false
        }
    }

    /// Active cycles counted toward the next block pause
    pub fn active(&self) -> u32 {
        self.active
    }

    /// Block pauses taken so far
    pub fn block_pauses(&self) -> u64 {
        self.block_pauses
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }
}

fn sleep(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
