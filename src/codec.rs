//! Bit and byte codec over the resolver cache
//!
//! One bit per channel cycle. Both roles draw the next shared name every cycle.
//!
//! - Transmit `1`: resolve the name, planting it in the shared cache.
//! - Transmit `0`: do not resolve it; the name stays uncached.
//! - Receive: resolve the same name; a fast answer (at or under the threshold)
//!   means the transmitter planted it, so the bit is `1`.
//!
//! Bytes go least-significant bit first.

use crate::pacer::Pacer;
use crate::prober::Prober;
use crate::resolver::Resolver;
use crate::sequencer::NameSequencer;
use crate::ChannelError;

/// One end of the timing channel
pub struct BitChannel<R> {
    sequencer: NameSequencer,
    prober: Prober<R>,
    pacer: Pacer,
    threshold_ms: i64,
}

impl<R: Resolver> BitChannel<R> {
    pub fn new(sequencer: NameSequencer, prober: Prober<R>, pacer: Pacer, threshold_ms: i64) -> Self {
        Self {
            sequencer,
            prober,
            pacer,
            threshold_ms,
        }
    }

    /// Transmit one bit
    pub fn send_bit(&mut self, bit: bool) -> Result<(), ChannelError> {
        // Drawn on every cycle, idle ones included
        let name = self.sequencer.next_name();
        if bit {
            self.prober.probe(&name)?;
            self.pacer.record_active();
        }
        self.pacer.end_cycle();
        Ok(())
    }

    /// Receive one bit
    pub fn receive_bit(&mut self) -> Result<bool, ChannelError> {
        let name = self.sequencer.next_name();
        let bit = self.prober.probe(&name)?.is_fast(self.threshold_ms);
        if bit {
            self.pacer.record_active();
        }
        self.pacer.end_cycle();
        Ok(bit)
    }

    pub fn send_byte(&mut self, byte: u8) -> Result<(), ChannelError> {
        for i in 0..8 {
            self.send_bit((byte >> i) & 1 == 1)?;
        }
        Ok(())
    }

    pub fn receive_byte(&mut self) -> Result<u8, ChannelError> {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.receive_bit()? {
                byte |= 1 << i;
            }
        }
        Ok(byte)
    }

    pub fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        bytes.iter().try_for_each(|&b| self.send_byte(b))
    }

    /// Fill `buf` with received bytes, in order
    pub fn receive_into(&mut self, buf: &mut [u8]) -> Result<(), ChannelError> {
        for slot in buf.iter_mut() {
            *slot = self.receive_byte()?;
        }
        Ok(())
    }

    pub fn threshold_ms(&self) -> i64 {
        self.threshold_ms
    }

    pub fn sequencer(&self) -> &NameSequencer {
        &self.sequencer
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    pub fn prober(&self) -> &Prober<R> {
        &self.prober
    }

    pub fn into_resolver(self) -> R {
        self.prober.into_resolver()
    }
}
