//! Length-prefixed framing over the bit channel
//!
//! ```text
//! +----------------------+---------------------+
//! | length: u32 (LE, 4B) | payload: length B   |
//! +----------------------+---------------------+
//! ```
//!
//! A zero-length PDU carries no payload and ends the stream. The receiver has
//! no other way to learn the stream is over: if the terminator never arrives it
//! keeps decoding forever.

use crate::codec::BitChannel;
use crate::resolver::Resolver;
use crate::ChannelError;
use log::debug;
use std::io::{ErrorKind, Read, Write};

/// Largest payload a single PDU may carry, and the chunk size read from input
pub const MAX_PDU_SIZE: usize = 4096;

/// Size of the length prefix
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Totals for one direction of a stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Data PDUs, terminator excluded
    pub pdus: u64,
    pub bytes: u64,
}

/// Owned, bounded chunk buffer
fn chunk_buffer() -> Box<[u8]> {
    vec![0u8; MAX_PDU_SIZE].into_boxed_slice()
}

/// Encode one PDU
pub fn send_pdu<R: Resolver>(channel: &mut BitChannel<R>, payload: &[u8]) -> Result<(), ChannelError> {
    if payload.len() > MAX_PDU_SIZE {
        return Err(ChannelError::FrameTooLarge(payload.len() as u64));
    }
    let len = payload.len() as u32;
    debug!("sending chunk of length {}", len);
    channel.send_bytes(&len.to_le_bytes())?;
    channel.send_bytes(payload)
}

/// Encode the zero-length PDU that ends a stream
pub fn send_terminator<R: Resolver>(channel: &mut BitChannel<R>) -> Result<(), ChannelError> {
    send_pdu(channel, &[])
}

/// Decode one PDU into `buf`, returning its payload length
///
/// A return of zero is the terminator; no payload bits are read for it.
pub fn receive_pdu<R: Resolver>(channel: &mut BitChannel<R>, buf: &mut [u8]) -> Result<usize, ChannelError> {
    let mut prefix = [0u8; LENGTH_PREFIX_LEN];
    channel.receive_into(&mut prefix)?;
    let len = u32::from_le_bytes(prefix) as usize;
    debug!("receiving chunk of length {}", len);

    if len > MAX_PDU_SIZE.min(buf.len()) {
        return Err(ChannelError::FrameTooLarge(len as u64));
    }
    if len > 0 {
        channel.receive_into(&mut buf[..len])?;
    }
    Ok(len)
}

/// Send every chunk `source` yields, one PDU per read, until it reports end of
/// data. Does not send the terminator.
pub fn send_stream<R: Resolver, S: Read>(
    channel: &mut BitChannel<R>,
    source: &mut S,
) -> Result<StreamStats, ChannelError> {
    let mut buf = chunk_buffer();
    let mut stats = StreamStats::default();

    loop {
        let n = read_chunk(source, &mut buf)?;
        if n == 0 {
            return Ok(stats);
        }
        send_pdu(channel, &buf[..n])?;
        stats.pdus += 1;
        stats.bytes += n as u64;
    }
}

/// Receive PDUs and write their payloads to `sink` until the terminator
pub fn receive_stream<R: Resolver, W: Write>(
    channel: &mut BitChannel<R>,
    sink: &mut W,
) -> Result<StreamStats, ChannelError> {
    let mut buf = chunk_buffer();
    let mut stats = StreamStats::default();

    loop {
        let n = receive_pdu(channel, &mut buf)?;
        if n == 0 {
            return Ok(stats);
        }
        sink.write_all(&buf[..n])?;
        sink.flush()?;
        stats.pdus += 1;
        stats.bytes += n as u64;
    }
}

fn read_chunk<S: Read>(source: &mut S, buf: &mut [u8]) -> Result<usize, ChannelError> {
    loop {
        match source.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}
