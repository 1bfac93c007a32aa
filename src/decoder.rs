// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Lesser General Public License that can be found
// in the LICENSE file.

use crate::header::PacketType;
use crate::var_int::{VarIntAccumulator, VarIntStep, MAX_REMAINING_LENGTH};
use crate::DecodeError;

/// Caps the Remaining Length a [`StreamDecoder`] will accept before
/// allocating a body buffer, so an embedder can clamp memory growth to its
/// own transport's realistic frame size instead of trusting the protocol's
/// full 256MB ceiling.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecoderLimits {
    pub max_remaining_length: usize,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            max_remaining_length: MAX_REMAINING_LENGTH,
        }
    }
}

/// Receives each control packet as the stream decoder finishes reassembling
/// it. `packet_type` is `None` for the two reserved type codes (0 and 15);
/// the decoder frames every inbound shape without validating that its type
/// nibble is one of the fourteen the protocol defines.
pub trait PacketObserver {
    fn on_packet(&mut self, packet_type: Option<PacketType>, flags: u8, body: &[u8]);
}

impl<F> PacketObserver for F
where
    F: FnMut(Option<PacketType>, u8, &[u8]),
{
    fn on_packet(&mut self, packet_type: Option<PacketType>, flags: u8, body: &[u8]) {
        self(packet_type, flags, body);
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    ExpectingFixedHeader,
    ReadingRemainingLength,
    ReadingBody,
}

/// Incremental reassembler for an inbound MQTT byte stream.
///
/// Feed it arbitrarily fragmented chunks via [`StreamDecoder::feed`]; it
/// surfaces each complete packet to its [`PacketObserver`] exactly once,
/// fully reassembled, in the order the packets' final bytes arrived. It does
/// not interpret packet bodies — `(packet_type, flags, body)` framing is all
/// a stream decoder promises; typed field decoding is the observer's job.
#[derive(Debug)]
pub struct StreamDecoder<O> {
    observer: O,
    limits: DecoderLimits,
    phase: Phase,
    header_byte: u8,
    var_int: VarIntAccumulator,
    remaining_length: usize,
    body: Vec<u8>,
    body_filled: usize,
}

impl<O: PacketObserver> StreamDecoder<O> {
    #[must_use]
    pub fn new(observer: O) -> Self {
        Self::with_limits(observer, DecoderLimits::default())
    }

    #[must_use]
    pub fn with_limits(observer: O, limits: DecoderLimits) -> Self {
        Self {
            observer,
            limits,
            phase: Phase::ExpectingFixedHeader,
            header_byte: 0,
            var_int: VarIntAccumulator::new(),
            remaining_length: 0,
            body: Vec::new(),
            body_filled: 0,
        }
    }

    /// Borrow the observer, e.g. to inspect accumulated state after feeding.
    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Borrow the observer mutably.
    #[must_use]
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Consume the decoder, returning its observer.
    #[must_use]
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Append `bytes` to the stream, firing the observer once per packet
    /// that becomes complete. Tolerates any fragmentation, including
    /// single-byte and zero-length calls, and surfaces multiple packets in
    /// one call if enough bytes are present.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidVarInt`] if a Remaining Length varint
    /// uses a fifth continuation byte, or
    /// [`DecodeError::RemainingLengthTooLarge`] if a (validly encoded)
    /// Remaining Length exceeds the configured [`DecoderLimits`]. In both
    /// cases the decoder is reset to `ExpectingFixedHeader` before
    /// returning, so the stream is recoverable: the next `feed` call starts
    /// a fresh packet rather than treating the connection as poisoned.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        let mut offset = 0;
        while offset < bytes.len() {
            match self.phase {
                Phase::ExpectingFixedHeader => {
                    self.header_byte = bytes[offset];
                    offset += 1;
                    self.var_int = VarIntAccumulator::new();
                    self.phase = Phase::ReadingRemainingLength;
                }
                Phase::ReadingRemainingLength => {
                    let byte = bytes[offset];
                    offset += 1;
                    match self.var_int.push(byte) {
                        Err(e) => {
                            log::error!("decoder: malformed remaining length varint: {e}");
                            self.reset();
                            return Err(e);
                        }
                        Ok(VarIntStep::Pending) => {}
                        Ok(VarIntStep::Done(len)) => {
                            if len > self.limits.max_remaining_length {
                                log::error!(
                                    "decoder: remaining length {len} exceeds limit {}",
                                    self.limits.max_remaining_length
                                );
                                self.reset();
                                return Err(DecodeError::RemainingLengthTooLarge);
                            }
                            self.remaining_length = len;
                            if len == 0 {
                                self.dispatch_and_reset();
                            } else {
                                self.body = Vec::with_capacity(len);
                                self.body_filled = 0;
                                self.phase = Phase::ReadingBody;
                            }
                        }
                    }
                }
                Phase::ReadingBody => {
                    let needed = self.remaining_length - self.body_filled;
                    let available = bytes.len() - offset;
                    let take = needed.min(available);
                    self.body.extend_from_slice(&bytes[offset..offset + take]);
                    self.body_filled += take;
                    offset += take;
                    if self.body_filled == self.remaining_length {
                        self.dispatch_and_reset();
                    }
                }
            }
        }
        Ok(())
    }

    fn dispatch_and_reset(&mut self) {
        let type_bits = (self.header_byte & 0b1111_0000) >> 4;
        let flags = self.header_byte & 0b0000_1111;
        let packet_type = PacketType::from_type_bits(type_bits);
        let body = std::mem::take(&mut self.body);
        self.observer.on_packet(packet_type, flags, &body);
        self.reset();
    }

    fn reset(&mut self) {
        self.phase = Phase::ExpectingFixedHeader;
        self.header_byte = 0;
        self.var_int = VarIntAccumulator::new();
        self.remaining_length = 0;
        self.body = Vec::new();
        self.body_filled = 0;
    }
}
