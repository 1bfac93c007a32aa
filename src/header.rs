// Copyright (c) 2020 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::QoS;

/// Control packet type, tagged with the fixed 4-bit codes from the fixed
/// header's high nibble.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PacketType {
    /// Request to connect to broker.
    Connect = 1,

    /// Broker reply to connect request.
    ConnectAck = 2,

    /// Publish message.
    Publish = 3,

    /// Publish acknowledgement (QoS 1).
    PublishAck = 4,

    /// Publish received (QoS 2, part 1).
    PublishReceived = 5,

    /// Publish release (QoS 2, part 2).
    PublishRelease = 6,

    /// Publish complete (QoS 2, part 3).
    PublishComplete = 7,

    /// Client subscribe request.
    Subscribe = 8,

    /// Subscribe acknowledgement.
    SubscribeAck = 9,

    /// Unsubscribe request.
    Unsubscribe = 10,

    /// Unsubscribe acknowledgement.
    UnsubscribeAck = 11,

    /// Client ping request.
    PingRequest = 12,

    /// Server ping response.
    PingResponse = 13,

    /// Client is disconnecting.
    Disconnect = 14,
}

impl PacketType {
    /// Recover a packet type from the fixed header's high nibble.
    ///
    /// Returns `None` for the reserved codes 0 and 15; the stream decoder
    /// surfaces these packets with `PacketType` absent rather than failing,
    /// since framing does not require interpreting the type.
    #[must_use]
    pub const fn from_type_bits(type_bits: u8) -> Option<Self> {
        match type_bits {
            1 => Some(Self::Connect),
            2 => Some(Self::ConnectAck),
            3 => Some(Self::Publish),
            4 => Some(Self::PublishAck),
            5 => Some(Self::PublishReceived),
            6 => Some(Self::PublishRelease),
            7 => Some(Self::PublishComplete),
            8 => Some(Self::Subscribe),
            9 => Some(Self::SubscribeAck),
            10 => Some(Self::Unsubscribe),
            11 => Some(Self::UnsubscribeAck),
            12 => Some(Self::PingRequest),
            13 => Some(Self::PingResponse),
            14 => Some(Self::Disconnect),
            _ => None,
        }
    }
}

/// Low nibble of the fixed header byte that is fixed by the spec regardless
/// of packet contents (PUBLISH is the only variable case; see
/// [`publish_flags`]).
const RESERVED_FLAGS: u8 = 0b0000_0010;

/// Build the low nibble for PUBREL, SUBSCRIBE and UNSUBSCRIBE.
#[must_use]
pub const fn reserved_flags() -> u8 {
    RESERVED_FLAGS
}

/// Build the PUBLISH fixed-header low nibble: `(DUP << 3) | (QoS << 1) | RETAIN`.
#[must_use]
pub const fn publish_flags(dup: bool, qos: QoS, retain: bool) -> u8 {
    let dup_bit = if dup { 0b0000_1000 } else { 0 };
    let qos_bits = match qos {
        QoS::AtMostOnce => 0b0000_0000,
        QoS::AtLeastOnce => 0b0000_0010,
        QoS::ExactOnce => 0b0000_0100,
    };
    let retain_bit = if retain { 0b0000_0001 } else { 0 };
    dup_bit | qos_bits | retain_bit
}

/// Compose the single fixed-header type/flags byte.
#[must_use]
pub const fn fixed_header_byte(packet_type: PacketType, flags: u8) -> u8 {
    ((packet_type as u8) << 4) | (flags & 0x0F)
}
