// Copyright (c) 2020 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::header::{fixed_header_byte, publish_flags, PacketType};
use crate::string_data::write_string;
use crate::var_int::encode_remaining_length;
use crate::{EncodeError, PacketId, QoS};

/// Input to [`encode_publish`].
#[derive(Clone, Debug)]
pub struct PublishOptions<'a> {
    pub qos: QoS,
    pub retain: bool,

    /// MUST be false when `qos == QoS::AtMostOnce` ([MQTT-3.3.1-2]).
    pub dup: bool,

    /// Ignored when `qos == QoS::AtMostOnce`; the variable header then
    /// carries no packet identifier at all.
    pub packet_id: PacketId,

    pub topic: &'a str,
    pub payload: &'a [u8],
}

/// Encode a PUBLISH packet.
///
/// The packet identifier is only written into the variable header when
/// `qos` is greater than `AtMostOnce`, matching [MQTT-2.3.1-1] / [MQTT-3.3.2-1].
///
/// # Errors
///
/// Returns [`EncodeError::EmptyTopic`] if `topic` is empty,
/// [`EncodeError::InvalidDupForQos0`] if `dup` is set on a QoS 0 publish, or
/// [`EncodeError::PacketTooLarge`] if the assembled body would exceed the
/// Remaining Length ceiling.
pub fn encode_publish(opts: &PublishOptions<'_>) -> Result<Vec<u8>, EncodeError> {
    if opts.topic.is_empty() {
        return Err(EncodeError::EmptyTopic);
    }
    // The DUP flag MUST be set to 0 for all QoS 0 messages [MQTT-3.3.1-2].
    if opts.dup && opts.qos == QoS::AtMostOnce {
        return Err(EncodeError::InvalidDupForQos0);
    }

    let mut body = Vec::new();
    write_string(opts.topic, &mut body)?;
    if opts.qos != QoS::AtMostOnce {
        body.extend_from_slice(&opts.packet_id.to_be_bytes());
    }
    body.extend_from_slice(opts.payload);

    let mut packet = Vec::with_capacity(body.len() + 5);
    let flags = publish_flags(opts.dup, opts.qos, opts.retain);
    packet.push(fixed_header_byte(PacketType::Publish, flags));
    encode_remaining_length(body.len(), &mut packet)?;
    packet.extend_from_slice(&body);
    Ok(packet)
}
