// Copyright (c) 2020 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use mqtt_codec::{
    encode_connect, encode_disconnect, encode_ping, encode_publish, encode_publish_ack,
    encode_subscribe, encode_unsubscribe, ConnectOptions, DecodeError, PacketObserver,
    PacketType, PublishOptions, QoS, StreamDecoder, SubscribeTopic, UnsubscribeTopic,
};

#[derive(Default)]
struct Recorder {
    seen: Vec<(Option<PacketType>, u8, Vec<u8>)>,
}

impl PacketObserver for Recorder {
    fn on_packet(&mut self, packet_type: Option<PacketType>, flags: u8, body: &[u8]) {
        self.seen.push((packet_type, flags, body.to_vec()));
    }
}

/// Every encoder's output, fed through the decoder at every possible split
/// point, must reassemble into exactly one packet whose framing matches the
/// fixed header that was encoded.
fn assert_round_trips_at_every_split(packet: &[u8], expected_type: PacketType) {
    for split in 0..=packet.len() {
        let mut decoder = StreamDecoder::new(Recorder::default());
        decoder.feed(&packet[..split]).unwrap();
        decoder.feed(&packet[split..]).unwrap();
        assert_eq!(decoder.observer().seen.len(), 1, "split at {split}");
        let (packet_type, _flags, body) = &decoder.observer().seen[0];
        assert_eq!(*packet_type, Some(expected_type));
        assert!(packet.len() > body.len(), "split at {split}");
    }
}

#[test]
fn test_connect_round_trips_through_decoder() {
    let opts = ConnectOptions::new("integration-client");
    let packet = encode_connect(&opts).unwrap();
    assert_round_trips_at_every_split(&packet, PacketType::Connect);
}

#[test]
fn test_publish_qos1_round_trips_through_decoder() {
    let opts = PublishOptions {
        qos: QoS::AtLeastOnce,
        retain: false,
        dup: false,
        packet_id: 77,
        topic: "sensors/temp",
        payload: b"21.5",
    };
    let packet = encode_publish(&opts).unwrap();
    assert_round_trips_at_every_split(&packet, PacketType::Publish);
}

#[test]
fn test_subscribe_round_trips_through_decoder() {
    let entries = vec![SubscribeTopic {
        topic: "a/+/c".to_string(),
        qos: QoS::ExactOnce,
    }];
    let packet = encode_subscribe(99, &entries).unwrap();
    assert_round_trips_at_every_split(&packet, PacketType::Subscribe);
}

#[test]
fn test_unsubscribe_round_trips_through_decoder() {
    let entries = vec![UnsubscribeTopic {
        topic: "a/+/c".to_string(),
    }];
    let packet = encode_unsubscribe(100, &entries).unwrap();
    assert_round_trips_at_every_split(&packet, PacketType::Unsubscribe);
}

#[test]
fn test_simple_packets_round_trip_through_decoder() {
    assert_round_trips_at_every_split(&encode_ping(), PacketType::PingRequest);
    assert_round_trips_at_every_split(&encode_disconnect(), PacketType::Disconnect);
}

/// A client's full connect/publish/disconnect exchange arrives as one
/// fragmented TCP read; the decoder must still recover every packet in order.
#[test]
fn test_mixed_session_arrives_as_one_fragmented_chunk() {
    let mut stream = Vec::new();
    stream.extend(encode_connect(&ConnectOptions::new("session-client")).unwrap());
    stream.extend(
        encode_publish(&PublishOptions {
            qos: QoS::AtMostOnce,
            retain: false,
            dup: false,
            packet_id: 0,
            topic: "a/b",
            payload: b"hello",
        })
        .unwrap(),
    );
    stream.extend(encode_publish_ack(1).unwrap());
    stream.extend(encode_disconnect());

    let mut decoder = StreamDecoder::new(Recorder::default());
    for chunk in stream.chunks(3) {
        decoder.feed(chunk).unwrap();
    }

    let types: Vec<_> = decoder
        .observer()
        .seen
        .iter()
        .map(|(pt, _, _)| *pt)
        .collect();
    assert_eq!(
        types,
        vec![
            Some(PacketType::Connect),
            Some(PacketType::Publish),
            Some(PacketType::PublishAck),
            Some(PacketType::Disconnect),
        ]
    );
}

/// A protocol error on one packet (oversized remaining length relative to a
/// caller-imposed limit) must not corrupt the decoding of packets that
/// follow it in the same stream.
#[test]
fn test_decoder_recovers_after_remaining_length_error() {
    use mqtt_codec::DecoderLimits;

    let limits = DecoderLimits {
        max_remaining_length: 4,
    };
    let mut decoder = StreamDecoder::with_limits(Recorder::default(), limits);

    let oversized = encode_publish(&PublishOptions {
        qos: QoS::AtMostOnce,
        retain: false,
        dup: false,
        packet_id: 0,
        topic: "too/long/a/topic/for/the/limit",
        payload: b"",
    })
    .unwrap();
    let err = decoder.feed(&oversized).unwrap_err();
    assert!(matches!(err, DecodeError::RemainingLengthTooLarge));

    decoder.feed(&encode_publish_ack(5).unwrap()).unwrap();
    assert_eq!(decoder.observer().seen.len(), 1);
    assert_eq!(decoder.observer().seen[0].0, Some(PacketType::PublishAck));
}
