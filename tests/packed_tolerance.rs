//! A repeated scalar must decode whether the producer packed it or not.

use bytes::Bytes;
use tagwire::codec::{Encode, Message, Packed};
use tagwire::wire::{encode_key, WireType};

tagwire::message! {
    pub struct UnpackedScores {
        2 => repeated scores: u32,
    }
}

tagwire::message! {
    pub struct PackedScores {
        2 => packed scores: u32,
    }
}

const SCORES: [u32; 4] = [3, 270, 86942, 0];

fn unpacked_wire() -> Vec<u8> {
    let mut buf = Vec::new();
    for score in SCORES {
        encode_key(WireType::Varint, 2, &mut buf);
        score.encode(&mut buf);
    }
    buf
}

fn packed_wire() -> Vec<u8> {
    let mut buf = Vec::new();
    encode_key(WireType::Len, 2, &mut buf);
    Packed::from(SCORES.to_vec()).encode(&mut buf);
    buf
}

#[test]
fn repeated_field_accepts_both_forms() {
    let from_unpacked = UnpackedScores::decode_message(Bytes::from(unpacked_wire())).unwrap();
    assert_eq!(from_unpacked.scores, SCORES);

    let from_packed = UnpackedScores::decode_message(Bytes::from(packed_wire())).unwrap();
    assert_eq!(from_packed.scores, SCORES);
}

#[test]
fn packed_field_accepts_both_forms() {
    let from_packed = PackedScores::decode_message(Bytes::from(packed_wire())).unwrap();
    assert_eq!(from_packed.scores.as_slice(), &SCORES[..]);

    let from_unpacked = PackedScores::decode_message(Bytes::from(unpacked_wire())).unwrap();
    assert_eq!(from_unpacked.scores.as_slice(), &SCORES[..]);
}

#[test]
fn mixed_forms_accumulate_in_order() {
    // A packed chunk, then an unpacked straggler, then another chunk.
    let mut buf = Vec::new();
    encode_key(WireType::Len, 2, &mut buf);
    Packed::from(vec![1u32, 2]).encode(&mut buf);
    encode_key(WireType::Varint, 2, &mut buf);
    3u32.encode(&mut buf);
    encode_key(WireType::Len, 2, &mut buf);
    Packed::from(vec![4u32]).encode(&mut buf);

    let decoded = UnpackedScores::decode_message(Bytes::from(buf.clone())).unwrap();
    assert_eq!(decoded.scores, [1, 2, 3, 4]);

    let decoded = PackedScores::decode_message(Bytes::from(buf)).unwrap();
    assert_eq!(decoded.scores.as_slice(), &[1, 2, 3, 4][..]);
}

#[test]
fn packed_and_unpacked_encodings_describe_same_values() {
    // The two encodings differ on the wire but agree after decode.
    assert_ne!(unpacked_wire(), packed_wire());

    let a = UnpackedScores::decode_message(Bytes::from(unpacked_wire())).unwrap();
    let b = UnpackedScores::decode_message(Bytes::from(packed_wire())).unwrap();
    assert_eq!(a, b);
}
