//! Wire format for Google's Protocol Buffers, aka [protobuf](https://protobuf.dev).
//!
//! An encoded message is a sequence of records, each a field key followed by
//! a payload. The key packs the field number and a [`WireType`] telling the
//! decoder how the payload is framed.

use core::num::NonZeroU32;

use bytes::{Buf, BufMut};

use crate::error::DecodeError;
use crate::leb128::{skip_leb128, Leb128};
use crate::util::{likely, unlikely};

/// Minimum legal protobuf field number.
pub const MIN_FIELD_NUMBER: u32 = 1;
/// Maximum legal protobuf field number.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// First field number of the range reserved for the protobuf implementation.
pub const FIRST_RESERVED_FIELD_NUMBER: u32 = 19000;
/// Last field number of the range reserved for the protobuf implementation.
pub const LAST_RESERVED_FIELD_NUMBER: u32 = 19999;

/// Whether `number` may be used when declaring a message field.
///
/// Rejects numbers outside `1..=2^29-1` and the implementation-reserved
/// 19000..=19999 band. Note that *decoding* still accepts reserved numbers;
/// other producers may legally emit them.
pub const fn field_number_is_valid(number: u32) -> bool {
    number >= MIN_FIELD_NUMBER
        && number <= MAX_FIELD_NUMBER
        && !(number >= FIRST_RESERVED_FIELD_NUMBER && number <= LAST_RESERVED_FIELD_NUMBER)
}

/// Denotes how the payload of a field record is framed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum WireType {
    /// Variable length integer.
    ///
    /// Used for: `int32`, `int64`, `uint32`, `uint64`, `sint32`, `sint64`, `bool`, `enum`.
    Varint = 0,
    /// Fixed 8-byte payload.
    ///
    /// Used for: `fixed64`, `sfixed64`, `double`.
    I64 = 1,
    /// Length-delimited payload.
    ///
    /// Used for: `string`, `bytes`, embedded messages, packed repeated fields.
    Len = 2,
    /// Group start (deprecated, never supported here).
    SGroup = 3,
    /// Group end (deprecated, never supported here).
    EGroup = 4,
    /// Fixed 4-byte payload.
    ///
    /// Used for: `fixed32`, `sfixed32`, `float`.
    I32 = 5,
}

crate::util::assert_eq_size!(WireType, u8);

impl WireType {
    const MAX_VAL: u8 = 5;

    /// Try to decode a [`WireType`] from its raw 3-bit value.
    #[inline(always)]
    fn try_from_val(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::I64),
            2 => Ok(WireType::Len),
            3 => Ok(WireType::SGroup),
            4 => Ok(WireType::EGroup),
            5 => Ok(WireType::I32),
            _ => Err(DecodeError::InvalidWireType { value }),
        }
    }

    /// The raw value for this [`WireType`].
    #[inline(always)]
    #[allow(clippy::as_conversions)]
    pub const fn into_val(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for WireType {
    type Error = DecodeError;

    #[inline(always)]
    fn try_from(value: u8) -> Result<Self, DecodeError> {
        WireType::try_from_val(value)
    }
}

/// A decoded field key: a wire type plus a field number.
///
/// The layout mirrors the wire format: bits 0-2 hold the wire type, bits
/// 3-31 the field number. Field numbers start at 1, so the raw value is
/// always at least 8 and [`NonZeroU32`] applies.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct FieldKey(NonZeroU32);

impl FieldKey {
    /// Validate a raw key value decoded off the wire.
    #[inline(always)]
    fn try_from_raw(raw: u32) -> Result<Self, DecodeError> {
        #[allow(clippy::as_conversions)]
        let wire_type_val = (raw & 0b111) as u8;
        if unlikely(wire_type_val > WireType::MAX_VAL) {
            return Err(DecodeError::InvalidWireType {
                value: wire_type_val,
            });
        }

        let number = raw >> 3;
        if unlikely(number < MIN_FIELD_NUMBER || number > MAX_FIELD_NUMBER) {
            return Err(DecodeError::InvalidFieldNumber);
        }

        // The field number check above guarantees raw >= 8.
        match NonZeroU32::new(raw) {
            Some(raw) => Ok(Self(raw)),
            None => Err(DecodeError::InvalidFieldNumber),
        }
    }

    /// The [`WireType`] component of this key.
    #[inline(always)]
    pub fn wire_type(self) -> WireType {
        match self.0.get() & 0b111 {
            0 => WireType::Varint,
            1 => WireType::I64,
            2 => WireType::Len,
            3 => WireType::SGroup,
            4 => WireType::EGroup,
            // Values 6 and 7 are rejected during construction.
            _ => WireType::I32,
        }
    }

    /// The field number component of this key.
    #[inline(always)]
    pub const fn field_number(self) -> u32 {
        self.0.get() >> 3
    }

    /// Decompose this key into its [`WireType`] and field number.
    #[inline(always)]
    pub fn into_parts(self) -> (WireType, u32) {
        (self.wire_type(), self.field_number())
    }
}

impl core::fmt::Debug for FieldKey {
    #[cold]
    #[inline(never)]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldKey")
            .field("wire_type", &self.wire_type())
            .field("field_number", &self.field_number())
            .finish()
    }
}

/// Encodes a field key as `varint((number << 3) | wire_type)`.
///
/// Hot path for encoding, called once per field in every message.
#[inline(always)]
pub fn encode_key<B: BufMut>(wire_type: WireType, number: u32, buf: &mut B) {
    let key = (number << 3) | u32::from(wire_type.into_val());
    key.encode_leb128(buf);
}

/// Returns the encoded length of a field key.
///
/// The wire type only occupies the low three bits, so it never changes the
/// length.
#[inline(always)]
pub fn encoded_key_len(number: u32) -> usize {
    (number << 3).encoded_leb128_len()
}

/// Decodes the field key at the front of `buf`.
#[inline]
pub fn decode_key<B: Buf>(buf: &mut B) -> Result<FieldKey, DecodeError> {
    // Keys always fit in a u32: the largest is `(2^29-1) << 3 | 7`.
    let raw = u32::decode_leb128_buf(buf)?;
    FieldKey::try_from_raw(raw)
}

/// Decodes the length prefix of a length-delimited payload.
#[inline(always)]
pub fn decode_len<B: Buf>(buf: &mut B) -> Result<usize, DecodeError> {
    let chunk = buf.chunk();
    // Fast path: most lengths fit in one byte.
    if likely(!chunk.is_empty() && chunk[0] < 0x80) {
        let len = usize::from(chunk[0]);
        buf.advance(1);
        return Ok(len);
    }
    let len = u64::decode_leb128_buf(buf)?;
    usize::try_from(len).map_err(|_| DecodeError::LengthOverflow { value: len })
}

/// Advances `buf` past one payload of the given wire type.
///
/// This is the wire-type-indexed skipper table: it lets a decoder step over
/// fields it knows nothing about, which is what makes schema evolution work.
/// Group wire types have no framing we can honor and are fatal.
#[inline(always)]
pub fn skip_value<B: Buf>(wire_type: WireType, buf: &mut B) -> Result<(), DecodeError> {
    let skip_len = match wire_type {
        WireType::Varint => return skip_leb128(buf),
        WireType::I64 => 8,
        WireType::Len => decode_len(buf)?,
        WireType::I32 => 4,
        WireType::SGroup | WireType::EGroup => {
            return Err(DecodeError::GroupsUnsupported);
        }
    };

    if buf.remaining() < skip_len {
        return Err(DecodeError::unexpected_eof());
    }
    buf.advance(skip_len);
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use proptest::prelude::*;

    use super::{
        decode_key, decode_len, encode_key, encoded_key_len, field_number_is_valid, skip_value,
        WireType, MAX_FIELD_NUMBER, MIN_FIELD_NUMBER,
    };
    use crate::error::DecodeError;

    #[test]
    fn proptest_key_roundtrips() {
        fn arb_number() -> impl Strategy<Value = u32> {
            MIN_FIELD_NUMBER..=MAX_FIELD_NUMBER
        }

        fn arb_wiretype() -> impl Strategy<Value = WireType> {
            (0..=5u8).prop_map(|val| WireType::try_from(val).expect("known valid"))
        }

        fn test(number: u32, wire_type: WireType) {
            let mut buf = Vec::with_capacity(8);
            encode_key(wire_type, number, &mut buf);
            assert_eq!(buf.len(), encoded_key_len(number));

            let (rnd_wire_type, rnd_number) = decode_key(&mut &buf[..]).unwrap().into_parts();
            assert_eq!(number, rnd_number);
            assert_eq!(wire_type, rnd_wire_type);
        }

        let strat = (arb_number(), arb_wiretype());
        proptest!(|((number, wire_type) in strat)| test(number, wire_type))
    }

    #[test]
    fn test_all_wire_type_values() {
        for i in u8::MIN..u8::MAX {
            let wire_type = WireType::try_from(i);
            match (i, wire_type) {
                (0, Ok(WireType::Varint))
                | (1, Ok(WireType::I64))
                | (2, Ok(WireType::Len))
                | (3, Ok(WireType::SGroup))
                | (4, Ok(WireType::EGroup))
                | (5, Ok(WireType::I32)) => (),
                (_, Err(_)) => (),
                other => panic!("unexpected value {other:?}"),
            }
        }
    }

    #[test]
    fn test_field_number_validity() {
        assert!(!field_number_is_valid(0));
        assert!(field_number_is_valid(1));
        assert!(field_number_is_valid(18999));
        assert!(!field_number_is_valid(19000));
        assert!(!field_number_is_valid(19500));
        assert!(!field_number_is_valid(19999));
        assert!(field_number_is_valid(20000));
        assert!(field_number_is_valid(MAX_FIELD_NUMBER));
        assert!(!field_number_is_valid(MAX_FIELD_NUMBER + 1));
    }

    #[test]
    fn test_decode_key_rejects_zero_field_number() {
        // Raw key 0x02 would be field number 0 with wire type Len.
        let mut buf: &[u8] = &[0x02];
        assert_eq!(decode_key(&mut buf), Err(DecodeError::InvalidFieldNumber));
    }

    #[test]
    fn test_decode_key_rejects_wire_type_six_and_seven() {
        let mut buf: &[u8] = &[0x0e];
        assert_eq!(
            decode_key(&mut buf),
            Err(DecodeError::InvalidWireType { value: 6 })
        );
        let mut buf: &[u8] = &[0x0f];
        assert_eq!(
            decode_key(&mut buf),
            Err(DecodeError::InvalidWireType { value: 7 })
        );
    }

    #[test]
    fn test_decode_len() {
        let mut buf: &[u8] = &[0];
        assert_eq!(decode_len(&mut buf).unwrap(), 0);

        let mut buf: &[u8] = &[127];
        assert_eq!(decode_len(&mut buf).unwrap(), 127);

        let mut buf: &[u8] = &[0x80, 0x01];
        assert_eq!(decode_len(&mut buf).unwrap(), 128);

        let mut buf: &[u8] = &[0xac, 0x02];
        assert_eq!(decode_len(&mut buf).unwrap(), 300);
    }

    #[test]
    fn test_skip_value_varint() {
        let mut buf: &[u8] = &[42, 99];
        skip_value(WireType::Varint, &mut buf).unwrap();
        assert_eq!(buf, &[99]);

        let mut buf: &[u8] = &[0x80, 0x01, 99];
        skip_value(WireType::Varint, &mut buf).unwrap();
        assert_eq!(buf, &[99]);
    }

    #[test]
    fn test_skip_value_fixed() {
        let mut buf: &[u8] = &[1, 2, 3, 4, 99];
        skip_value(WireType::I32, &mut buf).unwrap();
        assert_eq!(buf, &[99]);

        let mut buf: &[u8] = &[1, 2, 3, 4, 5, 6, 7, 8, 99];
        skip_value(WireType::I64, &mut buf).unwrap();
        assert_eq!(buf, &[99]);

        // Too short for the fixed width.
        let mut buf: &[u8] = &[1, 2, 3];
        assert_eq!(
            skip_value(WireType::I32, &mut buf),
            Err(DecodeError::UnexpectedEof)
        );
    }

    #[test]
    fn test_skip_value_len() {
        let mut buf: &[u8] = &[3, 1, 2, 3, 99];
        skip_value(WireType::Len, &mut buf).unwrap();
        assert_eq!(buf, &[99]);

        let mut buf: &[u8] = &[0, 99];
        skip_value(WireType::Len, &mut buf).unwrap();
        assert_eq!(buf, &[99]);

        // Length prefix claims more bytes than remain.
        let mut buf: &[u8] = &[5, 1, 2];
        assert_eq!(
            skip_value(WireType::Len, &mut buf),
            Err(DecodeError::UnexpectedEof)
        );
    }

    #[test]
    fn test_skip_value_groups_error() {
        let mut buf: &[u8] = &[0];
        assert_eq!(
            skip_value(WireType::SGroup, &mut buf),
            Err(DecodeError::GroupsUnsupported)
        );
        let mut buf: &[u8] = &[0];
        assert_eq!(
            skip_value(WireType::EGroup, &mut buf),
            Err(DecodeError::GroupsUnsupported)
        );
    }
}
