//! Unpacked repeated fields.
//!
//! An unpacked repeated field is a sequence of ordinary `<key><value>`
//! records sharing one field number; occurrences need not be contiguous in
//! the message. Storage is a plain `Vec<T>`, and one wire occurrence
//! appends one element.

use alloc::vec::Vec;

use bytes::{Buf, BufMut};

use super::packed::decode_len_prefixed_elements;
use super::{Decode, Encode, Wired};
use crate::error::DecodeError;
use crate::wire::{self, WireType};

impl<T: Wired> Wired for Vec<T> {
    // Elements carry their own wire type; the Vec itself has no framing.
    const WIRE_TYPE: WireType = T::WIRE_TYPE;
}

impl<T: Decode> Decode for Vec<T> {
    /// Decode a single occurrence of a repeated field and append it.
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        let mut value = T::default();
        T::decode_into(buf, &mut value)?;
        dst.push(value);
        Ok(())
    }
}

impl<T: Encode> Encode for Vec<T> {
    /// Encode all values without field keys; [`RepeatedField`] adds keys.
    fn encode<B: BufMut>(&self, buf: &mut B) {
        for value in self {
            value.encode(buf);
        }
    }

    fn encoded_len(&self) -> usize {
        self.iter().map(Encode::encoded_len).sum()
    }
}

/// Field-level operations for repeated storage.
///
/// Unlike [`Encode`], these emit one field key per element, which is the
/// unpacked wire form.
pub trait RepeatedField {
    /// Encode all elements with their field keys.
    fn encode_repeated<B: BufMut>(&self, number: u32, buf: &mut B);

    /// Total encoded length including field keys.
    fn encoded_repeated_len(&self, number: u32) -> usize;

    /// Number of elements.
    fn repeated_len(&self) -> usize;

    /// True if there are no elements.
    fn is_repeated_empty(&self) -> bool {
        self.repeated_len() == 0
    }
}

impl<T: Encode> RepeatedField for Vec<T> {
    fn encode_repeated<B: BufMut>(&self, number: u32, buf: &mut B) {
        for value in self {
            wire::encode_key(T::WIRE_TYPE, number, buf);
            value.encode(buf);
        }
    }

    fn encoded_repeated_len(&self, number: u32) -> usize {
        if self.is_empty() {
            return 0;
        }
        let key_len = wire::encoded_key_len(number);
        self.iter().map(|v| key_len + v.encoded_len()).sum()
    }

    fn repeated_len(&self) -> usize {
        self.len()
    }
}

/// Decode one wire occurrence of a repeated field, handling both packed and
/// unpacked encodings.
///
/// A producer may emit a repeated scalar either unpacked (one record per
/// element, the element's native wire type) or packed (a single
/// length-delimited block). Receivers must accept both. Packed form is
/// detected by a LEN wire type on a field whose element type is not itself
/// length-delimited.
#[inline]
pub fn decode_repeated_into<T, B>(
    wire_type: WireType,
    buf: &mut B,
    dst: &mut Vec<T>,
) -> Result<(), DecodeError>
where
    T: Decode,
    B: Buf,
{
    if wire_type == WireType::Len && T::WIRE_TYPE != WireType::Len {
        decode_len_prefixed_elements(buf, 1, dst)
    } else {
        Vec::decode_into(buf, dst)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::codec::{Packed, Utf8};
    use crate::wire::{decode_key, skip_value};

    #[test]
    fn test_repeated_encode_decode() {
        let values = vec![Utf8::from("hello"), Utf8::from("world"), Utf8::from("!")];

        let mut buf = Vec::new();
        values.encode_repeated(2, &mut buf);
        assert_eq!(buf.len(), values.encoded_repeated_len(2));

        let mut decoded: Vec<Utf8> = Vec::new();
        let mut view = &buf[..];
        while !view.is_empty() {
            let (wire_type, number) = decode_key(&mut view).unwrap().into_parts();
            assert_eq!(number, 2);
            decode_repeated_into(wire_type, &mut view, &mut decoded).unwrap();
        }

        assert_eq!(decoded, values);
    }

    #[test]
    fn test_repeated_interleaved_with_other_fields() {
        // Occurrences of field 11 are split around a field 2 record.
        let mut buf = Vec::new();
        wire::encode_key(WireType::Varint, 11, &mut buf);
        99u32.encode(&mut buf);
        wire::encode_key(WireType::Len, 2, &mut buf);
        Utf8::from("Parker").encode(&mut buf);
        wire::encode_key(WireType::Varint, 11, &mut buf);
        91u32.encode(&mut buf);
        wire::encode_key(WireType::Varint, 11, &mut buf);
        107u32.encode(&mut buf);

        let mut scores: Vec<u32> = Vec::new();
        let mut view = &buf[..];
        while !view.is_empty() {
            let (wire_type, number) = decode_key(&mut view).unwrap().into_parts();
            if number == 11 {
                decode_repeated_into(wire_type, &mut view, &mut scores).unwrap();
            } else {
                skip_value(wire_type, &mut view).unwrap();
            }
        }

        assert_eq!(scores, vec![99, 91, 107]);
    }

    #[test]
    fn test_repeated_accepts_packed_form() {
        // Encode as a packed block, decode through the repeated path.
        let mut buf = Vec::new();
        Packed::from(vec![7u32, 8, 9]).encode(&mut buf);

        let mut decoded: Vec<u32> = Vec::new();
        let mut view = &buf[..];
        decode_repeated_into(WireType::Len, &mut view, &mut decoded).unwrap();

        assert_eq!(decoded, vec![7, 8, 9]);
        assert!(view.is_empty());
    }

    #[test]
    fn test_repeated_strings_keep_native_len_path() {
        // For a LEN element type, a LEN wire type is the unpacked form,
        // not a packed block.
        let mut buf = Vec::new();
        Utf8::from("solo").encode(&mut buf);

        let mut decoded: Vec<Utf8> = Vec::new();
        let mut view = &buf[..];
        decode_repeated_into(WireType::Len, &mut view, &mut decoded).unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].to_string(), "solo");
    }

    #[test]
    fn test_empty_repeated_encodes_nothing() {
        let values: Vec<u32> = Vec::new();
        let mut buf = Vec::new();
        values.encode_repeated(1, &mut buf);
        assert!(buf.is_empty());
        assert_eq!(values.encoded_repeated_len(1), 0);
    }
}
