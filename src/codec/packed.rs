//! Packed repeated fields.
//!
//! A packed field serializes a whole sequence of scalars as one
//! length-delimited block: a varint byte length followed by the
//! concatenated element encodings, with no per-element keys. Only primitive
//! scalars, bools, and enums may be packed; length-delimited element types
//! would be ambiguous inside the block.

use alloc::vec::Vec;

use bytes::{Buf, BufMut};

use super::{Decode, Encode, Scalar, Skip, Wired};
use crate::error::DecodeError;
use crate::leb128::Leb128;
use crate::util::CastFrom;
use crate::wire::{self, WireType};

/// Decodes `varint(len)` followed by `len` bytes of concatenated elements,
/// appending to `dst`.
///
/// The claimed length is checked against the remaining view before any
/// element decodes, and every element must land inside it: one that crosses
/// the claimed boundary is a fatal overrun, even if more input follows.
pub(crate) fn decode_len_prefixed_elements<T: Decode, B: Buf>(
    buf: &mut B,
    min_element_len: usize,
    dst: &mut Vec<T>,
) -> Result<(), DecodeError> {
    let len = wire::decode_len(buf)?;
    let available = buf.remaining();
    if len > available {
        return Err(DecodeError::length_overrun(len, available));
    }

    // The length prefix bounds the element count, so this reservation can
    // never exceed what the input actually holds.
    dst.reserve(len / min_element_len.max(1));

    let start = buf.remaining();
    while start - buf.remaining() < len {
        let value = T::decode(buf)?;
        let consumed = start - buf.remaining();
        if consumed > len {
            return Err(DecodeError::length_overrun(consumed, len));
        }
        dst.push(value);
    }
    Ok(())
}

/// A packed repeated field with owned element storage.
///
/// Encoding is two-pass: the element lengths are summed first (via
/// [`Encode::encoded_len`]) to produce the length prefix, then the elements
/// are written in order. Decoding one wire occurrence appends to the
/// existing elements, because a field may legally appear in several packed
/// chunks that concatenate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Packed<T> {
    values: Vec<T>,
}

impl<T> Packed<T> {
    /// Create an empty packed field.
    #[inline]
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Append an element.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.values.push(value);
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Iterate over the elements.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Consume the field, returning the elements.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.values
    }
}

impl<T> From<Vec<T>> for Packed<T> {
    fn from(values: Vec<T>) -> Self {
        Self { values }
    }
}

impl<T> core::ops::Deref for Packed<T> {
    type Target = [T];
    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl<'a, T> IntoIterator for &'a Packed<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<T: Scalar> Wired for Packed<T> {
    const WIRE_TYPE: WireType = WireType::Len;
}

impl<T: Scalar> Encode for Packed<T> {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        let payload_len: usize = self.values.iter().map(Encode::encoded_len).sum();
        u64::cast_from(payload_len).encode_leb128(buf);
        for value in &self.values {
            value.encode(buf);
        }
    }

    fn encoded_len(&self) -> usize {
        let payload_len: usize = self.values.iter().map(Encode::encoded_len).sum();
        u64::cast_from(payload_len).encoded_leb128_len() + payload_len
    }
}

impl<T: Scalar> Decode for Packed<T> {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        decode_len_prefixed_elements(buf, T::MIN_WIRE_LEN, &mut dst.values)
    }
}

impl<T: Scalar> Skip for Packed<T> {
    #[inline]
    fn decode_skip<B: Buf>(buf: &mut B) -> Result<(), DecodeError> {
        wire::skip_value(WireType::Len, buf)
    }
}

/// Decode one wire occurrence of a packed field, tolerating the unpacked
/// form.
///
/// Producers are allowed to emit a repeated scalar either way; a receiver
/// declared packed must still accept per-element records carrying the
/// element's native wire type.
#[inline]
pub fn decode_packed_into<T, B>(
    wire_type: WireType,
    buf: &mut B,
    dst: &mut Packed<T>,
) -> Result<(), DecodeError>
where
    T: Scalar,
    B: Buf,
{
    if wire_type == WireType::Len {
        Packed::decode_into(buf, dst)
    } else {
        let mut value = T::default();
        T::decode_into(buf, &mut value)?;
        dst.push(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::codec::{Fixed32, Sint64};

    fn roundtrip<T: Scalar + PartialEq + core::fmt::Debug>(values: Vec<T>) {
        let packed = Packed::from(values);

        let mut buf = Vec::new();
        packed.encode(&mut buf);
        assert_eq!(buf.len(), packed.encoded_len());

        let mut view = &buf[..];
        let decoded = Packed::<T>::decode(&mut view).unwrap();
        assert_eq!(decoded, packed);
        assert!(view.is_empty());
    }

    #[test]
    fn test_packed_varint_roundtrip() {
        roundtrip::<u32>(vec![]);
        roundtrip(vec![3u32, 270, 86942]);
        roundtrip(vec![0u64, 1, u64::MAX]);
        roundtrip(vec![true, false, true]);
        roundtrip(vec![Sint64(-1), Sint64(0), Sint64(i64::MIN)]);
    }

    #[test]
    fn test_packed_fixed_roundtrip() {
        roundtrip(vec![Fixed32(1), Fixed32(2), Fixed32(u32::MAX)]);
        roundtrip(vec![1.5f64, -2.25, f64::MAX]);
    }

    #[test]
    fn test_packed_known_bytes() {
        // The canonical packed example from the encoding guide:
        // [3, 270, 86942] -> 6 payload bytes.
        let packed = Packed::from(vec![3u32, 270, 86942]);
        let mut buf = Vec::new();
        packed.encode(&mut buf);
        assert_eq!(buf, [0x06, 0x03, 0x8e, 0x02, 0x9e, 0xa7, 0x05]);
    }

    #[test]
    fn test_packed_occurrences_concatenate() {
        let mut chunk_a = Vec::new();
        Packed::from(vec![1u32, 2]).encode(&mut chunk_a);
        let mut chunk_b = Vec::new();
        Packed::from(vec![3u32, 4]).encode(&mut chunk_b);

        let mut dst = Packed::<u32>::new();
        let mut view = &chunk_a[..];
        Packed::decode_into(&mut view, &mut dst).unwrap();
        let mut view = &chunk_b[..];
        Packed::decode_into(&mut view, &mut dst).unwrap();

        assert_eq!(dst.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_packed_claimed_length_overrun() {
        // Claims 4 payload bytes but only 2 remain.
        let mut view: &[u8] = &[0x04, 0x01, 0x02];
        let mut dst = Packed::<u32>::new();
        assert_eq!(
            Packed::decode_into(&mut view, &mut dst),
            Err(DecodeError::LengthOverrun {
                claimed: 4,
                available: 2
            })
        );
    }

    #[test]
    fn test_packed_element_straddles_boundary() {
        // Claims 1 payload byte, but the varint inside continues past it.
        let mut view: &[u8] = &[0x01, 0x80, 0x01];
        let mut dst = Packed::<u32>::new();
        assert_eq!(
            Packed::decode_into(&mut view, &mut dst),
            Err(DecodeError::LengthOverrun {
                claimed: 2,
                available: 1
            })
        );
    }

    #[test]
    fn test_packed_fixed_partial_element() {
        // Six payload bytes cannot hold a whole number of Fixed32s.
        let mut view: &[u8] = &[0x06, 1, 0, 0, 0, 2, 0];
        let mut dst = Packed::<Fixed32>::new();
        assert!(Packed::decode_into(&mut view, &mut dst).is_err());
    }

    #[test]
    fn test_unpacked_tolerance() {
        // A single unpacked occurrence: just the varint value.
        let mut buf = Vec::new();
        42u32.encode(&mut buf);

        let mut dst = Packed::<u32>::new();
        let mut view = &buf[..];
        decode_packed_into(WireType::Varint, &mut view, &mut dst).unwrap();
        assert_eq!(dst.as_slice(), &[42]);
    }
}
