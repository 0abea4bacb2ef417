//! Length-delimited protobuf types (bytes, string).
//!
//! Both encode as `varint(len) || payload`. Strings are validated as UTF-8
//! while decoding so later accesses are free.

use alloc::string::String;

use bytes::{Buf, BufMut};

use super::{Decode, Encode, IsDefault, Skip, Wired};
use crate::error::DecodeError;
use crate::leb128::Leb128;
use crate::util::CastFrom;
use crate::wire::{self, WireType};

/// Reads the length prefix and the framed payload, bounds checked.
#[inline]
fn decode_delimited<B: Buf>(buf: &mut B) -> Result<bytes::Bytes, DecodeError> {
    let len = wire::decode_len(buf)?;
    if buf.remaining() < len {
        return Err(DecodeError::length_overrun(len, buf.remaining()));
    }
    Ok(buf.copy_to_bytes(len))
}

#[inline]
fn encode_delimited<B: BufMut>(payload: &[u8], buf: &mut B) {
    u64::cast_from(payload.len()).encode_leb128(buf);
    buf.put_slice(payload);
}

#[inline]
fn delimited_len(payload: &[u8]) -> usize {
    u64::cast_from(payload.len()).encoded_leb128_len() + payload.len()
}

/// Wrapper for a protobuf `bytes` field (length-delimited raw bytes).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Blob(pub bytes::Bytes);

impl Blob {
    /// The raw payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the blob and returns the underlying `Bytes`.
    pub fn into_bytes(self) -> bytes::Bytes {
        self.0
    }
}

impl core::ops::Deref for Blob {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<bytes::Bytes> for Blob {
    fn from(b: bytes::Bytes) -> Self {
        Blob(b)
    }
}

impl From<&[u8]> for Blob {
    fn from(b: &[u8]) -> Self {
        Blob(bytes::Bytes::copy_from_slice(b))
    }
}

impl Wired for Blob {
    const WIRE_TYPE: WireType = WireType::Len;
}

impl Decode for Blob {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = Blob(decode_delimited(buf)?);
        Ok(())
    }
}

impl Encode for Blob {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        encode_delimited(&self.0, buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        delimited_len(&self.0)
    }
}

impl Skip for Blob {
    #[inline]
    fn decode_skip<B: Buf>(buf: &mut B) -> Result<(), DecodeError> {
        wire::skip_value(WireType::Len, buf)
    }
}

impl IsDefault for Blob {
    #[inline]
    fn is_default(&self) -> bool {
        self.0.is_empty()
    }
}

/// Wrapper for a protobuf `string` field (length-delimited UTF-8 text).
///
/// The payload is validated while decoding, so the invariant "always valid
/// UTF-8" holds for every reachable value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Utf8(bytes::Bytes);

impl Utf8 {
    /// View the text as `&str`.
    pub fn as_str(&self) -> &str {
        // SAFETY: every constructor of `Utf8` validates the payload.
        unsafe { core::str::from_utf8_unchecked(&self.0) }
    }

    /// The raw payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the string and returns the underlying `Bytes`.
    pub fn into_bytes(self) -> bytes::Bytes {
        self.0
    }
}

impl core::ops::Deref for Utf8 {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl From<&str> for Utf8 {
    fn from(s: &str) -> Self {
        Utf8(bytes::Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Utf8 {
    fn from(s: String) -> Self {
        Utf8(bytes::Bytes::from(s.into_bytes()))
    }
}

impl Wired for Utf8 {
    const WIRE_TYPE: WireType = WireType::Len;
}

impl Decode for Utf8 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        let data = decode_delimited(buf)?;
        if core::str::from_utf8(&data).is_err() {
            return Err(DecodeError::InvalidUtf8);
        }
        *dst = Utf8(data);
        Ok(())
    }
}

impl Encode for Utf8 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        encode_delimited(&self.0, buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        delimited_len(&self.0)
    }
}

impl Skip for Utf8 {
    #[inline]
    fn decode_skip<B: Buf>(buf: &mut B) -> Result<(), DecodeError> {
        wire::skip_value(WireType::Len, buf)
    }
}

impl IsDefault for Utf8 {
    #[inline]
    fn is_default(&self) -> bool {
        self.0.is_empty()
    }
}

// `String` fields work too, for callers that want owned std strings over
// zero-copy `Utf8`.

impl Wired for String {
    const WIRE_TYPE: WireType = WireType::Len;
}

impl Decode for String {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        let data = decode_delimited(buf)?;
        let text = core::str::from_utf8(&data).map_err(|_| DecodeError::InvalidUtf8)?;
        dst.clear();
        dst.push_str(text);
        Ok(())
    }
}

impl Encode for String {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        encode_delimited(self.as_bytes(), buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        delimited_len(self.as_bytes())
    }
}

impl Skip for String {
    #[inline]
    fn decode_skip<B: Buf>(buf: &mut B) -> Result<(), DecodeError> {
        wire::skip_value(WireType::Len, buf)
    }
}

impl IsDefault for String {
    #[inline]
    fn is_default(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::fmt::Debug;

    use super::*;

    fn roundtrip<T: Encode + Decode + PartialEq + Debug>(value: T) {
        let mut buf = Vec::new();
        value.encode(&mut buf);
        assert_eq!(buf.len(), value.encoded_len());

        let mut view = &buf[..];
        let decoded = T::decode(&mut view).unwrap();
        assert_eq!(decoded, value);
        assert!(view.is_empty());
    }

    #[test]
    fn test_blob_roundtrip() {
        roundtrip(Blob::from(&[][..]));
        roundtrip(Blob::from(&[1, 2, 3][..]));
        roundtrip(Blob::from(&[0u8; 300][..]));
    }

    #[test]
    fn test_utf8_roundtrip() {
        roundtrip(Utf8::from(""));
        roundtrip(Utf8::from("twice"));
        roundtrip(Utf8::from("hello world! 🎉"));
        roundtrip(String::from("owned"));
    }

    #[test]
    fn test_utf8_deref() {
        let s = Utf8::from("hello");
        assert_eq!(&*s, "hello");
        assert_eq!(s.len(), 5);
        assert!(s.starts_with("hel"));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        // Length prefix 3, then invalid UTF-8 bytes.
        let data: &[u8] = &[3, 0xff, 0xfe, 0xfd];

        let mut view = data;
        assert_eq!(Utf8::decode(&mut view), Err(DecodeError::InvalidUtf8));

        let mut view = data;
        assert_eq!(String::decode(&mut view), Err(DecodeError::InvalidUtf8));

        // The same payload is fine as a blob.
        let mut view = data;
        assert_eq!(Blob::decode(&mut view).unwrap().as_bytes(), &data[1..]);
    }

    #[test]
    fn test_length_prefix_overrun() {
        // Claims five bytes, carries two.
        let mut view: &[u8] = &[5, b'h', b'i'];
        assert_eq!(
            Blob::decode(&mut view),
            Err(DecodeError::LengthOverrun {
                claimed: 5,
                available: 2
            })
        );
    }

    #[test]
    fn test_skip_matches_decode() {
        let mut buf = Vec::new();
        Utf8::from("skip me").encode(&mut buf);
        buf.push(0xaa);

        let mut decode_view = &buf[..];
        Utf8::decode(&mut decode_view).unwrap();

        let mut skip_view = &buf[..];
        Utf8::decode_skip(&mut skip_view).unwrap();

        assert_eq!(decode_view, skip_view);
        assert_eq!(skip_view, &[0xaa]);
    }
}
