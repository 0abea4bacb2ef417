//! Scalar protobuf types and their encoding/decoding implementations.

// This module uses `as` casts which have been reviewed for correctness.
#![allow(clippy::as_conversions)]

use bytes::{Buf, BufMut};

use super::{Decode, Encode, IsDefault, Skip, Wired};
use crate::error::DecodeError;
use crate::leb128::{skip_leb128, Leb128};
use crate::wire::WireType;

/// Marker for primitive scalar codecs: the element types legal inside a
/// packed repeated block.
pub trait Scalar: Encode + Decode + Skip + Copy {
    /// Shortest possible encoding of one element, used to bound capacity
    /// reservations when decoding packed blocks.
    const MIN_WIRE_LEN: usize = 1;
}

macro_rules! impl_varint_skip {
    ($ty:ty) => {
        impl Skip for $ty {
            #[inline]
            fn decode_skip<B: Buf>(buf: &mut B) -> Result<(), DecodeError> {
                skip_leb128(buf)
            }
        }
    };
}

impl Wired for u64 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl Decode for u64 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = u64::decode_leb128_buf(buf)?;
        Ok(())
    }
}

impl Encode for u64 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        self.encoded_leb128_len()
    }
}

impl_varint_skip!(u64);

impl Wired for u32 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl Decode for u32 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = u32::decode_leb128_buf(buf)?;
        Ok(())
    }
}

impl Encode for u32 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        self.encoded_leb128_len()
    }
}

impl_varint_skip!(u32);

impl Wired for i64 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl Decode for i64 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = u64::decode_leb128_buf(buf)? as i64;
        Ok(())
    }
}

impl Encode for i64 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        (*self as u64).encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        (*self as u64).encoded_leb128_len()
    }
}

impl_varint_skip!(i64);

impl Wired for i32 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl Decode for i32 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        // int32 travels sign-extended to 64 bits.
        *dst = u64::decode_leb128_buf(buf)? as i32;
        Ok(())
    }
}

impl Encode for i32 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        // Negative values are sign-extended to 64 bits, so they always
        // occupy ten bytes.
        (*self as i64 as u64).encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        (*self as i64 as u64).encoded_leb128_len()
    }
}

impl_varint_skip!(i32);

impl Wired for bool {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl Decode for bool {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        // Any varint is accepted; nonzero means true.
        *dst = u64::decode_leb128_buf(buf)? != 0;
        Ok(())
    }
}

impl Encode for bool {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(u8::from(*self));
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        1
    }
}

impl_varint_skip!(bool);

#[inline]
pub(crate) const fn zigzag_encode_32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

#[inline]
pub(crate) const fn zigzag_decode_32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ (-((n & 1) as i32))
}

#[inline]
pub(crate) const fn zigzag_encode_64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

#[inline]
pub(crate) const fn zigzag_decode_64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}

/// Wrapper for protobuf `sint32` (zigzag-encoded signed 32-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Sint32(pub i32);

impl core::ops::Deref for Sint32 {
    type Target = i32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Wired for Sint32 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl Decode for Sint32 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = Sint32(zigzag_decode_32(u32::decode_leb128_buf(buf)?));
        Ok(())
    }
}

impl Encode for Sint32 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        zigzag_encode_32(self.0).encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        zigzag_encode_32(self.0).encoded_leb128_len()
    }
}

impl_varint_skip!(Sint32);

/// Wrapper for protobuf `sint64` (zigzag-encoded signed 64-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Sint64(pub i64);

impl core::ops::Deref for Sint64 {
    type Target = i64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Wired for Sint64 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl Decode for Sint64 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = Sint64(zigzag_decode_64(u64::decode_leb128_buf(buf)?));
        Ok(())
    }
}

impl Encode for Sint64 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        zigzag_encode_64(self.0).encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        zigzag_encode_64(self.0).encoded_leb128_len()
    }
}

impl_varint_skip!(Sint64);

macro_rules! impl_fixed {
    ($name:ident, $inner:ty, $wire:ident, $size:expr, $get:ident, $put:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(pub $inner);

        impl core::ops::Deref for $name {
            type Target = $inner;
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Wired for $name {
            const WIRE_TYPE: WireType = WireType::$wire;
        }

        impl Decode for $name {
            #[inline]
            fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
                if buf.remaining() < $size {
                    return Err(DecodeError::unexpected_eof());
                }
                *dst = $name(buf.$get());
                Ok(())
            }
        }

        impl Encode for $name {
            #[inline]
            fn encode<B: BufMut>(&self, buf: &mut B) {
                buf.$put(self.0);
            }

            #[inline]
            fn encoded_len(&self) -> usize {
                $size
            }
        }

        impl Skip for $name {
            #[inline]
            fn decode_skip<B: Buf>(buf: &mut B) -> Result<(), DecodeError> {
                if buf.remaining() < $size {
                    return Err(DecodeError::unexpected_eof());
                }
                buf.advance($size);
                Ok(())
            }
        }
    };
}

impl_fixed!(
    Fixed32,
    u32,
    I32,
    4,
    get_u32_le,
    put_u32_le,
    "Wrapper for protobuf `fixed32` (little-endian unsigned 32-bit integer)."
);
impl_fixed!(
    Fixed64,
    u64,
    I64,
    8,
    get_u64_le,
    put_u64_le,
    "Wrapper for protobuf `fixed64` (little-endian unsigned 64-bit integer)."
);
impl_fixed!(
    Sfixed32,
    i32,
    I32,
    4,
    get_i32_le,
    put_i32_le,
    "Wrapper for protobuf `sfixed32` (little-endian signed 32-bit integer)."
);
impl_fixed!(
    Sfixed64,
    i64,
    I64,
    8,
    get_i64_le,
    put_i64_le,
    "Wrapper for protobuf `sfixed64` (little-endian signed 64-bit integer)."
);

impl Wired for f32 {
    const WIRE_TYPE: WireType = WireType::I32;
}

impl Decode for f32 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        if buf.remaining() < 4 {
            return Err(DecodeError::unexpected_eof());
        }
        // Raw IEEE 754 bit pattern; NaN payloads survive untouched.
        *dst = f32::from_bits(buf.get_u32_le());
        Ok(())
    }
}

impl Encode for f32 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.to_bits());
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        4
    }
}

impl Skip for f32 {
    #[inline]
    fn decode_skip<B: Buf>(buf: &mut B) -> Result<(), DecodeError> {
        if buf.remaining() < 4 {
            return Err(DecodeError::unexpected_eof());
        }
        buf.advance(4);
        Ok(())
    }
}

impl Wired for f64 {
    const WIRE_TYPE: WireType = WireType::I64;
}

impl Decode for f64 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        if buf.remaining() < 8 {
            return Err(DecodeError::unexpected_eof());
        }
        *dst = f64::from_bits(buf.get_u64_le());
        Ok(())
    }
}

impl Encode for f64 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u64_le(self.to_bits());
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        8
    }
}

impl Skip for f64 {
    #[inline]
    fn decode_skip<B: Buf>(buf: &mut B) -> Result<(), DecodeError> {
        if buf.remaining() < 8 {
            return Err(DecodeError::unexpected_eof());
        }
        buf.advance(8);
        Ok(())
    }
}

macro_rules! impl_is_default_zero {
    ($($ty:ty => $zero:expr),+ $(,)?) => {$(
        impl IsDefault for $ty {
            #[inline(always)]
            fn is_default(&self) -> bool {
                *self == $zero
            }
        }
    )+};
}

impl_is_default_zero! {
    u32 => 0,
    u64 => 0,
    i32 => 0,
    i64 => 0,
    bool => false,
    f32 => 0.0,
    f64 => 0.0,
    Sint32 => Sint32(0),
    Sint64 => Sint64(0),
    Fixed32 => Fixed32(0),
    Fixed64 => Fixed64(0),
    Sfixed32 => Sfixed32(0),
    Sfixed64 => Sfixed64(0),
}

macro_rules! impl_scalar {
    ($($ty:ty => $min:expr),+ $(,)?) => {$(
        impl Scalar for $ty {
            const MIN_WIRE_LEN: usize = $min;
        }
    )+};
}

impl_scalar! {
    u32 => 1,
    u64 => 1,
    i32 => 1,
    i64 => 1,
    bool => 1,
    Sint32 => 1,
    Sint64 => 1,
    Fixed32 => 4,
    Fixed64 => 8,
    Sfixed32 => 4,
    Sfixed64 => 8,
    f32 => 4,
    f64 => 8,
}
