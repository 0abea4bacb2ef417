//! LEB128 variable-length integer encoding and decoding.
//!
//! Each byte of a varint carries seven value bits, least-significant group
//! first, with the most significant bit acting as a continuation flag. Zero
//! encodes as a single `0x00` byte. A run longer than `MAX_LEB_BYTES` is
//! malformed; value bits past the target width in the final byte are
//! discarded, per the wire-format convention.

// This module uses `as` casts which have been reviewed for correctness.
#![allow(clippy::as_conversions)]

use bytes::{Buf, BufMut};

use crate::error::DecodeError;

/// Integers that can be encoded as LEB128 varints.
pub trait Leb128: Sized + Copy {
    /// Longest legal encoding of `Self`, in bytes.
    const MAX_LEB_BYTES: usize;

    /// Decode a varint from the front of `data` without bounds checks.
    ///
    /// Returns the decoded value and the number of bytes consumed.
    ///
    /// # Safety
    ///
    /// * __ValidRead__: `data` must be readable for `MAX_LEB_BYTES` bytes,
    ///   or contain a byte with the continuation bit clear before the
    ///   readable region ends.
    unsafe fn decode_leb128_unchecked(data: &[u8]) -> Result<(Self, usize), DecodeError>;

    /// Bounds-checked decode from the front of `data`.
    ///
    /// Returns the decoded value and the number of bytes consumed. Fails
    /// with [`DecodeError::UnexpectedEof`] if the slice ends with the
    /// continuation bit still set and [`DecodeError::InvalidVarint`] if the
    /// run exceeds [`Leb128::MAX_LEB_BYTES`].
    fn decode_leb128(data: &[u8]) -> Result<(Self, usize), DecodeError>;

    /// Bounds-checked decode that advances a buffer cursor.
    fn decode_leb128_buf<B: Buf>(buf: &mut B) -> Result<Self, DecodeError>;

    /// Encode `self` into `buf`, returning the number of bytes written.
    fn encode_leb128<B: BufMut>(self, buf: &mut B) -> usize;

    /// The number of bytes `encode_leb128` will write for this value.
    fn encoded_leb128_len(self) -> usize;
}

macro_rules! impl_leb128 {
    ($ty:ty, $max:expr) => {
        impl Leb128 for $ty {
            const MAX_LEB_BYTES: usize = $max;

            #[inline]
            unsafe fn decode_leb128_unchecked(
                data: &[u8],
            ) -> Result<(Self, usize), DecodeError> {
                let mut value: $ty = 0;
                let mut shift = 0u32;
                for i in 0..Self::MAX_LEB_BYTES {
                    // SAFETY - ValidRead: guaranteed by the caller.
                    let byte = unsafe { *data.get_unchecked(i) };
                    value |= <$ty>::from(byte & 0x7f) << shift;
                    if byte < 0x80 {
                        return Ok((value, i + 1));
                    }
                    shift += 7;
                }
                Err(DecodeError::invalid_varint())
            }

            #[inline]
            fn decode_leb128(data: &[u8]) -> Result<(Self, usize), DecodeError> {
                if data.len() >= Self::MAX_LEB_BYTES {
                    // SAFETY - ValidRead: the slice covers the longest run.
                    return unsafe { Self::decode_leb128_unchecked(data) };
                }
                let mut value: $ty = 0;
                let mut shift = 0u32;
                for (i, &byte) in data.iter().enumerate() {
                    value |= <$ty>::from(byte & 0x7f) << shift;
                    if byte < 0x80 {
                        return Ok((value, i + 1));
                    }
                    shift += 7;
                }
                Err(DecodeError::unexpected_eof())
            }

            #[inline]
            fn decode_leb128_buf<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
                let chunk = buf.chunk();
                if !chunk.is_empty() && (chunk[0] < 0x80 || chunk.len() >= Self::MAX_LEB_BYTES) {
                    let (value, read) = Self::decode_leb128(chunk)?;
                    buf.advance(read);
                    return Ok(value);
                }

                // Slow path: the varint may straddle chunk boundaries.
                let mut value: $ty = 0;
                let mut shift = 0u32;
                for _ in 0..Self::MAX_LEB_BYTES {
                    if !buf.has_remaining() {
                        return Err(DecodeError::unexpected_eof());
                    }
                    let byte = buf.get_u8();
                    value |= <$ty>::from(byte & 0x7f) << shift;
                    if byte < 0x80 {
                        return Ok(value);
                    }
                    shift += 7;
                }
                Err(DecodeError::invalid_varint())
            }

            #[inline]
            fn encode_leb128<B: BufMut>(mut self, buf: &mut B) -> usize {
                let mut written = 0;
                loop {
                    written += 1;
                    let byte = (self & 0x7f) as u8;
                    self >>= 7;
                    if self == 0 {
                        buf.put_u8(byte);
                        return written;
                    }
                    buf.put_u8(byte | 0x80);
                }
            }

            /// ceil(significant_bits / 7), with a minimum of one byte so
            /// that zero still occupies a byte.
            #[inline]
            fn encoded_leb128_len(self) -> usize {
                let bits = <$ty>::BITS - (self | 1).leading_zeros();
                ((bits + 6) / 7) as usize
            }
        }
    };
}

impl_leb128!(u32, 5);
impl_leb128!(u64, 10);

/// Advance `buf` past one varint without decoding it.
///
/// This is the varint skipper: it stops after the first byte with the
/// continuation bit clear, bounded at the longest legal 64-bit run.
#[inline]
pub fn skip_leb128<B: Buf>(buf: &mut B) -> Result<(), DecodeError> {
    for _ in 0..u64::MAX_LEB_BYTES {
        if !buf.has_remaining() {
            return Err(DecodeError::unexpected_eof());
        }
        if buf.get_u8() < 0x80 {
            return Ok(());
        }
    }
    Err(DecodeError::invalid_varint())
}
