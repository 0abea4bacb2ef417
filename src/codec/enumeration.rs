//! Enumeration codec.
//!
//! Protobuf enums travel as the varint of their underlying `i32` value.
//! Decoding must keep values that the local schema has no name for, so the
//! conversion trait is total in both directions: receivers carry unknown
//! discriminants forward instead of dropping them.

// This module uses `as` casts which have been reviewed for correctness.
#![allow(clippy::as_conversions)]

use bytes::{Buf, BufMut};

use super::{Decode, Encode, IsDefault, Scalar, Skip, Wired};
use crate::error::DecodeError;
use crate::leb128::{skip_leb128, Leb128};
use crate::wire::WireType;

/// An open enumeration: total conversions to and from the underlying `i32`.
///
/// `from_repr` must accept *any* value, including discriminants this
/// revision of the schema does not name; the usual shape is a catch-all
/// variant holding the raw value.
///
/// ```
/// use tagwire::codec::OpenEnum;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Corpus {
///     Universal,
///     Web,
///     Unrecognized(i32),
/// }
///
/// impl OpenEnum for Corpus {
///     fn from_repr(repr: i32) -> Self {
///         match repr {
///             0 => Corpus::Universal,
///             1 => Corpus::Web,
///             other => Corpus::Unrecognized(other),
///         }
///     }
///
///     fn into_repr(self) -> i32 {
///         match self {
///             Corpus::Universal => 0,
///             Corpus::Web => 1,
///             Corpus::Unrecognized(other) => other,
///         }
///     }
/// }
/// ```
pub trait OpenEnum: Copy {
    /// Convert from the wire value. Total: unknown values are preserved.
    fn from_repr(repr: i32) -> Self;

    /// Convert to the wire value.
    fn into_repr(self) -> i32;
}

/// Field wrapper adapting an [`OpenEnum`] to the codec traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Enumeration<E>(pub E);

impl<E: OpenEnum> Default for Enumeration<E> {
    fn default() -> Self {
        Enumeration(E::from_repr(0))
    }
}

impl<E: OpenEnum> Wired for Enumeration<E> {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl<E: OpenEnum> Decode for Enumeration<E> {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        // Like int32: the value travels sign-extended to 64 bits.
        let repr = u64::decode_leb128_buf(buf)? as i32;
        *dst = Enumeration(E::from_repr(repr));
        Ok(())
    }
}

impl<E: OpenEnum> Encode for Enumeration<E> {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        (self.0.into_repr() as i64 as u64).encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        (self.0.into_repr() as i64 as u64).encoded_leb128_len()
    }
}

impl<E: OpenEnum> Skip for Enumeration<E> {
    #[inline]
    fn decode_skip<B: Buf>(buf: &mut B) -> Result<(), DecodeError> {
        skip_leb128(buf)
    }
}

impl<E: OpenEnum> IsDefault for Enumeration<E> {
    #[inline]
    fn is_default(&self) -> bool {
        self.0.into_repr() == 0
    }
}

impl<E: OpenEnum> Scalar for Enumeration<E> {}
