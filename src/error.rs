//! Decode and encode failure kinds.
//!
//! Every fallible codec operation short-circuits on the first error from a
//! nested call and propagates it unchanged; there is no partial success.
//! Errors only exist on the checked paths: the `unsafe` unchecked primitives
//! place the burden of validity on the caller instead.

use core::fmt;

/// Why decoding a byte stream failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input view ended before the value did.
    UnexpectedEof,
    /// A varint ran longer than the widest legal encoding.
    InvalidVarint,
    /// A field key carried a wire type value outside `0..=5`.
    InvalidWireType { value: u8 },
    /// A field key carried a field number outside `1..=2^29-1`.
    InvalidFieldNumber,
    /// Wire types 3 and 4 (groups) are not supported.
    GroupsUnsupported,
    /// A known field arrived with a wire type it cannot be decoded from.
    WireTypeMismatch { field: u32, expected: u8, actual: u8 },
    /// A length-delimited payload claimed more bytes than are available.
    LengthOverrun { claimed: usize, available: usize },
    /// A length prefix exceeds the platform's addressable memory.
    LengthOverflow { value: u64 },
    /// A string field held bytes that are not valid UTF-8.
    InvalidUtf8,
}

impl DecodeError {
    #[cold]
    #[inline(never)]
    pub(crate) fn invalid_varint() -> Self {
        DecodeError::InvalidVarint
    }

    #[cold]
    #[inline(never)]
    pub(crate) fn unexpected_eof() -> Self {
        DecodeError::UnexpectedEof
    }

    #[cold]
    #[inline(never)]
    pub(crate) fn length_overrun(claimed: usize, available: usize) -> Self {
        DecodeError::LengthOverrun { claimed, available }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnexpectedEof => {
                write!(f, "unexpected end of buffer")
            }
            DecodeError::InvalidVarint => {
                write!(f, "invalid varint encoding")
            }
            DecodeError::InvalidWireType { value } => {
                write!(f, "invalid wire type value: {value}")
            }
            DecodeError::InvalidFieldNumber => {
                write!(f, "field number out of range")
            }
            DecodeError::GroupsUnsupported => {
                write!(f, "group wire types are not supported")
            }
            DecodeError::WireTypeMismatch {
                field,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "field {field}: expected wire type {expected}, got {actual}"
                )
            }
            DecodeError::LengthOverrun { claimed, available } => {
                write!(
                    f,
                    "length-delimited payload overrun: needed {claimed} bytes, {available} available"
                )
            }
            DecodeError::LengthOverflow { value } => {
                write!(f, "length prefix {value} exceeds addressable memory")
            }
            DecodeError::InvalidUtf8 => {
                write!(f, "invalid UTF-8 in string field")
            }
        }
    }
}

/// Why encoding into a fixed-size buffer failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The output buffer cannot hold the full encoding. Nothing was written.
    BufferTooSmall { required: usize, available: usize },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::BufferTooSmall {
                required,
                available,
            } => {
                write!(
                    f,
                    "output buffer too small: need {required} bytes, have {available}"
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}
