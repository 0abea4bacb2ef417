//! Encoding and decoding primitives for the protobuf wire format.
//!
//! Every value type that can appear in a message implements a small algebra
//! of traits: [`Wired`] names the wire category, [`Encode`] and [`Decode`]
//! move values across the wire, and [`Skip`] is the codec's skipper
//! companion, able to advance past an encoded value without materializing
//! it. Skippers are deliberately separate from decoders so unknown fields
//! can be stepped over without knowing their payload type.

mod delimited;
mod enumeration;
mod map;
mod message;
mod packed;
mod repeated;
mod scalar;
mod wrappers;

use bytes::{Buf, BufMut};

use crate::error::DecodeError;
use crate::wire::WireType;

/// A type with a static wire category.
pub trait Wired {
    /// The wire type used to frame this type's payload.
    const WIRE_TYPE: WireType;
}

/// A type that can be encoded to protobuf wire format.
pub trait Encode: Wired {
    /// Encode this value to the buffer.
    ///
    /// Growable buffers make this infallible; for fixed buffers, check
    /// capacity against [`Encode::encoded_len`] first (see
    /// [`crate::encode_to_slice`]).
    fn encode<B: BufMut>(&self, buf: &mut B);

    /// Returns the number of bytes `encode` will write, not including any
    /// field key. This doubles as the encode-side skip: it is how composite
    /// codecs compute length prefixes without a scratch buffer.
    fn encoded_len(&self) -> usize;
}

/// A type that can be decoded from protobuf wire format.
///
/// `decode_into` follows protobuf merging semantics:
/// - Scalars: last value wins (overwrite)
/// - Repeated fields: append
/// - Embedded messages: replaced wholesale (last value wins)
pub trait Decode: Wired + Default {
    /// Decode from the buffer into `dst`. The buffer is positioned at the
    /// value, after the field key.
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError>;

    /// Decode a fresh value from the buffer.
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let mut value = Self::default();
        Self::decode_into(buf, &mut value)?;
        Ok(value)
    }
}

/// Skipper companion: advance a cursor past one encoded value of this type
/// without building the value.
pub trait Skip: Wired {
    fn decode_skip<B: Buf>(buf: &mut B) -> Result<(), DecodeError>;
}

/// Proto3 zero-value test.
///
/// Singular scalar fields holding their default value are omitted from the
/// encoding entirely; this trait backs that check without constructing a
/// temporary default for comparison.
pub trait IsDefault {
    fn is_default(&self) -> bool;
}

// Re-export scalar types.
pub use scalar::{Fixed32, Fixed64, Scalar, Sfixed32, Sfixed64, Sint32, Sint64};

// Re-export length-delimited types.
pub use delimited::{Blob, Utf8};

// Re-export enumeration support.
pub use enumeration::{Enumeration, OpenEnum};

// Re-export repetition support.
pub use packed::{decode_packed_into, Packed};
pub use repeated::{decode_repeated_into, RepeatedField};

// Re-export message types and helpers.
pub use message::{
    decode_embedded, decode_embedded_into, embedded_len, encode_embedded, skip_embedded, Message,
    UnknownFields,
};

// Re-export map support.
pub use map::{MapField, MapKey};
