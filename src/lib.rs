//! Type-directed codec for the Protocol Buffers wire format.
//!
//! Values whose shapes are declared as static Rust types are serialized to
//! and deserialized from byte streams that are bit-for-bit interoperable
//! with the protobuf binary encoding (proto2/proto3). The crate is a codec
//! algebra, not a schema compiler: there is no `.proto` front-end, no
//! descriptors, and no I/O beyond contiguous byte buffers.
//!
//! Messages are declared with the [`message!`] macro, which turns a set of
//! `(field number, repetition, type)` triples into a struct plus the codec
//! implementations for it:
//!
//! ```
//! use tagwire::codec::Utf8;
//!
//! tagwire::message! {
//!     pub struct Student {
//!         1 => singular id: u32,
//!         3 => singular name: Utf8,
//!     }
//! }
//!
//! let student = Student { id: 456, name: Utf8::from("tom") };
//! let mut buf = [0u8; 16];
//! let written = tagwire::encode_message_to_slice(&student, &mut buf).unwrap();
//! let decoded: Student = tagwire::decode_message_from_slice(&buf[..written]).unwrap();
//! assert_eq!(decoded, student);
//! ```

#![no_std]
#![deny(clippy::as_conversions)]

// `bytes` requires an allocator even without `std`, so there is no
// allocator-free configuration to gate on.
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod buffer;
pub mod codec;
pub mod error;
pub mod leb128;
pub mod wire;

mod util;

pub use buffer::{
    decode_from_slice, decode_message_from_slice, encode_message_to_slice, encode_to_slice,
};
pub use error::{DecodeError, EncodeError};

/// Support items referenced by `message!` expansions. Not public API.
#[doc(hidden)]
pub mod __private {
    pub use alloc::collections::BTreeMap;
    pub use alloc::vec::Vec;
    pub use bytes;
}
