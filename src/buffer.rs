//! Checked entry points over caller-owned byte slices.
//!
//! Growable buffers (`Vec<u8>`, `BytesMut`) never run out of room, so the
//! [`Encode`](crate::codec::Encode) trait itself is infallible. These
//! helpers are the fixed-buffer surface: capacity is verified against the
//! value's encoded length *before* a single byte is written, so a failed
//! encode leaves the buffer untouched.

use bytes::Bytes;

use crate::codec::{Decode, Encode, Message};
use crate::error::{DecodeError, EncodeError};

/// Encode a value into a fixed buffer, returning the bytes written.
///
/// Fails without writing anything if the buffer cannot hold the full
/// encoding.
pub fn encode_to_slice<T: Encode>(value: &T, buf: &mut [u8]) -> Result<usize, EncodeError> {
    let required = value.encoded_len();
    if required > buf.len() {
        return Err(EncodeError::BufferTooSmall {
            required,
            available: buf.len(),
        });
    }
    let mut cursor = buf;
    value.encode(&mut cursor);
    Ok(required)
}

/// Decode a value from the front of a slice, returning it along with the
/// number of bytes consumed.
pub fn decode_from_slice<T: Decode>(mut buf: &[u8]) -> Result<(T, usize), DecodeError> {
    let total = buf.len();
    let value = T::decode(&mut buf)?;
    Ok((value, total - buf.len()))
}

/// Encode a message body into a fixed buffer, returning the bytes written.
///
/// This is the top-level form, without the length prefix used for embedded
/// messages. Fails without writing anything if the buffer is too small.
pub fn encode_message_to_slice<M: Message>(msg: &M, buf: &mut [u8]) -> Result<usize, EncodeError> {
    let required = msg.encoded_message_len();
    if required > buf.len() {
        return Err(EncodeError::BufferTooSmall {
            required,
            available: buf.len(),
        });
    }
    let mut cursor = buf;
    msg.encode_message(&mut cursor);
    Ok(required)
}

/// Decode a message body from a slice, consuming all of it.
pub fn decode_message_from_slice<M: Message>(buf: &[u8]) -> Result<M, DecodeError> {
    M::decode_message(Bytes::copy_from_slice(buf))
}
