//! Map fields.
//!
//! A protobuf map is syntactic sugar for a repeated entry message with
//! `1 = key` and `2 = value`. Each entry is one length-delimited record;
//! duplicate keys keep the last value, and a missing key or value falls
//! back to the type's default.

use alloc::collections::BTreeMap;

#[cfg(feature = "std")]
use core::hash::Hash;
#[cfg(feature = "std")]
use std::collections::HashMap;

use bytes::{Buf, BufMut};

use super::{Decode, Encode, Wired};
use crate::error::DecodeError;
use crate::leb128::Leb128;
use crate::util::CastFrom;
use crate::wire::{self, WireType};

/// Marker for types that may be used as map keys.
///
/// The wire format restricts keys to integral types, bool, and strings;
/// floats, bytes, enums, and messages are not allowed.
pub trait MapKey: Wired + Encode + Decode + Clone {}

impl MapKey for u32 {}
impl MapKey for u64 {}
impl MapKey for i32 {}
impl MapKey for i64 {}
impl MapKey for bool {}
impl MapKey for super::Sint32 {}
impl MapKey for super::Sint64 {}
impl MapKey for super::Fixed32 {}
impl MapKey for super::Fixed64 {}
impl MapKey for super::Sfixed32 {}
impl MapKey for super::Sfixed64 {}
impl MapKey for super::Utf8 {}
impl MapKey for alloc::string::String {}

/// Field-level operations for map storage.
pub trait MapField: Default {
    /// Decode one length-delimited entry and insert it. Duplicate keys keep
    /// the last value.
    fn decode_entry<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError>;

    /// Encode all entries with their field keys.
    fn encode_map<B: BufMut>(&self, number: u32, buf: &mut B);

    /// Total encoded length including field keys.
    fn encoded_map_len(&self, number: u32) -> usize;

    /// Number of entries.
    fn map_len(&self) -> usize;

    /// True if the map has no entries.
    fn is_map_empty(&self) -> bool {
        self.map_len() == 0
    }
}

/// Decode one map entry: `len || [key record] [value record]`.
fn decode_map_entry<K, V, B>(buf: &mut B) -> Result<(K, V), DecodeError>
where
    K: MapKey + Default,
    V: Wired + Decode,
    B: Buf,
{
    let entry_len = wire::decode_len(buf)?;
    if buf.remaining() < entry_len {
        return Err(DecodeError::length_overrun(entry_len, buf.remaining()));
    }
    let entry = buf.copy_to_bytes(entry_len);
    let mut entry_buf = &entry[..];

    let mut key = K::default();
    let mut value = V::default();

    while entry_buf.has_remaining() {
        let (wire_type, number) = wire::decode_key(&mut entry_buf)?.into_parts();
        match number {
            1 => {
                if wire_type != K::WIRE_TYPE {
                    return Err(DecodeError::WireTypeMismatch {
                        field: 1,
                        expected: K::WIRE_TYPE.into_val(),
                        actual: wire_type.into_val(),
                    });
                }
                K::decode_into(&mut entry_buf, &mut key)?;
            }
            2 => {
                if wire_type != V::WIRE_TYPE {
                    return Err(DecodeError::WireTypeMismatch {
                        field: 2,
                        expected: V::WIRE_TYPE.into_val(),
                        actual: wire_type.into_val(),
                    });
                }
                V::decode_into(&mut entry_buf, &mut value)?;
            }
            _ => wire::skip_value(wire_type, &mut entry_buf)?,
        }
    }

    Ok((key, value))
}

fn entry_body_len<K, V>(key: &K, value: &V) -> usize
where
    K: MapKey,
    V: Wired + Encode,
{
    wire::encoded_key_len(1) + key.encoded_len() + wire::encoded_key_len(2) + value.encoded_len()
}

fn encode_map_entry<K, V, B>(key: &K, value: &V, number: u32, buf: &mut B)
where
    K: MapKey,
    V: Wired + Encode,
    B: BufMut,
{
    wire::encode_key(WireType::Len, number, buf);
    u64::cast_from(entry_body_len(key, value)).encode_leb128(buf);
    wire::encode_key(K::WIRE_TYPE, 1, buf);
    key.encode(buf);
    wire::encode_key(V::WIRE_TYPE, 2, buf);
    value.encode(buf);
}

fn encoded_map_entry_len<K, V>(key: &K, value: &V, number: u32) -> usize
where
    K: MapKey,
    V: Wired + Encode,
{
    let body = entry_body_len(key, value);
    wire::encoded_key_len(number) + u64::cast_from(body).encoded_leb128_len() + body
}

impl<K, V> MapField for BTreeMap<K, V>
where
    K: MapKey + Default + Ord,
    V: Wired + Encode + Decode,
{
    fn decode_entry<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        let (key, value) = decode_map_entry::<K, V, B>(buf)?;
        self.insert(key, value);
        Ok(())
    }

    fn encode_map<B: BufMut>(&self, number: u32, buf: &mut B) {
        for (key, value) in self {
            encode_map_entry(key, value, number, buf);
        }
    }

    fn encoded_map_len(&self, number: u32) -> usize {
        self.iter()
            .map(|(key, value)| encoded_map_entry_len(key, value, number))
            .sum()
    }

    fn map_len(&self) -> usize {
        self.len()
    }
}

#[cfg(feature = "std")]
impl<K, V> MapField for HashMap<K, V>
where
    K: MapKey + Default + Eq + Hash,
    V: Wired + Encode + Decode,
{
    fn decode_entry<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        let (key, value) = decode_map_entry::<K, V, B>(buf)?;
        self.insert(key, value);
        Ok(())
    }

    fn encode_map<B: BufMut>(&self, number: u32, buf: &mut B) {
        for (key, value) in self {
            encode_map_entry(key, value, number, buf);
        }
    }

    fn encoded_map_len(&self, number: u32) -> usize {
        self.iter()
            .map(|(key, value)| encoded_map_entry_len(key, value, number))
            .sum()
    }

    fn map_len(&self) -> usize {
        self.len()
    }
}
