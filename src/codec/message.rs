//! Message composition.
//!
//! A message is a record whose fields are encoded in declaration order and
//! decoded by a tag-dispatch loop: read a key, match the field number,
//! decode into the matching slot or skip the payload by wire type. The
//! [`message!`] macro turns a declarative field list into that loop.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::DecodeError;
use crate::leb128::Leb128;
use crate::util::CastFrom;
use crate::wire;

/// A protobuf message type.
///
/// Implementations are normally generated by [`message!`]; the methods
/// operate on the message *body*, without the length prefix used when the
/// message is embedded in another. The embedded framing lives in the
/// [`decode_embedded`]/[`encode_embedded`] helpers and the blanket
/// [`Encode`](super::Encode)/[`Decode`](super::Decode) impls the macro
/// emits.
pub trait Message: Default {
    /// Decode a message body into `dst`, consuming the whole buffer.
    fn decode_message_into(buf: Bytes, dst: &mut Self) -> Result<(), DecodeError>;

    /// Decode a message body, consuming the whole buffer.
    fn decode_message(buf: Bytes) -> Result<Self, DecodeError> {
        let mut value = Self::default();
        Self::decode_message_into(buf, &mut value)?;
        Ok(value)
    }

    /// Encode the message body.
    fn encode_message<B: BufMut>(&self, buf: &mut B);

    /// Encoded length of the message body.
    fn encoded_message_len(&self) -> usize;
}

/// Decode a length-delimited embedded message into `dst`.
///
/// The previous contents of `dst` are discarded: duplicate occurrences of a
/// singular message field keep the last value.
#[inline]
pub fn decode_embedded_into<M: Message, B: Buf>(
    buf: &mut B,
    dst: &mut M,
) -> Result<(), DecodeError> {
    let len = wire::decode_len(buf)?;
    if buf.remaining() < len {
        return Err(DecodeError::length_overrun(len, buf.remaining()));
    }
    let body = buf.copy_to_bytes(len);
    *dst = M::default();
    M::decode_message_into(body, dst)
}

/// Decode a length-delimited embedded message.
#[inline]
pub fn decode_embedded<M: Message, B: Buf>(buf: &mut B) -> Result<M, DecodeError> {
    let mut value = M::default();
    decode_embedded_into(buf, &mut value)?;
    Ok(value)
}

/// Encode a message as a length-delimited field payload.
#[inline]
pub fn encode_embedded<M: Message, B: BufMut>(msg: &M, buf: &mut B) {
    let body_len = msg.encoded_message_len();
    u64::cast_from(body_len).encode_leb128(buf);
    msg.encode_message(buf);
}

/// Encoded length of a message as a length-delimited field payload.
#[inline]
pub fn embedded_len<M: Message>(msg: &M) -> usize {
    let body_len = msg.encoded_message_len();
    u64::cast_from(body_len).encoded_leb128_len() + body_len
}

/// Advance past one length-delimited payload without decoding it.
///
/// This is the skipper for embedded messages, strings, bytes, and packed
/// blocks alike: read the prefix, step over exactly that many bytes.
#[inline]
pub fn skip_embedded<B: Buf>(buf: &mut B) -> Result<(), DecodeError> {
    let len = wire::decode_len(buf)?;
    if buf.remaining() < len {
        return Err(DecodeError::length_overrun(len, buf.remaining()));
    }
    buf.advance(len);
    Ok(())
}

/// Raw capture of fields a message's schema does not declare.
///
/// Decoders drop unknown fields unless the message opts in by declaring an
/// `@unknown` slot; the captured `key || value` bytes are re-emitted
/// verbatim after the declared fields, which makes decode→encode lossless
/// across schema revisions.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UnknownFields {
    raw: BytesMut,
}

impl UnknownFields {
    /// True if nothing was captured.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Total captured bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.raw.len()
    }

    /// The captured records, keys included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Drop everything captured so far.
    #[inline]
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Append one raw `key || value` record. Called from generated decode
    /// loops.
    #[inline]
    pub fn append_raw(&mut self, record: &[u8]) {
        self.raw.extend_from_slice(record);
    }
}

impl core::fmt::Debug for UnknownFields {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UnknownFields")
            .field("byte_len", &self.raw.len())
            .finish()
    }
}

/// Declares a protobuf message struct and derives its codec.
///
/// Each field is `number => kind name: Type,` where `kind` is one of:
///
/// * `singular` — proto3 scalar semantics: the field is omitted when it
///   holds the type's zero value, and decoding overwrites (last wins).
/// * `optional` — explicit presence; stored as `Option<Type>`, encoded
///   only when `Some`. Embedded message fields use this kind.
/// * `repeated` — stored as `Vec<Type>`, one key per element on encode,
///   tolerant of packed input on decode.
/// * `packed` — stored as [`Packed<Type>`](crate::codec::Packed), encoded
///   as a single length-delimited block, tolerant of unpacked input.
/// * `map` — stored as the declared map type (`BTreeMap<K, V>`, or
///   `HashMap<K, V>` with `std`), encoded as repeated key/value entries.
///
/// A trailing `@unknown name,` slot opts the message into unknown-field
/// retention.
///
/// Field numbers are checked against the legal range (and the reserved
/// 19000–19999 band) at compile time. Duplicate numbers within one message
/// are a bug; the decoder dispatches to the first match.
///
/// ```
/// use tagwire::codec::{Message, Utf8};
///
/// tagwire::message! {
///     /// A register of students.
///     pub struct Class {
///         8 => singular name: Utf8,
///         3 => repeated students: Student,
///     }
/// }
///
/// tagwire::message! {
///     pub struct Student {
///         1 => singular id: u32,
///         3 => singular name: Utf8,
///     }
/// }
///
/// let class = Class {
///     name: Utf8::from("class 101"),
///     students: vec![Student { id: 456, name: Utf8::from("tom") }],
/// };
/// let mut buf = Vec::new();
/// class.encode_message(&mut buf);
/// assert_eq!(buf.len(), class.encoded_message_len());
/// ```
#[macro_export]
macro_rules! message {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $number:literal => $kind:ident $fname:ident : $fty:ty, )+
            $( @unknown $ufield:ident, )?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $( pub $fname: $crate::message!(@storage $kind, $fty), )+
            $(
                /// Raw records of fields this schema does not declare.
                pub $ufield: $crate::codec::UnknownFields,
            )?
        }

        const _: () = {
            $(
                assert!(
                    $crate::wire::field_number_is_valid($number),
                    concat!(
                        "illegal field number on `",
                        stringify!($name), ".", stringify!($fname), "`",
                    ),
                );
            )+
        };

        impl $crate::codec::Wired for $name {
            const WIRE_TYPE: $crate::wire::WireType = $crate::wire::WireType::Len;
        }

        impl $crate::codec::Encode for $name {
            #[inline]
            fn encode<B: $crate::__private::bytes::BufMut>(&self, buf: &mut B) {
                $crate::codec::encode_embedded(self, buf);
            }

            #[inline]
            fn encoded_len(&self) -> usize {
                $crate::codec::embedded_len(self)
            }
        }

        impl $crate::codec::Decode for $name {
            #[inline]
            fn decode_into<B: $crate::__private::bytes::Buf>(
                buf: &mut B,
                dst: &mut Self,
            ) -> ::core::result::Result<(), $crate::DecodeError> {
                $crate::codec::decode_embedded_into(buf, dst)
            }
        }

        impl $crate::codec::Skip for $name {
            #[inline]
            fn decode_skip<B: $crate::__private::bytes::Buf>(
                buf: &mut B,
            ) -> ::core::result::Result<(), $crate::DecodeError> {
                $crate::codec::skip_embedded(buf)
            }
        }

        impl $crate::codec::Message for $name {
            fn decode_message_into(
                buf: $crate::__private::bytes::Bytes,
                dst: &mut Self,
            ) -> ::core::result::Result<(), $crate::DecodeError> {
                use $crate::__private::bytes::Buf as _;

                let _full = buf.clone();
                let original_len = buf.len();
                let mut buf = buf;

                while buf.has_remaining() {
                    let _key_start = original_len - buf.remaining();
                    let key = $crate::wire::decode_key(&mut buf)?;
                    let (wire_type, number) = key.into_parts();
                    match number {
                        $(
                            $number => $crate::message!(
                                @decode $kind, $number, dst, buf, wire_type, $fname, $fty
                            ),
                        )+
                        _ => {
                            $crate::wire::skip_value(wire_type, &mut buf)?;
                            $(
                                dst.$ufield.append_raw(
                                    &_full[_key_start..original_len - buf.remaining()],
                                );
                            )?
                        }
                    }
                }
                ::core::result::Result::Ok(())
            }

            fn encode_message<B: $crate::__private::bytes::BufMut>(&self, buf: &mut B) {
                $( $crate::message!(@encode $kind, $number, self, buf, $fname, $fty); )+
                $( $crate::__private::bytes::BufMut::put_slice(buf, self.$ufield.as_bytes()); )?
            }

            fn encoded_message_len(&self) -> usize {
                let mut len = 0usize;
                $( len += $crate::message!(@field_len $kind, $number, self, $fname, $fty); )+
                $( len += self.$ufield.byte_len(); )?
                len
            }
        }
    };

    // ---- storage types -------------------------------------------------

    (@storage singular, $fty:ty) => { $fty };
    (@storage optional, $fty:ty) => { ::core::option::Option<$fty> };
    (@storage repeated, $fty:ty) => { $crate::__private::Vec<$fty> };
    (@storage packed, $fty:ty) => { $crate::codec::Packed<$fty> };
    (@storage map, $fty:ty) => { $fty };

    // ---- decode arms ---------------------------------------------------

    (@decode singular, $number:literal, $dst:ident, $buf:ident, $wire_type:ident, $fname:ident, $fty:ty) => {{
        if $wire_type != <$fty as $crate::codec::Wired>::WIRE_TYPE {
            return ::core::result::Result::Err($crate::DecodeError::WireTypeMismatch {
                field: $number,
                expected: <$fty as $crate::codec::Wired>::WIRE_TYPE.into_val(),
                actual: $wire_type.into_val(),
            });
        }
        <$fty as $crate::codec::Decode>::decode_into(&mut $buf, &mut $dst.$fname)?;
    }};
    (@decode optional, $number:literal, $dst:ident, $buf:ident, $wire_type:ident, $fname:ident, $fty:ty) => {{
        if $wire_type != <$fty as $crate::codec::Wired>::WIRE_TYPE {
            return ::core::result::Result::Err($crate::DecodeError::WireTypeMismatch {
                field: $number,
                expected: <$fty as $crate::codec::Wired>::WIRE_TYPE.into_val(),
                actual: $wire_type.into_val(),
            });
        }
        <::core::option::Option<$fty> as $crate::codec::Decode>::decode_into(
            &mut $buf,
            &mut $dst.$fname,
        )?;
    }};
    (@decode repeated, $number:literal, $dst:ident, $buf:ident, $wire_type:ident, $fname:ident, $fty:ty) => {{
        if $wire_type != <$fty as $crate::codec::Wired>::WIRE_TYPE
            && $wire_type != $crate::wire::WireType::Len
        {
            return ::core::result::Result::Err($crate::DecodeError::WireTypeMismatch {
                field: $number,
                expected: <$fty as $crate::codec::Wired>::WIRE_TYPE.into_val(),
                actual: $wire_type.into_val(),
            });
        }
        $crate::codec::decode_repeated_into::<$fty, _>($wire_type, &mut $buf, &mut $dst.$fname)?;
    }};
    (@decode packed, $number:literal, $dst:ident, $buf:ident, $wire_type:ident, $fname:ident, $fty:ty) => {{
        if $wire_type != $crate::wire::WireType::Len
            && $wire_type != <$fty as $crate::codec::Wired>::WIRE_TYPE
        {
            return ::core::result::Result::Err($crate::DecodeError::WireTypeMismatch {
                field: $number,
                expected: $crate::wire::WireType::Len.into_val(),
                actual: $wire_type.into_val(),
            });
        }
        $crate::codec::decode_packed_into::<$fty, _>($wire_type, &mut $buf, &mut $dst.$fname)?;
    }};
    (@decode map, $number:literal, $dst:ident, $buf:ident, $wire_type:ident, $fname:ident, $fty:ty) => {{
        if $wire_type != $crate::wire::WireType::Len {
            return ::core::result::Result::Err($crate::DecodeError::WireTypeMismatch {
                field: $number,
                expected: $crate::wire::WireType::Len.into_val(),
                actual: $wire_type.into_val(),
            });
        }
        <$fty as $crate::codec::MapField>::decode_entry(&mut $dst.$fname, &mut $buf)?;
    }};

    // ---- encode statements ---------------------------------------------

    (@encode singular, $number:literal, $slf:ident, $buf:ident, $fname:ident, $fty:ty) => {
        if !$crate::codec::IsDefault::is_default(&$slf.$fname) {
            $crate::wire::encode_key(
                <$fty as $crate::codec::Wired>::WIRE_TYPE,
                $number,
                $buf,
            );
            <$fty as $crate::codec::Encode>::encode(&$slf.$fname, $buf);
        }
    };
    (@encode optional, $number:literal, $slf:ident, $buf:ident, $fname:ident, $fty:ty) => {
        if let ::core::option::Option::Some(value) = &$slf.$fname {
            $crate::wire::encode_key(
                <$fty as $crate::codec::Wired>::WIRE_TYPE,
                $number,
                $buf,
            );
            <$fty as $crate::codec::Encode>::encode(value, $buf);
        }
    };
    (@encode repeated, $number:literal, $slf:ident, $buf:ident, $fname:ident, $fty:ty) => {
        $crate::codec::RepeatedField::encode_repeated(&$slf.$fname, $number, $buf);
    };
    (@encode packed, $number:literal, $slf:ident, $buf:ident, $fname:ident, $fty:ty) => {
        if !$slf.$fname.is_empty() {
            $crate::wire::encode_key($crate::wire::WireType::Len, $number, $buf);
            <$crate::codec::Packed<$fty> as $crate::codec::Encode>::encode(&$slf.$fname, $buf);
        }
    };
    (@encode map, $number:literal, $slf:ident, $buf:ident, $fname:ident, $fty:ty) => {
        <$fty as $crate::codec::MapField>::encode_map(&$slf.$fname, $number, $buf);
    };

    // ---- length terms --------------------------------------------------

    (@field_len singular, $number:literal, $slf:ident, $fname:ident, $fty:ty) => {
        if $crate::codec::IsDefault::is_default(&$slf.$fname) {
            0
        } else {
            $crate::wire::encoded_key_len($number)
                + <$fty as $crate::codec::Encode>::encoded_len(&$slf.$fname)
        }
    };
    (@field_len optional, $number:literal, $slf:ident, $fname:ident, $fty:ty) => {
        match &$slf.$fname {
            ::core::option::Option::Some(value) => {
                $crate::wire::encoded_key_len($number)
                    + <$fty as $crate::codec::Encode>::encoded_len(value)
            }
            ::core::option::Option::None => 0,
        }
    };
    (@field_len repeated, $number:literal, $slf:ident, $fname:ident, $fty:ty) => {
        $crate::codec::RepeatedField::encoded_repeated_len(&$slf.$fname, $number)
    };
    (@field_len packed, $number:literal, $slf:ident, $fname:ident, $fty:ty) => {
        if $slf.$fname.is_empty() {
            0
        } else {
            $crate::wire::encoded_key_len($number)
                + <$crate::codec::Packed<$fty> as $crate::codec::Encode>::encoded_len(&$slf.$fname)
        }
    };
    (@field_len map, $number:literal, $slf:ident, $fname:ident, $fty:ty) => {
        <$fty as $crate::codec::MapField>::encoded_map_len(&$slf.$fname, $number)
    };
}
