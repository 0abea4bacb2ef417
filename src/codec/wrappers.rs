//! Wrapper type support (`Option`, `Box`).

use alloc::boxed::Box;

use bytes::{Buf, BufMut};

use super::{Decode, Encode, IsDefault, Skip, Wired};
use crate::error::DecodeError;
use crate::wire::WireType;

// `Option<T>` models explicit presence: `None` is never encoded, and any
// occurrence on the wire makes the slot `Some`.

impl<T: Wired> Wired for Option<T> {
    const WIRE_TYPE: WireType = T::WIRE_TYPE;
}

impl<T: Decode> Decode for Option<T> {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        let mut value = T::default();
        T::decode_into(buf, &mut value)?;
        *dst = Some(value);
        Ok(())
    }
}

impl<T: Encode> Encode for Option<T> {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        if let Some(value) = self {
            value.encode(buf);
        }
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        match self {
            Some(value) => value.encoded_len(),
            None => 0,
        }
    }
}

impl<T: Skip> Skip for Option<T> {
    #[inline]
    fn decode_skip<B: Buf>(buf: &mut B) -> Result<(), DecodeError> {
        T::decode_skip(buf)
    }
}

impl<T> IsDefault for Option<T> {
    #[inline]
    fn is_default(&self) -> bool {
        self.is_none()
    }
}

// `Box<T>` is the indirection for recursive message types; the codec is
// oblivious to it.

impl<T: Wired> Wired for Box<T> {
    const WIRE_TYPE: WireType = T::WIRE_TYPE;
}

impl<T: Decode> Decode for Box<T> {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        T::decode_into(buf, dst.as_mut())
    }
}

impl<T: Encode> Encode for Box<T> {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.as_ref().encode(buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        self.as_ref().encoded_len()
    }
}

impl<T: Skip> Skip for Box<T> {
    #[inline]
    fn decode_skip<B: Buf>(buf: &mut B) -> Result<(), DecodeError> {
        T::decode_skip(buf)
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::codec::Utf8;

    #[test]
    fn test_option_none_encodes_nothing() {
        let opt: Option<i32> = None;
        let mut buf = Vec::new();
        opt.encode(&mut buf);
        assert!(buf.is_empty());
        assert_eq!(opt.encoded_len(), 0);
        assert!(opt.is_default());
    }

    #[test]
    fn test_option_some_roundtrip() {
        let opt: Option<i32> = Some(150);
        let mut buf = Vec::new();
        opt.encode(&mut buf);
        assert_eq!(buf, vec![0x96, 0x01]);
        assert_eq!(opt.encoded_len(), 2);

        let mut view = &buf[..];
        let decoded = Option::<i32>::decode(&mut view).unwrap();
        assert_eq!(decoded, Some(150));
    }

    #[test]
    fn test_option_string() {
        let buf = [5, b'h', b'e', b'l', b'l', b'o'];
        let mut view = &buf[..];
        let decoded = Option::<Utf8>::decode(&mut view).unwrap();
        assert_eq!(decoded.as_deref(), Some("hello"));
    }

    #[test]
    fn test_box_roundtrip() {
        let boxed: Box<u64> = Box::new(300);
        let mut buf = Vec::new();
        boxed.encode(&mut buf);
        assert_eq!(buf.len(), boxed.encoded_len());

        let mut view = &buf[..];
        let decoded = Box::<u64>::decode(&mut view).unwrap();
        assert_eq!(*decoded, 300);
    }
}
