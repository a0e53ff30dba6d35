//! Runtime support for codecs produced by `wiregen`.
//!
//! Generated code implements [`WireCodec`] for each schema type. The
//! three required methods mirror the three generated routines:
//!
//! - [`WireCodec::wire_len`] — exact encoded size, used to size a buffer
//! - [`WireCodec::encode`] — write the value at a [`Writer`]'s cursor
//! - [`WireCodec::decode`] — rebuild a value from a [`Reader`]'s cursor
//!
//! The provided methods wrap them into the usual three-phase protocol:
//! size, encode into exactly that many bytes, decode.
//!
//! # Wire format
//!
//! ```text
//! integers   fixed width, active byte order
//! bool       1 byte (0/1)
//! f32/f64    raw in-memory layout (see [`raw`])
//! text       u32 length + UTF-8 bytes
//! Vec / map  u32 count + elements (maps: key, value, key, value, ...)
//! [T; N]     N elements, no prefix
//! nested     the nested type's own encoding, no framing
//! ```

mod cursor;
mod error;
pub mod raw;

pub use cursor::{Reader, Writer};
pub use error::WireError;
pub use raw::{Complex32, Complex64};

use std::fmt;

/// Size of every text length and collection count prefix.
pub const LEN_PREFIX: usize = 4;

/// Byte-order policy for multi-byte integers and length prefixes.
///
/// Applied uniformly within one encode or decode call. Raw-layout
/// scalars (floats, complex numbers) are not affected by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    /// Most significant byte first. Matches the shift-based encoding
    /// `[(v >> 24) as u8, (v >> 16) as u8, (v >> 8) as u8, v as u8]`.
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

impl ByteOrder {
    /// The byte order of the host.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Big => write!(f, "big-endian"),
            Self::Little => write!(f, "little-endian"),
        }
    }
}

/// The capability every generated type provides.
///
/// Nested named types are never inlined by the generator: a field of type
/// `Header` is encoded by calling `Header`'s own `WireCodec` impl at the
/// current cursor position.
pub trait WireCodec: Sized {
    /// Exact number of bytes [`encode`](Self::encode) writes for `self`.
    fn wire_len(&self) -> usize;

    /// Writes `self` at the writer's cursor.
    ///
    /// # Errors
    /// [`WireError::BufferTooSmall`] if the writer has fewer than
    /// `wire_len()` bytes left.
    fn encode(&self, w: &mut Writer<'_>) -> Result<(), WireError>;

    /// Reads one value from the reader's cursor, leaving the rest unread.
    fn decode(r: &mut Reader<'_>) -> Result<Self, WireError>;

    /// Encodes into the front of `buf`, returning the bytes written.
    fn encode_into(&self, buf: &mut [u8], order: ByteOrder) -> Result<usize, WireError> {
        let mut w = Writer::new(buf, order);
        self.encode(&mut w)?;
        Ok(w.position())
    }

    /// Encodes into a freshly allocated buffer of exactly `wire_len()` bytes.
    fn to_vec(&self, order: ByteOrder) -> Result<Vec<u8>, WireError> {
        let mut buf = vec![0u8; self.wire_len()];
        let written = self.encode_into(&mut buf, order)?;
        debug_assert_eq!(written, buf.len(), "wire_len disagrees with encode");
        Ok(buf)
    }

    /// Decodes a value from the front of `buf` and returns the remainder.
    fn decode_prefix(buf: &[u8], order: ByteOrder) -> Result<(Self, &[u8]), WireError> {
        let mut r = Reader::new(buf, order);
        let value = Self::decode(&mut r)?;
        Ok((value, r.rest()))
    }

    /// Decodes a value that must span all of `buf`.
    fn from_slice(buf: &[u8], order: ByteOrder) -> Result<Self, WireError> {
        let (value, rest) = Self::decode_prefix(buf, order)?;
        if !rest.is_empty() {
            return Err(WireError::TrailingBytes(rest.len()));
        }
        Ok(value)
    }
}

/// Builds a fixed-size array by decoding exactly `N` elements in order.
///
/// Used by generated decoders for `[T; N]` fields.
pub fn try_array<T, const N: usize>(
    mut decode_one: impl FnMut() -> Result<T, WireError>,
) -> Result<[T; N], WireError> {
    let mut items = Vec::with_capacity(N);
    for _ in 0..N {
        items.push(decode_one()?);
    }
    match <[T; N]>::try_from(items) {
        Ok(array) => Ok(array),
        Err(_) => unreachable!("collected exactly {} elements", N),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_order_default_is_big() {
        assert_eq!(ByteOrder::default(), ByteOrder::Big);
    }

    #[test]
    fn test_byte_order_display() {
        assert_eq!(ByteOrder::Big.to_string(), "big-endian");
        assert_eq!(ByteOrder::Little.to_string(), "little-endian");
    }

    #[test]
    fn test_native_matches_target() {
        let expected = if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        };
        assert_eq!(ByteOrder::native(), expected);
    }

    #[test]
    fn test_try_array_decodes_exactly_n() {
        let data = [1u8, 2, 3, 4];
        let mut r = Reader::new(&data, ByteOrder::Big);
        let arr: [u8; 3] = try_array(|| r.get_u8()).unwrap();
        assert_eq!(arr, [1, 2, 3]);
        assert_eq!(r.rest(), &[4]);
    }

    #[test]
    fn test_try_array_propagates_short_input() {
        let data = [1u8];
        let mut r = Reader::new(&data, ByteOrder::Big);
        let result: Result<[u8; 2], _> = try_array(|| r.get_u8());
        assert!(matches!(result, Err(WireError::BufferTooSmall { .. })));
    }
}
