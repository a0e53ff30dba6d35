//! Buffer cursors that carry the byte-order policy.
//!
//! A [`Writer`] fills a caller-sized `&mut [u8]` front to back; a
//! [`Reader`] consumes a `&[u8]` front to back. Both advance their cursor
//! by exactly the number of bytes each primitive occupies on the wire, so
//! generated code never does offset arithmetic itself.

use crate::raw::{self, Complex32, Complex64};
use crate::{ByteOrder, LEN_PREFIX, WireError};

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Writes primitives into a pre-sized buffer.
#[derive(Debug)]
pub struct Writer<'b> {
    buf: &'b mut [u8],
    pos: usize,
    order: ByteOrder,
}

macro_rules! put_ordered {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Writes a `", stringify!($ty), "` in the active byte order.")]
            pub fn $name(&mut self, v: $ty) -> Result<(), WireError> {
                let bytes = match self.order {
                    ByteOrder::Big => v.to_be_bytes(),
                    ByteOrder::Little => v.to_le_bytes(),
                };
                self.put_bytes(&bytes)
            }
        )*
    };
}

impl<'b> Writer<'b> {
    /// Creates a writer positioned at the start of `buf`.
    pub fn new(buf: &'b mut [u8], order: ByteOrder) -> Self {
        Self { buf, pos: 0, order }
    }

    /// The byte order applied to every multi-byte integer.
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Copies `bytes` verbatim and advances the cursor.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        let remaining = self.remaining();
        if bytes.len() > remaining {
            return Err(WireError::BufferTooSmall {
                needed: bytes.len(),
                remaining,
            });
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    pub fn put_u8(&mut self, v: u8) -> Result<(), WireError> {
        self.put_bytes(&[v])
    }

    pub fn put_i8(&mut self, v: i8) -> Result<(), WireError> {
        self.put_bytes(&v.to_ne_bytes())
    }

    /// Writes a boolean as a single `0`/`1` byte.
    pub fn put_bool(&mut self, v: bool) -> Result<(), WireError> {
        self.put_u8(u8::from(v))
    }

    put_ordered! {
        put_u16: u16,
        put_i16: i16,
        put_u32: u32,
        put_i32: i32,
        put_u64: u64,
        put_i64: i64,
    }

    /// Writes a `usize` as 8 bytes.
    pub fn put_usize(&mut self, v: usize) -> Result<(), WireError> {
        self.put_u64(v as u64)
    }

    /// Writes an `isize` as 8 bytes.
    pub fn put_isize(&mut self, v: isize) -> Result<(), WireError> {
        self.put_i64(v as i64)
    }

    /// Writes a 4-byte count/length prefix.
    pub fn put_len(&mut self, len: usize) -> Result<(), WireError> {
        let len = u32::try_from(len).map_err(|_| WireError::LengthOverflow(len))?;
        self.put_u32(len)
    }

    /// Writes a length-prefixed UTF-8 string with no terminator.
    pub fn put_str(&mut self, s: &str) -> Result<(), WireError> {
        let needed = LEN_PREFIX + s.len();
        let remaining = self.remaining();
        if needed > remaining {
            return Err(WireError::BufferTooSmall { needed, remaining });
        }
        self.put_len(s.len())?;
        self.put_bytes(s.as_bytes())
    }

    // -- raw layout: byte order does not apply --

    pub fn put_f32_raw(&mut self, v: f32) -> Result<(), WireError> {
        self.put_bytes(&raw::f32_bytes(v))
    }

    pub fn put_f64_raw(&mut self, v: f64) -> Result<(), WireError> {
        self.put_bytes(&raw::f64_bytes(v))
    }

    pub fn put_complex32_raw(&mut self, v: Complex32) -> Result<(), WireError> {
        self.put_bytes(&raw::complex32_bytes(v))
    }

    pub fn put_complex64_raw(&mut self, v: Complex64) -> Result<(), WireError> {
        self.put_bytes(&raw::complex64_bytes(v))
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Reads primitives from the front of a byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'b> {
    buf: &'b [u8],
    order: ByteOrder,
}

macro_rules! get_ordered {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Reads a `", stringify!($ty), "` in the active byte order.")]
            pub fn $name(&mut self) -> Result<$ty, WireError> {
                let mut raw = [0u8; size_of::<$ty>()];
                raw.copy_from_slice(self.take(size_of::<$ty>())?);
                Ok(match self.order {
                    ByteOrder::Big => <$ty>::from_be_bytes(raw),
                    ByteOrder::Little => <$ty>::from_le_bytes(raw),
                })
            }
        )*
    };
}

impl<'b> Reader<'b> {
    /// Creates a reader over `buf`.
    pub fn new(buf: &'b [u8], order: ByteOrder) -> Self {
        Self { buf, order }
    }

    /// The byte order applied to every multi-byte integer.
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// The unread remainder of the input.
    pub fn rest(&self) -> &'b [u8] {
        self.buf
    }

    /// Consumes the next `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'b [u8], WireError> {
        if n > self.buf.len() {
            return Err(WireError::BufferTooSmall {
                needed: n,
                remaining: self.buf.len(),
            });
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub fn get_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    pub fn get_i8(&mut self) -> Result<i8, WireError> {
        Ok(self.get_u8()? as i8)
    }

    /// Reads a single `0`/`1` boolean byte.
    pub fn get_bool(&mut self) -> Result<bool, WireError> {
        match self.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(WireError::InvalidBool(other)),
        }
    }

    get_ordered! {
        get_u16: u16,
        get_i16: i16,
        get_u32: u32,
        get_i32: i32,
        get_u64: u64,
        get_i64: i64,
    }

    /// Reads an 8-byte unsigned integer into a `usize`.
    pub fn get_usize(&mut self) -> Result<usize, WireError> {
        let v = self.get_u64()?;
        usize::try_from(v).map_err(|_| WireError::IntegerOverflow(i128::from(v)))
    }

    /// Reads an 8-byte signed integer into an `isize`.
    pub fn get_isize(&mut self) -> Result<isize, WireError> {
        let v = self.get_i64()?;
        isize::try_from(v).map_err(|_| WireError::IntegerOverflow(i128::from(v)))
    }

    /// Reads a 4-byte count/length prefix.
    pub fn get_len(&mut self) -> Result<usize, WireError> {
        let len = self.get_u32()?;
        usize::try_from(len).map_err(|_| WireError::LengthOverflow(len as usize))
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn get_string(&mut self) -> Result<String, WireError> {
        let len = self.get_len()?;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| WireError::InvalidUtf8)
    }

    /// An allocation hint for a collection of `count` elements.
    ///
    /// A corrupt count prefix must not trigger a huge allocation, so the
    /// hint never exceeds the bytes left in the input.
    pub fn capacity_hint(&self, count: usize) -> usize {
        count.min(self.buf.len())
    }

    // -- raw layout: byte order does not apply --

    pub fn get_f32_raw(&mut self) -> Result<f32, WireError> {
        Ok(raw::f32_from(self.take(raw::F32_WIDTH)?))
    }

    pub fn get_f64_raw(&mut self) -> Result<f64, WireError> {
        Ok(raw::f64_from(self.take(raw::F64_WIDTH)?))
    }

    pub fn get_complex32_raw(&mut self) -> Result<Complex32, WireError> {
        Ok(raw::complex32_from(self.take(raw::COMPLEX32_WIDTH)?))
    }

    pub fn get_complex64_raw(&mut self) -> Result<Complex64, WireError> {
        Ok(raw::complex64_from(self.take(raw::COMPLEX64_WIDTH)?))
    }
}
