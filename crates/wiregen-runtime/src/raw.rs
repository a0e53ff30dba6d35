//! Raw-layout passthrough for floating point and complex scalars.
//!
//! These values are written as a copy of their in-memory bit pattern
//! (native endianness, native width) and ignore the active
//! [`ByteOrder`](crate::ByteOrder). Bytes produced on one host are only
//! meaningful on a host with the same numeric representation.
//!
//! Everything that reinterprets raw bytes lives in this module.

/// A complex number with `f32` parts, laid out as `re` then `im`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Complex32 {
    pub re: f32,
    pub im: f32,
}

/// A complex number with `f64` parts, laid out as `re` then `im`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Complex64 {
    pub re: f64,
    pub im: f64,
}

impl Complex32 {
    pub const fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }
}

impl Complex64 {
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// Native in-memory size of each raw-layout kind, in bytes.
pub const F32_WIDTH: usize = size_of::<f32>();
pub const F64_WIDTH: usize = size_of::<f64>();
pub const COMPLEX32_WIDTH: usize = size_of::<Complex32>();
pub const COMPLEX64_WIDTH: usize = size_of::<Complex64>();

pub(crate) fn f32_bytes(v: f32) -> [u8; F32_WIDTH] {
    v.to_ne_bytes()
}

pub(crate) fn f64_bytes(v: f64) -> [u8; F64_WIDTH] {
    v.to_ne_bytes()
}

pub(crate) fn f32_from(bytes: &[u8]) -> f32 {
    let mut raw = [0u8; F32_WIDTH];
    raw.copy_from_slice(bytes);
    f32::from_ne_bytes(raw)
}

pub(crate) fn f64_from(bytes: &[u8]) -> f64 {
    let mut raw = [0u8; F64_WIDTH];
    raw.copy_from_slice(bytes);
    f64::from_ne_bytes(raw)
}

pub(crate) fn complex32_bytes(v: Complex32) -> [u8; COMPLEX32_WIDTH] {
    let mut out = [0u8; COMPLEX32_WIDTH];
    out[..F32_WIDTH].copy_from_slice(&f32_bytes(v.re));
    out[F32_WIDTH..].copy_from_slice(&f32_bytes(v.im));
    out
}

pub(crate) fn complex64_bytes(v: Complex64) -> [u8; COMPLEX64_WIDTH] {
    let mut out = [0u8; COMPLEX64_WIDTH];
    out[..F64_WIDTH].copy_from_slice(&f64_bytes(v.re));
    out[F64_WIDTH..].copy_from_slice(&f64_bytes(v.im));
    out
}

pub(crate) fn complex32_from(bytes: &[u8]) -> Complex32 {
    Complex32::new(f32_from(&bytes[..F32_WIDTH]), f32_from(&bytes[F32_WIDTH..]))
}

pub(crate) fn complex64_from(bytes: &[u8]) -> Complex64 {
    Complex64::new(f64_from(&bytes[..F64_WIDTH]), f64_from(&bytes[F64_WIDTH..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_match_native_layout() {
        assert_eq!(F32_WIDTH, 4);
        assert_eq!(F64_WIDTH, 8);
        assert_eq!(COMPLEX32_WIDTH, 8);
        assert_eq!(COMPLEX64_WIDTH, 16);
    }

    #[test]
    fn test_f64_bytes_are_native_bit_pattern() {
        let v = 1.5f64;
        assert_eq!(f64_bytes(v), v.to_bits().to_ne_bytes());
        assert_eq!(f64_from(&f64_bytes(v)), v);
    }

    #[test]
    fn test_complex_parts_are_laid_out_re_then_im() {
        let c = Complex32::new(1.0, -2.0);
        let bytes = complex32_bytes(c);
        assert_eq!(&bytes[..4], &1.0f32.to_ne_bytes());
        assert_eq!(&bytes[4..], &(-2.0f32).to_ne_bytes());
        assert_eq!(complex32_from(&bytes), c);
    }
}
