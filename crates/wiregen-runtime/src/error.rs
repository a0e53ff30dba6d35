//! Error types for the wire runtime.

/// Errors raised while writing or reading the wire format.
///
/// Generated codecs never index a buffer directly; every access goes
/// through [`Writer`](crate::Writer) or [`Reader`](crate::Reader), which
/// turn an undersized buffer into [`WireError::BufferTooSmall`] instead of
/// an out-of-bounds panic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// The buffer ended before the value did.
    #[error("buffer too small: needed {needed} bytes, {remaining} remaining")]
    BufferTooSmall { needed: usize, remaining: usize },

    /// A text or collection length does not fit the 4-byte prefix.
    #[error("length {0} does not fit a 4-byte prefix")]
    LengthOverflow(usize),

    /// Decoded text was not valid UTF-8.
    #[error("text payload is not valid UTF-8")]
    InvalidUtf8,

    /// A boolean byte other than 0 or 1.
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    /// A 64-bit wire integer does not fit the host's `usize`/`isize`.
    #[error("integer {0} does not fit the host word size")]
    IntegerOverflow(i128),

    /// `from_slice` decoded a value but bytes were left over.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}
