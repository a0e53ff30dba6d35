//! Unified error type for wiregen.

use wiregen_codegen::{DynamicError, GenError};
use wiregen_runtime::WireError;
use wiregen_schema::SchemaError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WiregenError {
    /// A schema lookup or schema document error.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Code generation failed; no output was produced.
    #[error(transparent)]
    Gen(#[from] GenError),

    /// Writing or reading the wire format failed.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The dynamic codec rejected a value or buffer.
    #[error(transparent)]
    Dynamic(#[from] DynamicError),

    /// The generation request could not be parsed.
    #[error("invalid request: {0}")]
    Request(#[from] serde_json::Error),

    /// Reading the request or writing output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_schema_error() {
        let err = SchemaError::NotFound("Msg".into());
        let wiregen_err: WiregenError = err.into();
        assert!(matches!(wiregen_err, WiregenError::Schema(_)));
        assert_eq!(wiregen_err.to_string(), "type not found: Msg");
    }

    #[test]
    fn test_from_gen_error() {
        let err = GenError::CyclicSchema {
            path: vec!["A".into(), "B".into(), "A".into()],
        };
        let wiregen_err: WiregenError = err.into();
        assert!(matches!(wiregen_err, WiregenError::Gen(_)));
        assert!(wiregen_err.to_string().contains("A -> B -> A"));
    }

    #[test]
    fn test_from_wire_error() {
        let err = WireError::BufferTooSmall {
            needed: 4,
            remaining: 1,
        };
        let wiregen_err: WiregenError = err.into();
        assert!(matches!(wiregen_err, WiregenError::Wire(_)));
    }

    #[test]
    fn test_from_dynamic_error() {
        let err = DynamicError::UnknownType("Nope".into());
        let wiregen_err: WiregenError = err.into();
        assert!(matches!(wiregen_err, WiregenError::Dynamic(_)));
    }

    #[test]
    fn test_from_io_error() {
        let err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let wiregen_err: WiregenError = err.into();
        assert!(matches!(wiregen_err, WiregenError::Io(_)));
        assert!(wiregen_err.to_string().contains("closed"));
    }
}
