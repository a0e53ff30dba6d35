//! Error types for code generation.
//!
//! Every variant is fatal for the run that hit it: the generator returns
//! the error and no output unit at all.

use wiregen_runtime::WireError;
use wiregen_schema::SchemaError;

/// Errors that can occur while generating codecs.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// A requested type or array-length constant could not be resolved.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The walker met a construct it has no wire encoding for.
    /// `repr` is the construct's textual form.
    #[error("unsupported type in {type_name}: {repr}")]
    UnsupportedType { type_name: String, repr: String },

    /// A record member has no usable accessor name.
    #[error("field {position} of {type_name} has no name")]
    UnnamedField { type_name: String, position: usize },

    /// A record member's name cannot be written as a Rust identifier,
    /// not even a raw one (`self`, `super`, `a-b`, ...).
    #[error("field {name:?} of {type_name} is not a valid identifier")]
    InvalidFieldName { type_name: String, name: String },

    /// Named types reference each other with no sequence or mapping in
    /// between, so a value would have to contain itself.
    #[error("cyclic schema: {}", path.join(" -> "))]
    CyclicSchema { path: Vec<String> },

    /// Writing generated source failed.
    #[error("render failed: {0}")]
    Render(#[from] std::fmt::Error),
}

/// Errors raised by the [`DynamicCodec`](crate::DynamicCodec).
#[derive(Debug, thiserror::Error)]
pub enum DynamicError {
    /// The codec has no plan for this type name.
    #[error("no codec for type {0}")]
    UnknownType(String),

    /// The value's shape does not match the plan being executed.
    #[error("expected {expected}, found {found}")]
    Mismatch { expected: String, found: String },

    /// The underlying reader or writer failed.
    #[error(transparent)]
    Wire(#[from] WireError),
}
