//! Error types for schema lookups.
//!
//! Resolution failures are fatal for a generation run: the generator
//! surfaces them with the missing identifier and produces no output.

/// Errors that can occur while resolving names against a [`Schema`](crate::Schema).
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// No declaration with this name exists.
    #[error("type not found: {0}")]
    NotFound(String),

    /// The name exists but refers to a constant, not a type.
    #[error("{0} is not a type")]
    NotAType(String),

    /// A fixed-array length names a constant the schema does not define.
    #[error("unknown array length constant: {0}")]
    UnknownConstant(String),

    /// The schema document could not be parsed.
    #[cfg(feature = "json")]
    #[error("invalid schema document: {0}")]
    Parse(#[from] serde_json::Error),
}
