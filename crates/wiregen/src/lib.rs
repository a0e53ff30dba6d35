//! # Wiregen
//!
//! Schema-driven binary codec generator.
//!
//! For every requested type of a [`Schema`](schema::Schema), wiregen emits
//! Rust source implementing [`WireCodec`](runtime::WireCodec): an exact
//! `wire_len`, an `encode` into a caller-sized buffer and a `decode` that
//! returns the value together with the unread remainder.
//!
//! This crate re-exports the pieces and adds the request format used by
//! the `wiregen` binary.
//!
//! ## Quick Start
//!
//! ```rust
//! use wiregen::prelude::*;
//!
//! let schema = Schema::new("chat", "src/chat.rs").with_type(TypeDecl::new(
//!     "Msg",
//!     TypeNode::record(vec![
//!         Field::new("count", TypeNode::scalar(ScalarKind::U32)),
//!         Field::new("items", TypeNode::sequence(TypeNode::Text)),
//!     ]),
//! ));
//!
//! let code = wiregen::generate(&schema, &["Msg"], GeneratorConfig::default())?;
//! assert!(code.get("msg_wire.rs").is_some());
//! # Ok::<(), WiregenError>(())
//! ```

mod error;
mod request;

pub use error::WiregenError;
pub use request::{GenerateRequest, write_units};

pub use wiregen_codegen as codegen;
pub use wiregen_runtime as runtime;
pub use wiregen_schema as schema;

use wiregen_codegen::{GeneratedCode, Generator, GeneratorConfig};
use wiregen_schema::Schema;

/// Generates codecs for `types` with `config`.
///
/// Shorthand for [`Generator::run`] that reports errors as
/// [`WiregenError`].
pub fn generate(
    schema: &Schema,
    types: &[&str],
    config: GeneratorConfig,
) -> Result<GeneratedCode, WiregenError> {
    Ok(Generator::new(config).run(schema, types)?)
}

/// Common imports for working with wiregen.
pub mod prelude {
    pub use crate::{GenerateRequest, WiregenError, generate};
    pub use wiregen_codegen::{
        BoolEncoding, DynamicCodec, GeneratedCode, Generator, GeneratorConfig, OutputGrouping,
        Value,
    };
    pub use wiregen_runtime::{ByteOrder, Reader, WireCodec, WireError, Writer};
    pub use wiregen_schema::{ArrayLen, Field, ScalarKind, Schema, TypeDecl, TypeNode};
}
