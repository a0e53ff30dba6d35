//! Type schema for wiregen.
//!
//! This crate defines the structural description of the types a codec is
//! generated for:
//!
//! - **Types** ([`Schema`], [`TypeDecl`], [`TypeNode`], [`Field`],
//!   [`ScalarKind`]) — the closed set of shapes the generator understands.
//! - **Errors** ([`SchemaError`]) — lookups that fail.
//!
//! # Architecture
//!
//! Producing a schema from program source is the job of an external
//! resolver. This crate is the contract between that resolver and the
//! generator:
//!
//! ```text
//! Resolver (source) → Schema (this crate) → Codegen (walker + emitter)
//! ```
//!
//! # Feature Flags
//!
//! - `json` (default) — [`Schema::from_json`] via `serde_json`

mod error;
mod types;

pub use error::SchemaError;
pub use types::{ArrayLen, Field, ScalarKind, Schema, TypeDecl, TypeNode};
