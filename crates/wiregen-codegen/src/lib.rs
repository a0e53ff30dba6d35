//! Codec generation for wiregen.
//!
//! Given a [`Schema`](wiregen_schema::Schema) and a list of type names,
//! this crate produces, per type, Rust source implementing
//! [`WireCodec`](wiregen_runtime::WireCodec): an exact length routine, an
//! encoder and a decoder.
//!
//! # Architecture
//!
//! ```text
//! Schema ──► Walker ──► CodecPlan ──┬─► Emitter ──► GenerationContext ──► GeneratedCode
//!                                   └─► DynamicCodec (executes plans on Values)
//! ```
//!
//! - [`Walker`] — recursive descent over the type tree; produces one
//!   [`CodecPlan`](plan::CodecPlan) per declaration
//! - [`Emitter`] — renders a plan as a `WireCodec` impl
//! - [`GenerationContext`] — output units keyed by file name
//! - [`Generator`] — the whole run, all-or-nothing
//! - [`DynamicCodec`] — runs plans directly, without compiling anything
//!
//! Scalar encodings live in [`rules`]; every pass consults the same table.

mod config;
mod context;
mod cycle;
mod dynamic;
mod emitter;
mod error;
mod generator;
pub mod plan;
pub mod rules;
mod walker;

pub use config::{BoolEncoding, GeneratorConfig, OutputGrouping};
pub use context::{GeneratedCode, GeneratedUnit, GenerationContext, OutputUnit};
pub use cycle::check_cycles;
pub use dynamic::{DynamicCodec, Value};
pub use emitter::Emitter;
pub use error::{DynamicError, GenError};
pub use generator::Generator;
pub use walker::Walker;
