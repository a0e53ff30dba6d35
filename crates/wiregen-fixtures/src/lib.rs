//! Fixture types with generated codecs.
//!
//! `build.rs` runs the generator over `schema.json` and the output is
//! compiled into the [`fleet`] module, so these impls are exactly what the
//! generator currently emits.

pub mod fleet;

pub use fleet::{Cell, Empty, Fleet, Header, Ids, SLOTS};

/// The schema the codecs were generated from.
pub const SCHEMA_JSON: &str = include_str!("../schema.json");

/// The generated unit compiled into [`fleet`].
pub const GENERATED: &str = include_str!(concat!(env!("OUT_DIR"), "/fleet_wire.rs"));
