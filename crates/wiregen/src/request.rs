//! The generation request read by the `wiregen` binary.

use std::io;

use serde::{Deserialize, Serialize};
use wiregen_codegen::{GeneratedCode, Generator, GeneratorConfig};
use wiregen_schema::Schema;

use crate::WiregenError;

/// A schema, the types to generate, and optional settings.
///
/// ```json
/// { "schema": { "package": "chat", "types": [ ... ] },
///   "types": ["Msg"],
///   "config": { "grouping": "per_source" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub schema: Schema,
    pub types: Vec<String>,
    #[serde(default)]
    pub config: GeneratorConfig,
}

impl GenerateRequest {
    /// Parses a request document.
    pub fn from_json(text: &str) -> Result<Self, WiregenError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Runs the generator over the requested types.
    pub fn run(&self) -> Result<GeneratedCode, WiregenError> {
        let types: Vec<&str> = self.types.iter().map(String::as_str).collect();
        tracing::info!(
            package = %self.schema.package,
            requested = types.len(),
            "generation request"
        );
        Ok(Generator::new(self.config.clone()).run(&self.schema, &types)?)
    }
}

/// Writes every unit, each preceded by a `// ==> <file name>` marker line.
pub fn write_units(code: &GeneratedCode, out: &mut impl io::Write) -> io::Result<()> {
    for unit in code.iter() {
        writeln!(out, "// ==> {}", unit.file_name)?;
        out.write_all(unit.contents.as_bytes())?;
    }
    out.flush()
}
