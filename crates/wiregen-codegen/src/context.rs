//! Output units accumulated over one generation run.

use std::collections::BTreeMap;
use std::path::Path;

use heck::ToSnakeCase;
use wiregen_schema::{Schema, TypeDecl};

use crate::emitter::Source;
use crate::{GenError, GeneratorConfig, OutputGrouping};

/// One destination file under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    /// Declaring source file named in the header.
    pub source: String,
    /// Names of the types whose impls were appended, in order.
    pub types: Vec<String>,
    pub contents: String,
}

/// A finished output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub file_name: String,
    pub types: Vec<String>,
    pub contents: String,
}

/// Everything a run produced, ordered by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedCode {
    pub units: Vec<GeneratedUnit>,
}

impl GeneratedCode {
    /// Looks up a unit by file name.
    pub fn get(&self, file_name: &str) -> Option<&GeneratedUnit> {
        self.units.iter().find(|u| u.file_name == file_name)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedUnit> {
        self.units.iter()
    }
}

/// Output units keyed by destination file name.
///
/// Units are created on first use and only ever appended to; nothing is
/// written anywhere until the caller takes the result of [`finish`].
///
/// [`finish`]: GenerationContext::finish
pub struct GenerationContext<'a> {
    schema: &'a Schema,
    config: &'a GeneratorConfig,
    units: BTreeMap<String, OutputUnit>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(schema: &'a Schema, config: &'a GeneratorConfig) -> Self {
        Self {
            schema,
            config,
            units: BTreeMap::new(),
        }
    }

    /// The file `decl`'s impl belongs in under the configured grouping.
    pub fn unit_name(&self, decl: &TypeDecl) -> String {
        let stem = match self.config.grouping {
            OutputGrouping::PerType => decl.name.to_snake_case(),
            OutputGrouping::PerSource => {
                let source = self.source_of(decl);
                let stem = Path::new(source)
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_snake_case())
                    .unwrap_or_default();
                if stem.is_empty() {
                    "schema".to_string()
                } else {
                    stem
                }
            }
        };
        format!("{stem}{}", self.config.file_suffix)
    }

    /// Appends rendered code for `decl` to its unit, creating the unit
    /// (header included) if this is the first type routed to it.
    pub fn append(&mut self, decl: &TypeDecl, code: &str) -> Result<(), GenError> {
        let file_name = self.unit_name(decl);
        if !self.units.contains_key(&file_name) {
            let unit = self.open_unit(decl)?;
            tracing::debug!(file = %file_name, source = %unit.source, "output unit created");
            self.units.insert(file_name.clone(), unit);
        }
        if let Some(unit) = self.units.get_mut(&file_name) {
            unit.contents.push('\n');
            unit.contents.push_str(code);
            unit.types.push(decl.name.clone());
        }
        Ok(())
    }

    /// Number of units created so far.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn finish(self) -> GeneratedCode {
        GeneratedCode {
            units: self
                .units
                .into_iter()
                .map(|(file_name, unit)| GeneratedUnit {
                    file_name,
                    types: unit.types,
                    contents: unit.contents,
                })
                .collect(),
        }
    }

    fn source_of<'d>(&'d self, decl: &'d TypeDecl) -> &'d str {
        decl.source.as_deref().unwrap_or(&self.schema.source)
    }

    fn open_unit(&self, decl: &TypeDecl) -> Result<OutputUnit, GenError> {
        let source = self.source_of(decl).to_string();
        let mut contents = String::new();
        let mut src = Source::new(&mut contents);
        src.line("// Code generated by wiregen. DO NOT EDIT.")?;
        src.line(format_args!("// source: {source}"))?;
        if !self.schema.package.is_empty() {
            src.line(format_args!("// package: {}", self.schema.package))?;
        }
        src.blank()?;
        src.line("#[allow(unused_imports)]")?;
        src.line(format_args!("use {}::*;", self.config.types_path))?;
        src.line("#[allow(unused_imports)]")?;
        src.line(format_args!("use {}::WireCodec as _;", self.config.runtime_path))?;
        Ok(OutputUnit {
            source,
            types: Vec::new(),
            contents,
        })
    }
}

#[cfg(test)]
mod tests {
    use wiregen_schema::{ScalarKind, TypeNode};

    use super::*;

    fn decl(name: &str, source: Option<&str>) -> TypeDecl {
        let decl = TypeDecl::new(name, TypeNode::scalar(ScalarKind::U8));
        match source {
            Some(s) => decl.with_source(s),
            None => decl,
        }
    }

    #[test]
    fn test_per_type_units_use_snake_case_names() {
        let schema = Schema::new("proto", "src/proto.rs");
        let config = GeneratorConfig::default();
        let ctx = GenerationContext::new(&schema, &config);
        assert_eq!(ctx.unit_name(&decl("FrameHeader", None)), "frame_header_wire.rs");
    }

    #[test]
    fn test_per_source_units_use_file_stem() {
        let schema = Schema::new("proto", "src/proto.rs");
        let config = GeneratorConfig {
            grouping: OutputGrouping::PerSource,
            ..GeneratorConfig::default()
        };
        let ctx = GenerationContext::new(&schema, &config);
        assert_eq!(ctx.unit_name(&decl("A", None)), "proto_wire.rs");
        assert_eq!(
            ctx.unit_name(&decl("B", Some("src/Net/Messages.rs"))),
            "messages_wire.rs"
        );
    }

    #[test]
    fn test_per_source_without_any_source_falls_back() {
        let schema = Schema::default();
        let config = GeneratorConfig {
            grouping: OutputGrouping::PerSource,
            ..GeneratorConfig::default()
        };
        let ctx = GenerationContext::new(&schema, &config);
        assert_eq!(ctx.unit_name(&decl("A", None)), "schema_wire.rs");
    }

    #[test]
    fn test_units_get_one_header_and_append_in_order() {
        let schema = Schema::new("proto", "src/proto.rs");
        let config = GeneratorConfig {
            grouping: OutputGrouping::PerSource,
            ..GeneratorConfig::default()
        };
        let mut ctx = GenerationContext::new(&schema, &config);
        ctx.append(&decl("A", None), "// impl A\n").unwrap();
        ctx.append(&decl("B", None), "// impl B\n").unwrap();
        assert_eq!(ctx.len(), 1);

        let code = ctx.finish();
        let unit = code.get("proto_wire.rs").unwrap();
        assert_eq!(unit.types, vec!["A", "B"]);
        assert_eq!(unit.contents.matches("DO NOT EDIT").count(), 1);
        assert!(unit.contents.contains("// source: src/proto.rs"));
        assert!(unit.contents.contains("// package: proto"));
        assert!(unit.contents.contains("use super::*;"));
        assert!(unit.contents.contains("use ::wiregen_runtime::WireCodec as _;"));
        let a = unit.contents.find("// impl A").unwrap();
        let b = unit.contents.find("// impl B").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_finish_orders_units_by_file_name() {
        let schema = Schema::new("proto", "src/proto.rs");
        let config = GeneratorConfig::default();
        let mut ctx = GenerationContext::new(&schema, &config);
        ctx.append(&decl("Zeta", None), "").unwrap();
        ctx.append(&decl("Alpha", None), "").unwrap();
        let names: Vec<_> = ctx.finish().iter().map(|u| u.file_name.clone()).collect();
        assert_eq!(names, vec!["alpha_wire.rs", "zeta_wire.rs"]);
    }
}
