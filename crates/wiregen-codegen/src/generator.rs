//! Generator: drives one run from requested type names to output units.

use wiregen_schema::Schema;

use crate::{
    Emitter, GenError, GeneratedCode, GenerationContext, GeneratorConfig, Walker, check_cycles,
};

/// Runs the generation pipeline with a fixed configuration.
///
/// ```text
/// resolve names → cycle check → plan (walker) → render (emitter) → units
/// ```
///
/// A run is all-or-nothing: the first failure is returned and every unit
/// built so far is discarded with the context.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates codecs for `type_names`, in request order.
    ///
    /// # Errors
    /// - [`GenError::Schema`] if a name is missing or is not a type
    /// - [`GenError::CyclicSchema`] if a requested type contains itself
    /// - any error from planning or rendering a requested type
    pub fn run(&self, schema: &Schema, type_names: &[&str]) -> Result<GeneratedCode, GenError> {
        let decls = type_names
            .iter()
            .map(|name| schema.resolve(name))
            .collect::<Result<Vec<_>, _>>()?;

        let roots: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        check_cycles(schema, &roots)?;

        let walker = Walker::new(schema, &self.config);
        let emitter = Emitter::new(&self.config);
        let mut ctx = GenerationContext::new(schema, &self.config);

        for decl in decls {
            tracing::info!(type_name = %decl.name, "generating codec");
            let plan = walker.plan(decl)?;
            let code = emitter.emit(&plan)?;
            ctx.append(decl, &code)?;
        }

        let code = ctx.finish();
        tracing::info!(
            package = %schema.package,
            types = type_names.len(),
            units = code.len(),
            "generation finished"
        );
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use wiregen_schema::{Field, ScalarKind, SchemaError, TypeDecl, TypeNode};

    use super::*;
    use crate::OutputGrouping;

    fn schema() -> Schema {
        Schema::new("proto", "src/proto.rs")
            .with_type(TypeDecl::new(
                "Header",
                TypeNode::record(vec![Field::new("id", TypeNode::scalar(ScalarKind::U16))]),
            ))
            .with_type(TypeDecl::new(
                "Packet",
                TypeNode::record(vec![
                    Field::new("header", TypeNode::named("Header")),
                    Field::new("body", TypeNode::sequence(TypeNode::scalar(ScalarKind::U8))),
                ]),
            ))
            .with_type(TypeDecl::new(
                "Handle",
                TypeNode::record(vec![Field::new("raw", TypeNode::opaque("fn()"))]),
            ))
    }

    #[test]
    fn test_run_produces_one_unit_per_type() {
        let code = Generator::default()
            .run(&schema(), &["Header", "Packet"])
            .unwrap();
        assert_eq!(code.len(), 2);
        assert!(code
            .get("header_wire.rs")
            .unwrap()
            .contents
            .contains("impl ::wiregen_runtime::WireCodec for Header {"));
        assert!(code
            .get("packet_wire.rs")
            .unwrap()
            .contents
            .contains("<Header as ::wiregen_runtime::WireCodec>::decode(r)?"));
    }

    #[test]
    fn test_per_source_grouping_shares_a_unit() {
        let generator = Generator::new(GeneratorConfig {
            grouping: OutputGrouping::PerSource,
            ..GeneratorConfig::default()
        });
        let code = generator.run(&schema(), &["Packet", "Header"]).unwrap();
        assert_eq!(code.len(), 1);
        let unit = code.get("proto_wire.rs").unwrap();
        assert_eq!(unit.types, vec!["Packet", "Header"]);
    }

    #[test]
    fn test_missing_type_aborts_the_run() {
        let err = Generator::default()
            .run(&schema(), &["Header", "Missing"])
            .unwrap_err();
        assert!(matches!(err, GenError::Schema(SchemaError::NotFound(_))));
        assert_eq!(err.to_string(), "type not found: Missing");
    }

    #[test]
    fn test_unsupported_type_discards_earlier_units() {
        let err = Generator::default()
            .run(&schema(), &["Header", "Handle"])
            .unwrap_err();
        assert!(matches!(err, GenError::UnsupportedType { .. }));
    }

    #[test]
    fn test_cycle_is_rejected_before_planning() {
        let schema = Schema::default().with_type(TypeDecl::new(
            "Loop",
            TypeNode::record(vec![Field::new("again", TypeNode::named("Loop"))]),
        ));
        let err = Generator::default().run(&schema, &["Loop"]).unwrap_err();
        assert!(matches!(err, GenError::CyclicSchema { .. }));
    }

    #[test]
    fn test_empty_request_produces_nothing() {
        let code = Generator::default().run(&schema(), &[]).unwrap();
        assert!(code.is_empty());
    }
}
