//! Detection of self-containing schemas.
//!
//! `struct A { b: B }` with `struct B { a: A }` describes a value of
//! infinite size: encoding it could never finish. A `Sequence` or
//! `Mapping` on the path bounds the recursion by the data (an empty list
//! ends it), so only references reachable through records and fixed-size
//! arrays count as edges.

use std::collections::HashMap;

use wiregen_schema::{Schema, TypeNode};

use crate::GenError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Fails if any of `roots` can reach itself through unbounded references.
///
/// Names missing from the schema are treated as external codecs and are
/// not followed.
///
/// # Errors
/// [`GenError::CyclicSchema`] with the offending path, e.g. `A -> B -> A`.
pub fn check_cycles<'s>(schema: &'s Schema, roots: &[&'s str]) -> Result<(), GenError> {
    let mut marks = HashMap::new();
    let mut stack = Vec::new();
    for &root in roots {
        visit(schema, root, &mut marks, &mut stack)?;
    }
    Ok(())
}

fn visit<'s>(
    schema: &'s Schema,
    name: &'s str,
    marks: &mut HashMap<&'s str, Mark>,
    stack: &mut Vec<&'s str>,
) -> Result<(), GenError> {
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            let start = stack.iter().position(|n| *n == name).unwrap_or(0);
            let mut path: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
            path.push(name.to_string());
            return Err(GenError::CyclicSchema { path });
        }
        None => {}
    }

    let Some(decl) = schema.get(name) else {
        tracing::debug!(type_name = %name, "reference to external codec");
        return Ok(());
    };

    marks.insert(name, Mark::Visiting);
    stack.push(name);

    let mut refs = Vec::new();
    unbounded_refs(&decl.body, &mut refs);
    for next in refs {
        visit(schema, next, marks, stack)?;
    }

    stack.pop();
    marks.insert(name, Mark::Done);
    Ok(())
}

/// Collects named references that are not behind a sequence or mapping.
fn unbounded_refs<'s>(node: &'s TypeNode, out: &mut Vec<&'s str>) {
    match node {
        TypeNode::Named { name } => out.push(name),
        TypeNode::Record { fields } => {
            for field in fields {
                unbounded_refs(&field.ty, out);
            }
        }
        TypeNode::FixedArray { element, .. } => unbounded_refs(element, out),
        TypeNode::Sequence { .. }
        | TypeNode::Mapping { .. }
        | TypeNode::Scalar { .. }
        | TypeNode::Text
        | TypeNode::Opaque { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use wiregen_schema::{ArrayLen, Field, ScalarKind, TypeDecl};

    use super::*;

    fn record(name: &str, fields: Vec<Field>) -> TypeDecl {
        TypeDecl::new(name, TypeNode::record(fields))
    }

    #[test]
    fn test_direct_self_reference_is_a_cycle() {
        let schema = Schema::default().with_type(record(
            "Node",
            vec![Field::new("next", TypeNode::named("Node"))],
        ));
        let err = check_cycles(&schema, &["Node"]).unwrap_err();
        assert_eq!(err.to_string(), "cyclic schema: Node -> Node");
    }

    #[test]
    fn test_mutual_reference_reports_the_path() {
        let schema = Schema::default()
            .with_type(record("A", vec![Field::new("b", TypeNode::named("B"))]))
            .with_type(record("B", vec![Field::new("c", TypeNode::named("C"))]))
            .with_type(record("C", vec![Field::new("a", TypeNode::named("A"))]));
        let err = check_cycles(&schema, &["A"]).unwrap_err();
        let GenError::CyclicSchema { path } = err else {
            panic!("expected a cycle");
        };
        assert_eq!(path, vec!["A", "B", "C", "A"]);
    }

    #[test]
    fn test_fixed_array_does_not_break_a_cycle() {
        let schema = Schema::default().with_type(record(
            "Grid",
            vec![Field::new(
                "cells",
                TypeNode::array(TypeNode::named("Grid"), ArrayLen::Literal(2)),
            )],
        ));
        assert!(check_cycles(&schema, &["Grid"]).is_err());
    }

    #[test]
    fn test_sequence_and_mapping_bound_recursion() {
        let schema = Schema::default().with_type(record(
            "Tree",
            vec![
                Field::new("children", TypeNode::sequence(TypeNode::named("Tree"))),
                Field::new(
                    "index",
                    TypeNode::mapping(TypeNode::Text, TypeNode::named("Tree")),
                ),
            ],
        ));
        assert!(check_cycles(&schema, &["Tree"]).is_ok());
    }

    #[test]
    fn test_shared_dependency_is_not_a_cycle() {
        let leaf = record("Leaf", vec![Field::new("v", TypeNode::scalar(ScalarKind::U8))]);
        let schema = Schema::default()
            .with_type(leaf)
            .with_type(record(
                "Pair",
                vec![
                    Field::new("a", TypeNode::named("Leaf")),
                    Field::new("b", TypeNode::named("Leaf")),
                ],
            ));
        assert!(check_cycles(&schema, &["Pair", "Leaf"]).is_ok());
    }

    #[test]
    fn test_external_reference_is_not_followed() {
        let schema = Schema::default().with_type(record(
            "Wrapper",
            vec![Field::new("inner", TypeNode::named("elsewhere::Thing"))],
        ));
        assert!(check_cycles(&schema, &["Wrapper"]).is_ok());
    }
}
