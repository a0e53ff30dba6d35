//! The schema walker: turns a declaration into a [`CodecPlan`].
//!
//! Each pass is a recursive match over [`TypeNode`]:
//!
//! ```text
//! Scalar / Text   leaf rule for the pass
//! Named           delegate to the named type's own codec (never inlined)
//! Record          members in declared order, at the extended place
//! FixedArray      loop over exactly `len` elements, no prefix
//! Sequence        4-byte count, then each element
//! Mapping         4-byte count, then key and value of each entry
//! Opaque          error: unsupported type
//! ```
//!
//! Because named references are delegated rather than followed, walking a
//! single declaration always terminates. Whether the *values* described
//! by a set of declarations are finite is a separate question answered by
//! [`check_cycles`](crate::check_cycles).

use heck::ToSnakeCase;
use wiregen_schema::{Field, Schema, TypeDecl, TypeNode};

use crate::plan::{
    Accessor, CodecPlan, Constructor, DecOp, EncOp, LenOp, Place, Var, is_field_ident,
};
use crate::rules::{COUNT_PREFIX, Encoding, scalar_rule};
use crate::{GenError, GeneratorConfig};

/// Plans codecs for declarations of one schema.
#[derive(Debug, Clone, Copy)]
pub struct Walker<'s> {
    schema: &'s Schema,
    config: &'s GeneratorConfig,
}

impl<'s> Walker<'s> {
    pub fn new(schema: &'s Schema, config: &'s GeneratorConfig) -> Self {
        Self { schema, config }
    }

    /// Produces the length, encode and decode sequences for `decl`.
    ///
    /// # Errors
    /// - [`GenError::UnsupportedType`] for an [`TypeNode::Opaque`] anywhere
    ///   in the body
    /// - [`GenError::UnnamedField`] for a member with no derivable name
    /// - [`GenError::InvalidFieldName`] for a member name that cannot be
    ///   written as a Rust identifier
    /// - [`GenError::Schema`] for an undefined array-length constant
    pub fn plan(&self, decl: &TypeDecl) -> Result<CodecPlan, GenError> {
        let mut walk = Walk {
            schema: self.schema,
            config: self.config,
            type_name: &decl.name,
            next_var: 0,
        };

        let members: Vec<(Accessor, &TypeNode)> = match &decl.body {
            TypeNode::Record { fields } => walk
                .accessors(fields)?
                .into_iter()
                .zip(fields.iter().map(|f| &f.ty))
                .collect(),
            body => vec![(Accessor::Positional(0), body)],
        };
        let constructor = if members
            .iter()
            .all(|(acc, _)| matches!(acc, Accessor::Positional(_)))
            && !(decl.is_record() && members.is_empty())
        {
            Constructor::TupleStruct
        } else {
            Constructor::Struct
        };

        let mut length = Vec::new();
        let mut encode = Vec::new();
        let mut decode = Vec::new();
        let mut fields = Vec::with_capacity(members.len());

        for (index, (accessor, node)) in members.iter().enumerate() {
            let at = Place::SelfValue.field(index, accessor.clone());
            length.extend(walk.length(node, &at)?);
            encode.extend(walk.encode(node, &at)?);

            let (ops, var) = walk.decode(node, &hint_for(accessor))?;
            decode.extend(ops);
            fields.push((accessor.clone(), var));
        }

        let result = walk.fresh("decoded");
        decode.push(DecOp::Record {
            constructor,
            fields,
            into: result.clone(),
        });

        tracing::debug!(
            type_name = %decl.name,
            members = members.len(),
            locals = walk.next_var,
            "planned codec"
        );

        Ok(CodecPlan {
            type_name: decl.name.clone(),
            length,
            encode,
            decode,
            result,
        })
    }
}

/// State for planning one declaration.
struct Walk<'a> {
    schema: &'a Schema,
    config: &'a GeneratorConfig,
    type_name: &'a str,
    next_var: usize,
}

impl Walk<'_> {
    fn fresh(&mut self, hint: &str) -> Var {
        let var = Var(format!("{hint}_{}", self.next_var));
        self.next_var += 1;
        var
    }

    fn unsupported(&self, repr: &str) -> GenError {
        GenError::UnsupportedType {
            type_name: self.type_name.to_string(),
            repr: repr.to_string(),
        }
    }

    /// Accessors for the members of a top-level record.
    ///
    /// An embedded member with no name is reached through the snake_case
    /// form of its type's name, and keeps that type's own encoding.
    fn accessors(&self, fields: &[Field]) -> Result<Vec<Accessor>, GenError> {
        fields
            .iter()
            .enumerate()
            .map(|(position, field)| {
                if field.is_positional() {
                    return Ok(Accessor::Positional(position));
                }
                let name = if !field.name.is_empty() {
                    field.name.clone()
                } else {
                    match &field.ty {
                        TypeNode::Named { name } if field.embedded => name.to_snake_case(),
                        _ => {
                            return Err(GenError::UnnamedField {
                                type_name: self.type_name.to_string(),
                                position,
                            });
                        }
                    }
                };
                if !is_field_ident(&name) {
                    return Err(GenError::InvalidFieldName {
                        type_name: self.type_name.to_string(),
                        name,
                    });
                }
                Ok(Accessor::Named(name))
            })
            .collect()
    }

    // -- length pass --

    fn length(&mut self, node: &TypeNode, at: &Place) -> Result<Vec<LenOp>, GenError> {
        let ops = match node {
            TypeNode::Scalar { scalar } => {
                let rule = scalar_rule(*scalar, self.config);
                if rule.encoding == Encoding::Omitted {
                    Vec::new()
                } else {
                    vec![LenOp::Fixed(rule.width)]
                }
            }
            TypeNode::Text => vec![LenOp::Text(at.clone())],
            TypeNode::Named { name } => vec![LenOp::Nested {
                type_name: name.clone(),
                at: at.clone(),
            }],
            TypeNode::Record { fields } => {
                let mut ops = Vec::new();
                for (i, field) in fields.iter().enumerate() {
                    ops.extend(self.length(&field.ty, &at.field(i, Accessor::Positional(i)))?);
                }
                ops
            }
            TypeNode::FixedArray { element, len } => {
                let count = self.schema.array_len(len)?;
                let item = self.fresh("item");
                let body = self.length(element, &Place::Var(item.clone()))?;
                vec![LenOp::Array {
                    over: at.clone(),
                    count,
                    item,
                    body,
                }]
            }
            TypeNode::Sequence { element } => {
                let item = self.fresh("item");
                let body = self.length(element, &Place::Var(item.clone()))?;
                vec![
                    LenOp::Fixed(COUNT_PREFIX),
                    LenOp::Each {
                        over: at.clone(),
                        item,
                        body,
                    },
                ]
            }
            TypeNode::Mapping { key, value } => {
                let key_var = self.fresh("key");
                let value_var = self.fresh("value");
                let mut body = self.length(key, &Place::Var(key_var.clone()))?;
                body.extend(self.length(value, &Place::Var(value_var.clone()))?);
                vec![
                    LenOp::Fixed(COUNT_PREFIX),
                    LenOp::EachEntry {
                        over: at.clone(),
                        key: key_var,
                        value: value_var,
                        body,
                    },
                ]
            }
            TypeNode::Opaque { repr } => return Err(self.unsupported(repr)),
        };
        Ok(ops)
    }

    // -- encode pass --

    fn encode(&mut self, node: &TypeNode, at: &Place) -> Result<Vec<EncOp>, GenError> {
        let ops = match node {
            TypeNode::Scalar { scalar } => {
                if scalar_rule(*scalar, self.config).encoding == Encoding::Omitted {
                    Vec::new()
                } else {
                    vec![EncOp::Scalar {
                        kind: *scalar,
                        at: at.clone(),
                    }]
                }
            }
            TypeNode::Text => vec![EncOp::Text(at.clone())],
            TypeNode::Named { name } => vec![EncOp::Nested {
                type_name: name.clone(),
                at: at.clone(),
            }],
            TypeNode::Record { fields } => {
                let mut ops = Vec::new();
                for (i, field) in fields.iter().enumerate() {
                    ops.extend(self.encode(&field.ty, &at.field(i, Accessor::Positional(i)))?);
                }
                ops
            }
            TypeNode::FixedArray { element, len } => {
                let count = self.schema.array_len(len)?;
                let item = self.fresh("item");
                let body = self.encode(element, &Place::Var(item.clone()))?;
                vec![EncOp::Array {
                    over: at.clone(),
                    count,
                    item,
                    body,
                }]
            }
            TypeNode::Sequence { element } => {
                let item = self.fresh("item");
                let body = self.encode(element, &Place::Var(item.clone()))?;
                vec![
                    EncOp::Count(at.clone()),
                    EncOp::Each {
                        over: at.clone(),
                        item,
                        body,
                    },
                ]
            }
            TypeNode::Mapping { key, value } => {
                let key_var = self.fresh("key");
                let value_var = self.fresh("value");
                let mut body = self.encode(key, &Place::Var(key_var.clone()))?;
                body.extend(self.encode(value, &Place::Var(value_var.clone()))?);
                vec![
                    EncOp::Count(at.clone()),
                    EncOp::EachEntry {
                        over: at.clone(),
                        key: key_var,
                        value: value_var,
                        body,
                    },
                ]
            }
            TypeNode::Opaque { repr } => return Err(self.unsupported(repr)),
        };
        Ok(ops)
    }

    // -- decode pass --

    fn decode(&mut self, node: &TypeNode, hint: &str) -> Result<(Vec<DecOp>, Var), GenError> {
        let into = self.fresh(hint);
        let ops = match node {
            TypeNode::Scalar { scalar } => {
                let kind = *scalar;
                if scalar_rule(kind, self.config).encoding == Encoding::Omitted {
                    vec![DecOp::Omitted {
                        kind,
                        into: into.clone(),
                    }]
                } else {
                    vec![DecOp::Scalar {
                        kind,
                        into: into.clone(),
                    }]
                }
            }
            TypeNode::Text => vec![DecOp::Text { into: into.clone() }],
            TypeNode::Named { name } => vec![DecOp::Nested {
                type_name: name.clone(),
                into: into.clone(),
            }],
            TypeNode::Record { fields } => {
                let mut ops = Vec::new();
                let mut members = Vec::with_capacity(fields.len());
                for (i, field) in fields.iter().enumerate() {
                    let (field_ops, var) = self.decode(&field.ty, &format!("field{i}"))?;
                    ops.extend(field_ops);
                    members.push((Accessor::Positional(i), var));
                }
                ops.push(DecOp::Record {
                    constructor: Constructor::Tuple,
                    fields: members,
                    into: into.clone(),
                });
                ops
            }
            TypeNode::FixedArray { element, len } => {
                let count = self.schema.array_len(len)?;
                let (body, item) = self.decode(element, "item")?;
                vec![DecOp::Array {
                    count,
                    len: len.clone(),
                    item,
                    body,
                    into: into.clone(),
                }]
            }
            TypeNode::Sequence { element } => {
                let (body, item) = self.decode(element, "item")?;
                vec![DecOp::Sequence {
                    item,
                    body,
                    into: into.clone(),
                }]
            }
            TypeNode::Mapping { key, value } => {
                let (mut body, key_var) = self.decode(key, "key")?;
                let (value_ops, value_var) = self.decode(value, "value")?;
                body.extend(value_ops);
                vec![DecOp::Mapping {
                    key: key_var,
                    value: value_var,
                    body,
                    into: into.clone(),
                }]
            }
            TypeNode::Opaque { repr } => return Err(self.unsupported(repr)),
        };
        Ok((ops, into))
    }
}

fn hint_for(accessor: &Accessor) -> String {
    match accessor {
        Accessor::Named(name) => name.to_snake_case(),
        Accessor::Positional(i) => format!("field{i}"),
    }
}
