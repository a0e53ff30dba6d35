//! The structural type model handed to the generator.
//!
//! A [`Schema`] is what the external type resolver produces after parsing
//! program source: a list of named declarations, each with a [`TypeNode`]
//! body, plus the integer constants used as fixed-array lengths.
//!
//! The generator only ever reads a schema. It is built once per run and
//! never mutated afterwards.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SchemaError;

// ---------------------------------------------------------------------------
// ScalarKind
// ---------------------------------------------------------------------------

/// A primitive value kind.
///
/// Each kind fixes three properties of its wire encoding: the
/// [`width`](Self::width) in bytes, whether it is
/// [`signed`](Self::is_signed), and whether it is copied as its raw
/// in-memory layout ([`is_raw_layout`](Self::is_raw_layout)) instead of
/// going through the byte-order policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    /// Host-sized unsigned integer; always 8 bytes on the wire.
    Usize,
    /// Host-sized signed integer; always 8 bytes on the wire.
    Isize,
    F32,
    F64,
    Complex32,
    Complex64,
}

impl ScalarKind {
    /// Every kind, in declaration order.
    pub const ALL: [ScalarKind; 15] = [
        Self::Bool,
        Self::U8,
        Self::I8,
        Self::U16,
        Self::I16,
        Self::U32,
        Self::I32,
        Self::U64,
        Self::I64,
        Self::Usize,
        Self::Isize,
        Self::F32,
        Self::F64,
        Self::Complex32,
        Self::Complex64,
    ];

    /// Width of the value in bytes.
    ///
    /// For raw-layout kinds this is the native in-memory size.
    pub fn width(self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::Usize | Self::Isize => 8,
            Self::F64 | Self::Complex32 => 8,
            Self::Complex64 => 16,
        }
    }

    /// Returns `true` for signed integers and for `f32`/`f64`.
    ///
    /// Complex kinds have no sign and return `false`.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::Isize
                | Self::F32
                | Self::F64
        )
    }

    /// Returns `true` for floating point and complex kinds, which are
    /// encoded as a copy of their in-memory representation.
    pub fn is_raw_layout(self) -> bool {
        matches!(
            self,
            Self::F32 | Self::F64 | Self::Complex32 | Self::Complex64
        )
    }

    /// The Rust spelling of this kind.
    pub fn rust_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::Usize => "usize",
            Self::Isize => "isize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Complex32 => "Complex32",
            Self::Complex64 => "Complex64",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_name())
    }
}

// ---------------------------------------------------------------------------
// TypeNode
// ---------------------------------------------------------------------------

/// The length of a fixed-size array: a literal or a named constant.
///
/// Serialized untagged, so `4` and `"BOARD_SIZE"` are both valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArrayLen {
    Literal(usize),
    Const(String),
}

impl fmt::Display for ArrayLen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(n) => write!(f, "{n}"),
            Self::Const(name) => f.write_str(name),
        }
    }
}

/// The structure of one type.
///
/// A closed set: the generator matches on it exhaustively. Constructs the
/// resolver cannot express with the other variants arrive as
/// [`TypeNode::Opaque`] and are rejected at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeNode {
    /// A primitive value.
    Scalar { scalar: ScalarKind },

    /// A reference to another declaration, encoded by that type's own codec.
    Named { name: String },

    /// A UTF-8 string.
    Text,

    /// Ordered fields. Field order is the wire order.
    Record { fields: Vec<Field> },

    /// Exactly `len` elements; the length is never written.
    FixedArray { element: Box<TypeNode>, len: ArrayLen },

    /// A runtime-sized list with a 4-byte count prefix.
    Sequence { element: Box<TypeNode> },

    /// Unique keys mapped to values, with a 4-byte count prefix.
    Mapping {
        key: Box<TypeNode>,
        value: Box<TypeNode>,
    },

    /// Something the resolver found but could not describe structurally
    /// (a pointer, a channel, a function...). `repr` is its source text.
    Opaque { repr: String },
}

impl TypeNode {
    pub fn scalar(scalar: ScalarKind) -> Self {
        Self::Scalar { scalar }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named { name: name.into() }
    }

    pub fn record(fields: Vec<Field>) -> Self {
        Self::Record { fields }
    }

    pub fn array(element: TypeNode, len: ArrayLen) -> Self {
        Self::FixedArray {
            element: Box::new(element),
            len,
        }
    }

    pub fn sequence(element: TypeNode) -> Self {
        Self::Sequence {
            element: Box::new(element),
        }
    }

    pub fn mapping(key: TypeNode, value: TypeNode) -> Self {
        Self::Mapping {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn opaque(repr: impl Into<String>) -> Self {
        Self::Opaque { repr: repr.into() }
    }
}

/// Renders the node in Rust type syntax. Used in diagnostics.
impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar { scalar } => write!(f, "{scalar}"),
            Self::Named { name } => f.write_str(name),
            Self::Text => f.write_str("String"),
            Self::Record { fields } => {
                f.write_str("(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", field.ty)?;
                }
                if fields.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Self::FixedArray { element, len } => write!(f, "[{element}; {len}]"),
            Self::Sequence { element } => write!(f, "Vec<{element}>"),
            Self::Mapping { key, value } => write!(f, "HashMap<{key}, {value}>"),
            Self::Opaque { repr } => f.write_str(repr),
        }
    }
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// One member of a [`TypeNode::Record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// The accessor name. Positional fields use `"0"`, `"1"`, ...
    /// An embedded field may leave this empty; the generator then
    /// derives the accessor from the embedded type's name.
    #[serde(default)]
    pub name: String,

    /// The field's type.
    #[serde(rename = "type")]
    pub ty: TypeNode,

    /// `true` for an anonymous (embedded) member.
    #[serde(default)]
    pub embedded: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeNode) -> Self {
        Self {
            name: name.into(),
            ty,
            embedded: false,
        }
    }

    /// An embedded member whose accessor is derived from its type.
    pub fn embedded(ty: TypeNode) -> Self {
        Self {
            name: String::new(),
            ty,
            embedded: true,
        }
    }

    /// Returns `true` when the name is a tuple position (`"0"`, `"1"`, ...).
    pub fn is_positional(&self) -> bool {
        !self.name.is_empty() && self.name.bytes().all(|b| b.is_ascii_digit())
    }
}

// ---------------------------------------------------------------------------
// TypeDecl
// ---------------------------------------------------------------------------

/// A named type declaration.
///
/// A [`TypeNode::Record`] body declares a struct. Any other body declares
/// a newtype (`struct Name(body)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub body: TypeNode,

    /// The source file the declaration came from, if known.
    #[serde(default)]
    pub source: Option<String>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, body: TypeNode) -> Self {
        Self {
            name: name.into(),
            body,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns `true` if the body is a record (a struct declaration).
    pub fn is_record(&self) -> bool {
        matches!(self.body, TypeNode::Record { .. })
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Every declaration available to one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// The package (module) the declarations belong to.
    #[serde(default)]
    pub package: String,

    /// The source file the declarations were read from.
    #[serde(default)]
    pub source: String,

    /// Declarations in source order.
    #[serde(default)]
    pub types: Vec<TypeDecl>,

    /// Integer constants usable as fixed-array lengths.
    #[serde(default)]
    pub constants: BTreeMap<String, usize>,
}

impl Schema {
    pub fn new(package: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    /// Adds a declaration. Builder-style.
    pub fn with_type(mut self, decl: TypeDecl) -> Self {
        self.types.push(decl);
        self
    }

    /// Adds a constant. Builder-style.
    pub fn with_constant(mut self, name: impl Into<String>, value: usize) -> Self {
        self.constants.insert(name.into(), value);
        self
    }

    /// Parses the resolver's JSON document.
    ///
    /// # Errors
    /// Returns [`SchemaError::Parse`] if the document is malformed.
    #[cfg(feature = "json")]
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Looks up a declaration by name.
    pub fn get(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|decl| decl.name == name)
    }

    /// Resolves a requested type name.
    ///
    /// # Errors
    /// - [`SchemaError::NotAType`] — the name is a constant
    /// - [`SchemaError::NotFound`] — the name is unknown
    pub fn resolve(&self, name: &str) -> Result<&TypeDecl, SchemaError> {
        if let Some(decl) = self.get(name) {
            return Ok(decl);
        }
        if self.constants.contains_key(name) {
            return Err(SchemaError::NotAType(name.to_string()));
        }
        Err(SchemaError::NotFound(name.to_string()))
    }

    /// Evaluates a fixed-array length.
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownConstant`] for an undefined constant.
    pub fn array_len(&self, len: &ArrayLen) -> Result<usize, SchemaError> {
        match len {
            ArrayLen::Literal(n) => Ok(*n),
            ArrayLen::Const(name) => self
                .constants
                .get(name)
                .copied()
                .ok_or_else(|| SchemaError::UnknownConstant(name.clone())),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The resolver hands schemas over as JSON, so the serde shapes are
    //! part of the interface and are pinned here.

    use super::*;

    fn sample() -> Schema {
        Schema::new("game", "types.rs")
            .with_constant("SLOTS", 3)
            .with_type(TypeDecl::new(
                "Header",
                TypeNode::record(vec![Field::new(
                    "id",
                    TypeNode::scalar(ScalarKind::U32),
                )]),
            ))
            .with_type(TypeDecl::new(
                "Ids",
                TypeNode::sequence(TypeNode::scalar(ScalarKind::U64)),
            ))
    }

    // =====================================================================
    // ScalarKind
    // =====================================================================

    #[test]
    fn test_scalar_widths() {
        assert_eq!(ScalarKind::U8.width(), 1);
        assert_eq!(ScalarKind::I16.width(), 2);
        assert_eq!(ScalarKind::U32.width(), 4);
        assert_eq!(ScalarKind::Usize.width(), 8);
        assert_eq!(ScalarKind::Complex64.width(), 16);
    }

    #[test]
    fn test_scalar_raw_layout_is_floats_and_complex_only() {
        let raw: Vec<_> = ScalarKind::ALL
            .into_iter()
            .filter(|k| k.is_raw_layout())
            .collect();
        assert_eq!(
            raw,
            vec![
                ScalarKind::F32,
                ScalarKind::F64,
                ScalarKind::Complex32,
                ScalarKind::Complex64
            ]
        );
    }

    #[test]
    fn test_scalar_signedness() {
        assert!(ScalarKind::I32.is_signed());
        assert!(!ScalarKind::U32.is_signed());
        assert!(!ScalarKind::Bool.is_signed());
        assert!(ScalarKind::F64.is_signed());
        assert!(!ScalarKind::Complex32.is_signed());
        assert!(!ScalarKind::Complex64.is_signed());
    }

    #[test]
    fn test_scalar_serializes_lowercase() {
        let json = serde_json::to_string(&ScalarKind::Complex32).unwrap();
        assert_eq!(json, "\"complex32\"");
    }

    // =====================================================================
    // TypeNode
    // =====================================================================

    #[test]
    fn test_type_node_is_internally_tagged() {
        let node = TypeNode::sequence(TypeNode::Text);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "sequence");
        assert_eq!(json["element"]["kind"], "text");
    }

    #[test]
    fn test_array_len_accepts_number_or_constant_name() {
        let lit: TypeNode = serde_json::from_str(
            r#"{"kind":"fixed_array","element":{"kind":"text"},"len":4}"#,
        )
        .unwrap();
        assert_eq!(lit, TypeNode::array(TypeNode::Text, ArrayLen::Literal(4)));

        let named: TypeNode = serde_json::from_str(
            r#"{"kind":"fixed_array","element":{"kind":"text"},"len":"SLOTS"}"#,
        )
        .unwrap();
        assert_eq!(
            named,
            TypeNode::array(TypeNode::Text, ArrayLen::Const("SLOTS".into()))
        );
    }

    #[test]
    fn test_type_node_display_uses_rust_syntax() {
        let node = TypeNode::mapping(
            TypeNode::Text,
            TypeNode::array(
                TypeNode::scalar(ScalarKind::I16),
                ArrayLen::Const("N".into()),
            ),
        );
        assert_eq!(node.to_string(), "HashMap<String, [i16; N]>");
        assert_eq!(TypeNode::opaque("*mut u8").to_string(), "*mut u8");
        assert_eq!(
            TypeNode::record(vec![Field::new("0", TypeNode::Text)]).to_string(),
            "(String,)"
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result: Result<TypeNode, _> =
            serde_json::from_str(r#"{"kind":"channel"}"#);
        assert!(result.is_err());
    }

    // =====================================================================
    // Field
    // =====================================================================

    #[test]
    fn test_field_defaults_when_missing() {
        let field: Field =
            serde_json::from_str(r#"{"type":{"kind":"named","name":"Header"}}"#)
                .unwrap();
        assert!(field.name.is_empty());
        assert!(!field.embedded);
    }

    #[test]
    fn test_field_is_positional() {
        assert!(Field::new("0", TypeNode::Text).is_positional());
        assert!(Field::new("12", TypeNode::Text).is_positional());
        assert!(!Field::new("x0", TypeNode::Text).is_positional());
        assert!(!Field::embedded(TypeNode::named("H")).is_positional());
    }

    // =====================================================================
    // Schema
    // =====================================================================

    #[test]
    fn test_resolve_finds_declaration() {
        let schema = sample();
        let decl = schema.resolve("Header").unwrap();
        assert!(decl.is_record());
        assert!(!schema.resolve("Ids").unwrap().is_record());
    }

    #[test]
    fn test_resolve_missing_type() {
        let err = sample().resolve("Nope").unwrap_err();
        assert!(matches!(err, SchemaError::NotFound(ref n) if n == "Nope"));
        assert_eq!(err.to_string(), "type not found: Nope");
    }

    #[test]
    fn test_resolve_constant_is_not_a_type() {
        let err = sample().resolve("SLOTS").unwrap_err();
        assert!(matches!(err, SchemaError::NotAType(_)));
        assert_eq!(err.to_string(), "SLOTS is not a type");
    }

    #[test]
    fn test_array_len_resolves_constants() {
        let schema = sample();
        assert_eq!(schema.array_len(&ArrayLen::Literal(7)).unwrap(), 7);
        assert_eq!(schema.array_len(&ArrayLen::Const("SLOTS".into())).unwrap(), 3);
        assert!(matches!(
            schema.array_len(&ArrayLen::Const("MISSING".into())),
            Err(SchemaError::UnknownConstant(_))
        ));
    }

    #[test]
    fn test_schema_json_round_trip() {
        let schema = sample();
        let text = serde_json::to_string(&schema).unwrap();
        let parsed = Schema::from_json(&text).unwrap();
        assert_eq!(parsed, schema);
    }

    #[test]
    fn test_schema_from_garbage_is_parse_error() {
        let err = Schema::from_json("not json").unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }
}
