//! Operation sequences produced by the walker.
//!
//! A [`CodecPlan`] holds one sequence per pass. Length and encode ops
//! read from [`Place`]s (access paths into the value); decode ops bind
//! fresh locals ([`Var`]) and assemble them bottom-up. The emitter renders
//! these sequences as Rust source and the dynamic interpreter executes
//! them directly, so both share one description of the wire format.

use std::fmt;

use wiregen_schema::{ArrayLen, ScalarKind};

/// A local variable introduced by a plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(pub(crate) String);

impl Var {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a record member is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    Named(String),
    Positional(usize),
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) if is_keyword(name) => write!(f, "r#{name}"),
            Self::Named(name) => f.write_str(name),
            Self::Positional(i) => write!(f, "{i}"),
        }
    }
}

/// An access path to the value an op reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Place {
    /// The value the routine was called on.
    SelfValue,
    /// A loop binding. Always a reference in generated code.
    Var(Var),
    /// The `index`-th member of `parent`.
    Field {
        parent: Box<Place>,
        index: usize,
        accessor: Accessor,
    },
}

impl Place {
    pub fn field(&self, index: usize, accessor: Accessor) -> Place {
        Place::Field {
            parent: Box::new(self.clone()),
            index,
            accessor,
        }
    }
}

/// Renders the place as a Rust lvalue path, e.g. `self.items` or `item_2.0`.
impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfValue => f.write_str("self"),
            Self::Var(var) => write!(f, "{var}"),
            Self::Field {
                parent, accessor, ..
            } => write!(f, "{parent}.{accessor}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pass-specific ops
// ---------------------------------------------------------------------------

/// Length pass: each op adds to the running byte count.
#[derive(Debug, Clone, PartialEq)]
pub enum LenOp {
    /// A constant number of bytes (scalars, count prefixes).
    Fixed(usize),
    /// Length prefix plus the UTF-8 length of the text at `at`.
    Text(Place),
    /// The nested type's own `wire_len`.
    Nested { type_name: String, at: Place },
    /// `body` once per element of the fixed array at `over`, which holds
    /// exactly `count` elements.
    Array {
        over: Place,
        count: usize,
        item: Var,
        body: Vec<LenOp>,
    },
    /// `body` once per element of the sequence at `over`.
    Each {
        over: Place,
        item: Var,
        body: Vec<LenOp>,
    },
    /// `body` once per entry of the mapping at `over`.
    EachEntry {
        over: Place,
        key: Var,
        value: Var,
        body: Vec<LenOp>,
    },
}

/// Encode pass: each op writes bytes at the cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum EncOp {
    Scalar { kind: ScalarKind, at: Place },
    Text(Place),
    /// The 4-byte element count of the sequence or mapping at `at`.
    Count(Place),
    Nested { type_name: String, at: Place },
    /// The `count` elements of a fixed array, with no prefix.
    Array {
        over: Place,
        count: usize,
        item: Var,
        body: Vec<EncOp>,
    },
    Each {
        over: Place,
        item: Var,
        body: Vec<EncOp>,
    },
    EachEntry {
        over: Place,
        key: Var,
        value: Var,
        body: Vec<EncOp>,
    },
}

/// How decoded members are assembled into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constructor {
    /// `Self { a, b }`
    Struct,
    /// `Self(a, b)`
    TupleStruct,
    /// `(a, b)`, for records nested inline.
    Tuple,
}

/// Decode pass: each op reads bytes and binds the result to `into`.
#[derive(Debug, Clone, PartialEq)]
pub enum DecOp {
    Scalar { kind: ScalarKind, into: Var },
    /// A scalar that is not on the wire; bound to its default value.
    Omitted { kind: ScalarKind, into: Var },
    Text { into: Var },
    Nested { type_name: String, into: Var },
    /// Assembles previously bound members.
    Record {
        constructor: Constructor,
        fields: Vec<(Accessor, Var)>,
        into: Var,
    },
    /// Exactly `count` elements, each produced by `body` into `item`.
    Array {
        count: usize,
        len: ArrayLen,
        item: Var,
        body: Vec<DecOp>,
        into: Var,
    },
    /// A count prefix, then that many elements.
    Sequence {
        item: Var,
        body: Vec<DecOp>,
        into: Var,
    },
    /// A count prefix, then that many (key, value) pairs.
    Mapping {
        key: Var,
        value: Var,
        body: Vec<DecOp>,
        into: Var,
    },
}

/// The three operation sequences for one declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecPlan {
    pub type_name: String,
    pub length: Vec<LenOp>,
    pub encode: Vec<EncOp>,
    pub decode: Vec<DecOp>,
    /// The local holding the fully decoded value.
    pub result: Var,
}

/// Whether `name` can name a field in generated code, as a raw
/// identifier if it is a keyword.
pub(crate) fn is_field_ident(name: &str) -> bool {
    let mut chars = name.chars();
    let head = matches!(chars.next(), Some(c) if c == '_' || c.is_alphabetic());
    head && chars.all(|c| c == '_' || c.is_alphanumeric())
        && !matches!(name, "_" | "self" | "Self" | "super" | "crate")
}

/// Strict and reserved keywords that need the `r#` prefix.
fn is_keyword(name: &str) -> bool {
    matches!(
        name,
        "abstract"
            | "as"
            | "async"
            | "await"
            | "become"
            | "box"
            | "break"
            | "const"
            | "continue"
            | "do"
            | "dyn"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "final"
            | "fn"
            | "for"
            | "gen"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "macro"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "override"
            | "priv"
            | "pub"
            | "ref"
            | "return"
            | "static"
            | "struct"
            | "trait"
            | "true"
            | "try"
            | "type"
            | "typeof"
            | "unsafe"
            | "unsized"
            | "use"
            | "virtual"
            | "where"
            | "while"
            | "yield"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Var {
        Var(name.to_string())
    }

    #[test]
    fn test_place_renders_as_rust_path() {
        let place = Place::SelfValue
            .field(1, Accessor::Named("items".into()))
            .field(0, Accessor::Positional(0));
        assert_eq!(place.to_string(), "self.items.0");
        assert_eq!(Place::Var(var("item_3")).to_string(), "item_3");
    }

    #[test]
    fn test_keyword_accessor_is_raw_identifier() {
        assert_eq!(Accessor::Named("type".into()).to_string(), "r#type");
        assert_eq!(Accessor::Named("kind".into()).to_string(), "kind");
        for reserved in ["try", "abstract", "become", "box", "do", "final", "macro"] {
            assert_eq!(Accessor::Named(reserved.into()).to_string(), format!("r#{reserved}"));
        }
        for reserved in ["override", "priv", "typeof", "unsized", "virtual"] {
            assert_eq!(Accessor::Named(reserved.into()).to_string(), format!("r#{reserved}"));
        }
    }

    #[test]
    fn test_field_ident_rules() {
        assert!(is_field_ident("count"));
        assert!(is_field_ident("_reserved"));
        assert!(is_field_ident("try"));
        for bad in ["self", "Self", "super", "crate", "_", "a-b", "9lives", ""] {
            assert!(!is_field_ident(bad), "{bad}");
        }
    }
}
