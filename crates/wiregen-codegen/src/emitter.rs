//! The codec emitter: renders a [`CodecPlan`] as a Rust `WireCodec` impl.
//!
//! Output is plain, consistently indented source. It is not run through a
//! formatter; callers that care can pipe it through `rustfmt`.
//!
//! Rendering conventions:
//!
//! - loop bindings are references (`for item_1 in self.items.iter()`), so
//!   scalar reads through a bare binding are dereferenced (`*item_1`)
//! - decoded members are bound to fresh locals and assembled last
//! - map decoders collect `(key, value)` pairs, so any `FromIterator`
//!   map type (`HashMap`, `BTreeMap`) works as the field type

use std::fmt::{self, Write};

use wiregen_schema::{ArrayLen, ScalarKind};

use crate::plan::{CodecPlan, Constructor, DecOp, EncOp, LenOp, Place};
use crate::rules::{COUNT_PREFIX, scalar_rule};
use crate::{GenError, GeneratorConfig};

/// Renders plans using the paths configured in [`GeneratorConfig`].
#[derive(Debug, Clone, Copy)]
pub struct Emitter<'c> {
    config: &'c GeneratorConfig,
}

impl<'c> Emitter<'c> {
    pub fn new(config: &'c GeneratorConfig) -> Self {
        Self { config }
    }

    /// Renders the `WireCodec` impl for `plan`.
    pub fn emit(&self, plan: &CodecPlan) -> Result<String, GenError> {
        let mut out = String::new();
        self.write_impl(plan, &mut Source::new(&mut out))?;
        Ok(out)
    }

    fn write_impl(&self, plan: &CodecPlan, src: &mut Source<'_>) -> fmt::Result {
        let rt = &self.config.runtime_path;

        src.line("#[allow(unused_mut, unused_variables, clippy::all)]")?;
        src.open(format_args!("impl {rt}::WireCodec for {} {{", plan.type_name))?;

        src.open("fn wire_len(&self) -> usize {")?;
        if plan.length.is_empty() {
            src.line("0")?;
        } else {
            src.line("let mut n: usize = 0;")?;
            for op in &plan.length {
                self.write_len(op, src)?;
            }
            src.line("n")?;
        }
        src.close("}")?;
        src.blank()?;

        src.open(format_args!(
            "fn encode(&self, w: &mut {rt}::Writer<'_>) -> ::core::result::Result<(), {rt}::WireError> {{"
        ))?;
        for op in &plan.encode {
            self.write_enc(op, src)?;
        }
        src.line("Ok(())")?;
        src.close("}")?;
        src.blank()?;

        src.open(format_args!(
            "fn decode(r: &mut {rt}::Reader<'_>) -> ::core::result::Result<Self, {rt}::WireError> {{"
        ))?;
        for op in &plan.decode {
            self.write_dec(op, src)?;
        }
        src.line(format_args!("Ok({})", plan.result))?;
        src.close("}")?;

        src.close("}")
    }

    fn write_len(&self, op: &LenOp, src: &mut Source<'_>) -> fmt::Result {
        let rt = &self.config.runtime_path;
        match op {
            LenOp::Fixed(width) => src.line(format_args!("n += {width};")),
            LenOp::Text(at) => src.line(format_args!("n += {COUNT_PREFIX} + {at}.len();")),
            LenOp::Nested { at, .. } => src.line(format_args!(
                "n += {rt}::WireCodec::wire_len({});",
                by_ref(at)
            )),
            LenOp::Array {
                over, item, body, ..
            }
            | LenOp::Each { over, item, body } => {
                src.open(format_args!("for {item} in {over}.iter() {{"))?;
                for op in body {
                    self.write_len(op, src)?;
                }
                src.close("}")
            }
            LenOp::EachEntry {
                over,
                key,
                value,
                body,
            } => {
                src.open(format_args!("for ({key}, {value}) in {over}.iter() {{"))?;
                for op in body {
                    self.write_len(op, src)?;
                }
                src.close("}")
            }
        }
    }

    fn write_enc(&self, op: &EncOp, src: &mut Source<'_>) -> fmt::Result {
        let rt = &self.config.runtime_path;
        match op {
            EncOp::Scalar { kind, at } => {
                let rule = scalar_rule(*kind, self.config);
                src.line(format_args!("w.{}({})?;", rule.put, by_value(at)))
            }
            EncOp::Text(at) => src.line(format_args!("w.put_str({})?;", by_ref(at))),
            EncOp::Count(at) => src.line(format_args!("w.put_len({at}.len())?;")),
            EncOp::Nested { at, .. } => src.line(format_args!(
                "{rt}::WireCodec::encode({}, w)?;",
                by_ref(at)
            )),
            EncOp::Array {
                over, item, body, ..
            }
            | EncOp::Each { over, item, body } => {
                src.open(format_args!("for {item} in {over}.iter() {{"))?;
                for op in body {
                    self.write_enc(op, src)?;
                }
                src.close("}")
            }
            EncOp::EachEntry {
                over,
                key,
                value,
                body,
            } => {
                src.open(format_args!("for ({key}, {value}) in {over}.iter() {{"))?;
                for op in body {
                    self.write_enc(op, src)?;
                }
                src.close("}")
            }
        }
    }

    fn write_dec(&self, op: &DecOp, src: &mut Source<'_>) -> fmt::Result {
        let rt = &self.config.runtime_path;
        match op {
            DecOp::Scalar { kind, into } => {
                let rule = scalar_rule(*kind, self.config);
                src.line(format_args!("let {into} = r.{}()?;", rule.get))
            }
            DecOp::Omitted { kind, into } => src.line(format_args!(
                "let {into}: {} = ::core::default::Default::default();",
                self.scalar_type(*kind)
            )),
            DecOp::Text { into } => src.line(format_args!("let {into} = r.get_string()?;")),
            DecOp::Nested { type_name, into } => src.line(format_args!(
                "let {into} = <{type_name} as {rt}::WireCodec>::decode(r)?;"
            )),
            DecOp::Record {
                constructor,
                fields,
                into,
            } => {
                let mut expr = String::new();
                match constructor {
                    Constructor::Struct => {
                        expr.push_str("Self {");
                        for (i, (accessor, var)) in fields.iter().enumerate() {
                            expr.push_str(if i == 0 { " " } else { ", " });
                            write!(expr, "{accessor}: {var}")?;
                        }
                        expr.push_str(if fields.is_empty() { "}" } else { " }" });
                    }
                    Constructor::TupleStruct | Constructor::Tuple => {
                        if *constructor == Constructor::TupleStruct {
                            expr.push_str("Self");
                        }
                        expr.push('(');
                        for (i, (_, var)) in fields.iter().enumerate() {
                            if i > 0 {
                                expr.push_str(", ");
                            }
                            write!(expr, "{var}")?;
                        }
                        if *constructor == Constructor::Tuple && fields.len() == 1 {
                            expr.push(',');
                        }
                        expr.push(')');
                    }
                }
                src.line(format_args!("let {into} = {expr};"))
            }
            DecOp::Array {
                len,
                item,
                body,
                into,
                ..
            } => {
                let len = match len {
                    ArrayLen::Literal(n) => n.to_string(),
                    ArrayLen::Const(name) => format!("{{ {name} }}"),
                };
                src.open(format_args!("let {into} = {rt}::try_array::<_, {len}>(|| {{"))?;
                for op in body {
                    self.write_dec(op, src)?;
                }
                src.line(format_args!("Ok({item})"))?;
                src.close("})?;")
            }
            DecOp::Sequence { item, body, into } => {
                src.open(format_args!("let {into} = {{"))?;
                src.line("let count = r.get_len()?;")?;
                src.line("let mut items = ::std::vec::Vec::with_capacity(r.capacity_hint(count));")?;
                src.open("for _ in 0..count {")?;
                for op in body {
                    self.write_dec(op, src)?;
                }
                src.line(format_args!("items.push({item});"))?;
                src.close("}")?;
                src.line("items")?;
                src.close("};")
            }
            DecOp::Mapping {
                key,
                value,
                body,
                into,
            } => {
                src.open(format_args!("let {into} = {{"))?;
                src.line("let count = r.get_len()?;")?;
                src.line("let mut entries = ::std::vec::Vec::with_capacity(r.capacity_hint(count));")?;
                src.open("for _ in 0..count {")?;
                for op in body {
                    self.write_dec(op, src)?;
                }
                src.line(format_args!("entries.push(({key}, {value}));"))?;
                src.close("}")?;
                src.line("entries.into_iter().collect()")?;
                src.close("};")
            }
        }
    }

    fn scalar_type(&self, kind: ScalarKind) -> String {
        match kind {
            ScalarKind::Complex32 | ScalarKind::Complex64 => {
                format!("{}::{}", self.config.runtime_path, kind.rust_name())
            }
            _ => kind.rust_name().to_string(),
        }
    }
}

/// The place as a value of a `Copy` scalar.
fn by_value(at: &Place) -> String {
    match at {
        Place::Var(var) => format!("*{var}"),
        _ => at.to_string(),
    }
}

/// The place as a shared reference.
fn by_ref(at: &Place) -> String {
    match at {
        Place::Var(var) => var.to_string(),
        _ => format!("&{at}"),
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// An indentation-aware line writer.
pub(crate) struct Source<'o> {
    out: &'o mut String,
    depth: usize,
}

impl<'o> Source<'o> {
    pub(crate) fn new(out: &'o mut String) -> Self {
        Self { out, depth: 0 }
    }

    pub(crate) fn line(&mut self, text: impl fmt::Display) -> fmt::Result {
        for _ in 0..self.depth {
            self.out.push_str("    ");
        }
        writeln!(self.out, "{text}")
    }

    pub(crate) fn blank(&mut self) -> fmt::Result {
        self.out.push('\n');
        Ok(())
    }

    /// Writes `text` and indents the lines that follow.
    fn open(&mut self, text: impl fmt::Display) -> fmt::Result {
        self.line(text)?;
        self.depth += 1;
        Ok(())
    }

    /// Dedents and writes `text`.
    fn close(&mut self, text: impl fmt::Display) -> fmt::Result {
        self.depth = self.depth.saturating_sub(1);
        self.line(text)
    }
}
