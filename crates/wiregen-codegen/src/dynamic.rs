//! Dynamic codec: executes codec plans against a [`Value`] tree.
//!
//! The interpreter walks the same [`LenOp`], [`EncOp`] and [`DecOp`]
//! sequences the emitter renders, so for any schema it produces the bytes
//! the generated impls would. It serves tooling that only learns the
//! schema at run time.
//!
//! # Value shapes
//!
//! | Schema node          | Value                                     |
//! |----------------------|-------------------------------------------|
//! | scalar               | the matching scalar variant               |
//! | `Text`               | [`Value::Text`]                           |
//! | record / inline tuple| [`Value::Record`], members in order       |
//! | non-record decl body | [`Value::Record`] with one member         |
//! | `FixedArray`         | [`Value::Array`]                          |
//! | `Sequence`           | [`Value::Seq`]                            |
//! | `Mapping`            | [`Value::Map`], entries in iteration order |
//!
//! A [`Value::Array`] must hold exactly the declared element count, and a
//! [`Value::Map`] must not repeat a key; anything else is rejected before a
//! byte is written, so every encoded value decodes back to itself.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use wiregen_runtime::{ByteOrder, Complex32, Complex64, Reader, WireError, Writer};
use wiregen_schema::{ScalarKind, Schema};

use crate::plan::{CodecPlan, DecOp, EncOp, LenOp, Place, Var};
use crate::rules::COUNT_PREFIX;
use crate::{DynamicError, GenError, GeneratorConfig, Walker, check_cycles};

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A schema-shaped value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    Usize(usize),
    Isize(isize),
    F32(f32),
    F64(f64),
    Complex32(Complex32),
    Complex64(Complex64),
    Text(String),
    Record(Vec<Value>),
    Array(Vec<Value>),
    Seq(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Short name of the variant, used in mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::I8(_) => "i8",
            Self::U16(_) => "u16",
            Self::I16(_) => "i16",
            Self::U32(_) => "u32",
            Self::I32(_) => "i32",
            Self::U64(_) => "u64",
            Self::I64(_) => "i64",
            Self::Usize(_) => "usize",
            Self::Isize(_) => "isize",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Complex32(_) => "Complex32",
            Self::Complex64(_) => "Complex64",
            Self::Text(_) => "text",
            Self::Record(_) => "record",
            Self::Array(_) => "array",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "mapping",
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// The zero value of a scalar kind.
    pub fn default_scalar(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => Self::Bool(false),
            ScalarKind::U8 => Self::U8(0),
            ScalarKind::I8 => Self::I8(0),
            ScalarKind::U16 => Self::U16(0),
            ScalarKind::I16 => Self::I16(0),
            ScalarKind::U32 => Self::U32(0),
            ScalarKind::I32 => Self::I32(0),
            ScalarKind::U64 => Self::U64(0),
            ScalarKind::I64 => Self::I64(0),
            ScalarKind::Usize => Self::Usize(0),
            ScalarKind::Isize => Self::Isize(0),
            ScalarKind::F32 => Self::F32(0.0),
            ScalarKind::F64 => Self::F64(0.0),
            ScalarKind::Complex32 => Self::Complex32(Complex32::default()),
            ScalarKind::Complex64 => Self::Complex64(Complex64::default()),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    usize => Usize,
    isize => Isize,
    f32 => F32,
    f64 => F64,
    Complex32 => Complex32,
    Complex64 => Complex64,
    String => Text,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

// ---------------------------------------------------------------------------
// DynamicCodec
// ---------------------------------------------------------------------------

/// Loop bindings during the length and encode passes.
type Bindings<'p, 'v> = HashMap<&'p str, &'v Value>;

/// Decoded locals during the decode pass.
type Locals = HashMap<String, Value>;

/// Plans for every declaration of one schema, executable on [`Value`]s.
#[derive(Debug, Clone)]
pub struct DynamicCodec {
    plans: HashMap<String, CodecPlan>,
}

impl DynamicCodec {
    /// Plans every declaration in `schema`.
    ///
    /// # Errors
    /// Any [`GenError`] the walker or cycle check raises for any
    /// declaration. A schema the generator would reject as a whole is
    /// rejected here too.
    pub fn new(schema: &Schema, config: &GeneratorConfig) -> Result<Self, GenError> {
        let names: Vec<&str> = schema.types.iter().map(|d| d.name.as_str()).collect();
        check_cycles(schema, &names)?;

        let walker = Walker::new(schema, config);
        let mut plans = HashMap::with_capacity(schema.types.len());
        for decl in &schema.types {
            plans.insert(decl.name.clone(), walker.plan(decl)?);
        }
        tracing::debug!(package = %schema.package, types = plans.len(), "dynamic codec ready");
        Ok(Self { plans })
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.plans.contains_key(type_name)
    }

    /// The plan executed for `type_name`.
    pub fn plan(&self, type_name: &str) -> Option<&CodecPlan> {
        self.plans.get(type_name)
    }

    /// Exact number of bytes [`encode`](Self::encode) writes for `value`.
    pub fn wire_len(&self, type_name: &str, value: &Value) -> Result<usize, DynamicError> {
        let plan = self.plan_for(type_name)?;
        let mut env = Bindings::new();
        self.measure(&plan.length, value, &mut env)
    }

    /// Writes `value` as `type_name` at the writer's cursor.
    pub fn encode(
        &self,
        type_name: &str,
        value: &Value,
        w: &mut Writer<'_>,
    ) -> Result<(), DynamicError> {
        let plan = self.plan_for(type_name)?;
        let mut env = Bindings::new();
        self.write(&plan.encode, value, &mut env, w)
    }

    /// Reads one `type_name` value from the reader's cursor.
    pub fn decode(&self, type_name: &str, r: &mut Reader<'_>) -> Result<Value, DynamicError> {
        let plan = self.plan_for(type_name)?;
        let mut locals = Locals::new();
        self.read(&plan.decode, r, &mut locals)?;
        take(&mut locals, &plan.result)
    }

    /// Encodes into a buffer of exactly `wire_len` bytes.
    pub fn to_vec(
        &self,
        type_name: &str,
        value: &Value,
        order: ByteOrder,
    ) -> Result<Vec<u8>, DynamicError> {
        let mut buf = vec![0u8; self.wire_len(type_name, value)?];
        let mut w = Writer::new(&mut buf, order);
        self.encode(type_name, value, &mut w)?;
        Ok(buf)
    }

    /// Decodes from the front of `buf`, returning the value and the
    /// unread remainder.
    pub fn decode_prefix<'b>(
        &self,
        type_name: &str,
        buf: &'b [u8],
        order: ByteOrder,
    ) -> Result<(Value, &'b [u8]), DynamicError> {
        let mut r = Reader::new(buf, order);
        let value = self.decode(type_name, &mut r)?;
        Ok((value, r.rest()))
    }

    /// Decodes a value that must span all of `buf`.
    pub fn from_slice(
        &self,
        type_name: &str,
        buf: &[u8],
        order: ByteOrder,
    ) -> Result<Value, DynamicError> {
        let (value, rest) = self.decode_prefix(type_name, buf, order)?;
        if !rest.is_empty() {
            return Err(WireError::TrailingBytes(rest.len()).into());
        }
        Ok(value)
    }

    fn plan_for(&self, type_name: &str) -> Result<&CodecPlan, DynamicError> {
        self.plans
            .get(type_name)
            .ok_or_else(|| DynamicError::UnknownType(type_name.to_string()))
    }

    // -- length pass --

    fn measure<'p, 'v>(
        &self,
        ops: &'p [LenOp],
        root: &'v Value,
        env: &mut Bindings<'p, 'v>,
    ) -> Result<usize, DynamicError> {
        let mut n = 0;
        for op in ops {
            match op {
                LenOp::Fixed(width) => n += width,
                LenOp::Text(at) => n += COUNT_PREFIX + as_text(locate(at, root, env)?)?.len(),
                LenOp::Nested { type_name, at } => {
                    n += self.wire_len(type_name, locate(at, root, env)?)?;
                }
                LenOp::Array {
                    over,
                    count,
                    item,
                    body,
                } => {
                    for element in array_elements(locate(over, root, env)?, *count)? {
                        env.insert(item.name(), element);
                        n += self.measure(body, root, env)?;
                    }
                }
                LenOp::Each { over, item, body } => {
                    for element in seq_elements(locate(over, root, env)?)? {
                        env.insert(item.name(), element);
                        n += self.measure(body, root, env)?;
                    }
                }
                LenOp::EachEntry {
                    over,
                    key,
                    value,
                    body,
                } => {
                    for (k, v) in entries(locate(over, root, env)?)? {
                        env.insert(key.name(), k);
                        env.insert(value.name(), v);
                        n += self.measure(body, root, env)?;
                    }
                }
            }
        }
        Ok(n)
    }

    // -- encode pass --

    fn write<'p, 'v>(
        &self,
        ops: &'p [EncOp],
        root: &'v Value,
        env: &mut Bindings<'p, 'v>,
        w: &mut Writer<'_>,
    ) -> Result<(), DynamicError> {
        for op in ops {
            match op {
                EncOp::Scalar { kind, at } => put_scalar(*kind, locate(at, root, env)?, w)?,
                EncOp::Text(at) => w.put_str(as_text(locate(at, root, env)?)?)?,
                EncOp::Count(at) => {
                    let target = locate(at, root, env)?;
                    let count = match target {
                        Value::Seq(items) => items.len(),
                        Value::Map(_) => entries(target)?.len(),
                        other => return Err(mismatch("sequence or mapping", other)),
                    };
                    w.put_len(count)?;
                }
                EncOp::Nested { type_name, at } => {
                    self.encode(type_name, locate(at, root, env)?, w)?;
                }
                EncOp::Array {
                    over,
                    count,
                    item,
                    body,
                } => {
                    for element in array_elements(locate(over, root, env)?, *count)? {
                        env.insert(item.name(), element);
                        self.write(body, root, env, w)?;
                    }
                }
                EncOp::Each { over, item, body } => {
                    for element in seq_elements(locate(over, root, env)?)? {
                        env.insert(item.name(), element);
                        self.write(body, root, env, w)?;
                    }
                }
                EncOp::EachEntry {
                    over,
                    key,
                    value,
                    body,
                } => {
                    for (k, v) in entries(locate(over, root, env)?)? {
                        env.insert(key.name(), k);
                        env.insert(value.name(), v);
                        self.write(body, root, env, w)?;
                    }
                }
            }
        }
        Ok(())
    }

    // -- decode pass --

    fn read(
        &self,
        ops: &[DecOp],
        r: &mut Reader<'_>,
        locals: &mut Locals,
    ) -> Result<(), DynamicError> {
        for op in ops {
            let (into, value) = match op {
                DecOp::Scalar { kind, into } => (into, get_scalar(*kind, r)?),
                DecOp::Omitted { kind, into } => (into, Value::default_scalar(*kind)),
                DecOp::Text { into } => (into, Value::Text(r.get_string()?)),
                DecOp::Nested { type_name, into } => (into, self.decode(type_name, r)?),
                DecOp::Record { fields, into, .. } => {
                    let members = fields
                        .iter()
                        .map(|(_, var)| take(locals, var))
                        .collect::<Result<Vec<_>, _>>()?;
                    (into, Value::Record(members))
                }
                DecOp::Array {
                    count,
                    item,
                    body,
                    into,
                    ..
                } => {
                    let mut items = Vec::with_capacity(*count);
                    for _ in 0..*count {
                        self.read(body, r, locals)?;
                        items.push(take(locals, item)?);
                    }
                    (into, Value::Array(items))
                }
                DecOp::Sequence { item, body, into } => {
                    let count = r.get_len()?;
                    let mut items = Vec::with_capacity(r.capacity_hint(count));
                    for _ in 0..count {
                        self.read(body, r, locals)?;
                        items.push(take(locals, item)?);
                    }
                    (into, Value::Seq(items))
                }
                DecOp::Mapping {
                    key,
                    value,
                    body,
                    into,
                } => {
                    let count = r.get_len()?;
                    let mut pairs: Vec<(Value, Value)> =
                        Vec::with_capacity(r.capacity_hint(count));
                    let mut index: HashMap<Vec<u8>, usize> = HashMap::with_capacity(r.capacity_hint(count));
                    for _ in 0..count {
                        self.read(body, r, locals)?;
                        let k = take(locals, key)?;
                        let v = take(locals, value)?;
                        // A repeated key overwrites the earlier entry.
                        match index.entry(key_image(&k)) {
                            Entry::Occupied(slot) => pairs[*slot.get()].1 = v,
                            Entry::Vacant(slot) => {
                                slot.insert(pairs.len());
                                pairs.push((k, v));
                            }
                        }
                    }
                    (into, Value::Map(pairs))
                }
            };
            locals.insert(into.name().to_string(), value);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn mismatch(expected: &str, found: &Value) -> DynamicError {
    DynamicError::Mismatch {
        expected: expected.to_string(),
        found: found.kind_name().to_string(),
    }
}

fn locate<'v>(at: &Place, root: &'v Value, env: &Bindings<'_, 'v>) -> Result<&'v Value, DynamicError> {
    match at {
        Place::SelfValue => Ok(root),
        Place::Var(var) => env.get(var.name()).copied().ok_or_else(|| unbound(var)),
        Place::Field { parent, index, .. } => match locate(parent, root, env)? {
            Value::Record(members) => members.get(*index).ok_or_else(|| DynamicError::Mismatch {
                expected: format!("record with at least {} members", index + 1),
                found: format!("record with {}", members.len()),
            }),
            other => Err(mismatch("record", other)),
        },
    }
}

fn take(locals: &mut Locals, var: &Var) -> Result<Value, DynamicError> {
    locals.remove(var.name()).ok_or_else(|| unbound(var))
}

fn unbound(var: &Var) -> DynamicError {
    DynamicError::Mismatch {
        expected: format!("a value bound to {var}"),
        found: "nothing".to_string(),
    }
}

fn as_text(value: &Value) -> Result<&str, DynamicError> {
    match value {
        Value::Text(s) => Ok(s),
        other => Err(mismatch("text", other)),
    }
}

fn array_elements(value: &Value, count: usize) -> Result<&[Value], DynamicError> {
    match value {
        Value::Array(items) if items.len() == count => Ok(items),
        Value::Array(items) => Err(DynamicError::Mismatch {
            expected: format!("array of {count}"),
            found: format!("array of {}", items.len()),
        }),
        other => Err(mismatch("array", other)),
    }
}

fn seq_elements(value: &Value) -> Result<&[Value], DynamicError> {
    match value {
        Value::Seq(items) => Ok(items),
        other => Err(mismatch("sequence", other)),
    }
}

/// The entries of a mapping, which must not repeat a key.
fn entries(value: &Value) -> Result<&[(Value, Value)], DynamicError> {
    let Value::Map(pairs) = value else {
        return Err(mismatch("mapping", value));
    };
    let mut seen = HashSet::with_capacity(pairs.len());
    for (k, _) in pairs {
        if !seen.insert(key_image(k)) {
            return Err(DynamicError::Mismatch {
                expected: "mapping with unique keys".to_string(),
                found: format!("duplicate {} key", k.kind_name()),
            });
        }
    }
    Ok(pairs)
}

/// A byte image identifying a key. Floats compare by bit pattern.
fn key_image(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_image(value, &mut out);
    out
}

fn write_image(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Bool(v) => tagged(out, 0, &[u8::from(*v)]),
        Value::U8(v) => tagged(out, 1, &v.to_le_bytes()),
        Value::I8(v) => tagged(out, 2, &v.to_le_bytes()),
        Value::U16(v) => tagged(out, 3, &v.to_le_bytes()),
        Value::I16(v) => tagged(out, 4, &v.to_le_bytes()),
        Value::U32(v) => tagged(out, 5, &v.to_le_bytes()),
        Value::I32(v) => tagged(out, 6, &v.to_le_bytes()),
        Value::U64(v) => tagged(out, 7, &v.to_le_bytes()),
        Value::I64(v) => tagged(out, 8, &v.to_le_bytes()),
        Value::Usize(v) => tagged(out, 9, &v.to_le_bytes()),
        Value::Isize(v) => tagged(out, 10, &v.to_le_bytes()),
        Value::F32(v) => tagged(out, 11, &v.to_bits().to_le_bytes()),
        Value::F64(v) => tagged(out, 12, &v.to_bits().to_le_bytes()),
        Value::Complex32(v) => {
            tagged(out, 13, &v.re.to_bits().to_le_bytes());
            out.extend_from_slice(&v.im.to_bits().to_le_bytes());
        }
        Value::Complex64(v) => {
            tagged(out, 14, &v.re.to_bits().to_le_bytes());
            out.extend_from_slice(&v.im.to_bits().to_le_bytes());
        }
        Value::Text(s) => {
            tagged(out, 15, &(s.len() as u64).to_le_bytes());
            out.extend_from_slice(s.as_bytes());
        }
        Value::Record(items) => write_items(out, 16, items),
        Value::Array(items) => write_items(out, 17, items),
        Value::Seq(items) => write_items(out, 18, items),
        Value::Map(pairs) => {
            tagged(out, 19, &(pairs.len() as u64).to_le_bytes());
            for (k, v) in pairs {
                write_image(k, out);
                write_image(v, out);
            }
        }
    }
}

fn tagged(out: &mut Vec<u8>, tag: u8, bytes: &[u8]) {
    out.push(tag);
    out.extend_from_slice(bytes);
}

fn write_items(out: &mut Vec<u8>, tag: u8, items: &[Value]) {
    tagged(out, tag, &(items.len() as u64).to_le_bytes());
    for item in items {
        write_image(item, out);
    }
}

fn put_scalar(kind: ScalarKind, value: &Value, w: &mut Writer<'_>) -> Result<(), DynamicError> {
    match (kind, value) {
        (ScalarKind::Bool, Value::Bool(v)) => w.put_bool(*v)?,
        (ScalarKind::U8, Value::U8(v)) => w.put_u8(*v)?,
        (ScalarKind::I8, Value::I8(v)) => w.put_i8(*v)?,
        (ScalarKind::U16, Value::U16(v)) => w.put_u16(*v)?,
        (ScalarKind::I16, Value::I16(v)) => w.put_i16(*v)?,
        (ScalarKind::U32, Value::U32(v)) => w.put_u32(*v)?,
        (ScalarKind::I32, Value::I32(v)) => w.put_i32(*v)?,
        (ScalarKind::U64, Value::U64(v)) => w.put_u64(*v)?,
        (ScalarKind::I64, Value::I64(v)) => w.put_i64(*v)?,
        (ScalarKind::Usize, Value::Usize(v)) => w.put_usize(*v)?,
        (ScalarKind::Isize, Value::Isize(v)) => w.put_isize(*v)?,
        (ScalarKind::F32, Value::F32(v)) => w.put_f32_raw(*v)?,
        (ScalarKind::F64, Value::F64(v)) => w.put_f64_raw(*v)?,
        (ScalarKind::Complex32, Value::Complex32(v)) => w.put_complex32_raw(*v)?,
        (ScalarKind::Complex64, Value::Complex64(v)) => w.put_complex64_raw(*v)?,
        (kind, other) => return Err(mismatch(kind.rust_name(), other)),
    }
    Ok(())
}

fn get_scalar(kind: ScalarKind, r: &mut Reader<'_>) -> Result<Value, WireError> {
    Ok(match kind {
        ScalarKind::Bool => Value::Bool(r.get_bool()?),
        ScalarKind::U8 => Value::U8(r.get_u8()?),
        ScalarKind::I8 => Value::I8(r.get_i8()?),
        ScalarKind::U16 => Value::U16(r.get_u16()?),
        ScalarKind::I16 => Value::I16(r.get_i16()?),
        ScalarKind::U32 => Value::U32(r.get_u32()?),
        ScalarKind::I32 => Value::I32(r.get_i32()?),
        ScalarKind::U64 => Value::U64(r.get_u64()?),
        ScalarKind::I64 => Value::I64(r.get_i64()?),
        ScalarKind::Usize => Value::Usize(r.get_usize()?),
        ScalarKind::Isize => Value::Isize(r.get_isize()?),
        ScalarKind::F32 => Value::F32(r.get_f32_raw()?),
        ScalarKind::F64 => Value::F64(r.get_f64_raw()?),
        ScalarKind::Complex32 => Value::Complex32(r.get_complex32_raw()?),
        ScalarKind::Complex64 => Value::Complex64(r.get_complex64_raw()?),
    })
}
