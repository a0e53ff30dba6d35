//! Primitive codec rules: the fixed mapping from a scalar kind to its
//! wire encoding and to the runtime cursor methods that implement it.

use wiregen_runtime::LEN_PREFIX;
use wiregen_schema::ScalarKind;

use crate::{BoolEncoding, GeneratorConfig};

/// Bytes occupied by a text length or collection count.
pub const COUNT_PREFIX: usize = LEN_PREFIX;

/// How a scalar reaches the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// One byte; byte order is irrelevant.
    SingleByte,
    /// Fixed width in the active byte order.
    Ordered,
    /// A copy of the in-memory bit pattern, byte order ignored.
    RawLayout,
    /// Not written at all.
    Omitted,
}

/// The wire encoding of one scalar kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarRule {
    pub kind: ScalarKind,
    pub encoding: Encoding,
    /// Bytes on the wire.
    pub width: usize,
    /// `Writer` method that puts the value.
    pub put: &'static str,
    /// `Reader` method that gets the value.
    pub get: &'static str,
}

/// Looks up the rule for `kind` under `config`.
pub fn scalar_rule(kind: ScalarKind, config: &GeneratorConfig) -> ScalarRule {
    let (encoding, put, get) = match kind {
        ScalarKind::Bool => match config.bool_encoding {
            BoolEncoding::Byte => (Encoding::SingleByte, "put_bool", "get_bool"),
            BoolEncoding::Omitted => (Encoding::Omitted, "", ""),
        },
        ScalarKind::U8 => (Encoding::SingleByte, "put_u8", "get_u8"),
        ScalarKind::I8 => (Encoding::SingleByte, "put_i8", "get_i8"),
        ScalarKind::U16 => (Encoding::Ordered, "put_u16", "get_u16"),
        ScalarKind::I16 => (Encoding::Ordered, "put_i16", "get_i16"),
        ScalarKind::U32 => (Encoding::Ordered, "put_u32", "get_u32"),
        ScalarKind::I32 => (Encoding::Ordered, "put_i32", "get_i32"),
        ScalarKind::U64 => (Encoding::Ordered, "put_u64", "get_u64"),
        ScalarKind::I64 => (Encoding::Ordered, "put_i64", "get_i64"),
        ScalarKind::Usize => (Encoding::Ordered, "put_usize", "get_usize"),
        ScalarKind::Isize => (Encoding::Ordered, "put_isize", "get_isize"),
        ScalarKind::F32 => (Encoding::RawLayout, "put_f32_raw", "get_f32_raw"),
        ScalarKind::F64 => (Encoding::RawLayout, "put_f64_raw", "get_f64_raw"),
        ScalarKind::Complex32 => {
            (Encoding::RawLayout, "put_complex32_raw", "get_complex32_raw")
        }
        ScalarKind::Complex64 => {
            (Encoding::RawLayout, "put_complex64_raw", "get_complex64_raw")
        }
    };
    let width = match encoding {
        Encoding::Omitted => 0,
        _ => kind.width(),
    };
    ScalarRule {
        kind,
        encoding,
        width,
        put,
        get,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widths() {
        let config = GeneratorConfig::default();
        let widths: Vec<_> = [
            ScalarKind::U8,
            ScalarKind::I16,
            ScalarKind::U32,
            ScalarKind::I64,
            ScalarKind::Usize,
        ]
        .into_iter()
        .map(|k| scalar_rule(k, &config).width)
        .collect();
        assert_eq!(widths, vec![1, 2, 4, 8, 8]);
    }

    #[test]
    fn test_multi_byte_integers_follow_byte_order() {
        let config = GeneratorConfig::default();
        assert_eq!(scalar_rule(ScalarKind::U16, &config).encoding, Encoding::Ordered);
        assert_eq!(scalar_rule(ScalarKind::U8, &config).encoding, Encoding::SingleByte);
    }

    #[test]
    fn test_floats_use_raw_layout() {
        let config = GeneratorConfig::default();
        for kind in ScalarKind::ALL.into_iter().filter(|k| k.is_raw_layout()) {
            let rule = scalar_rule(kind, &config);
            assert_eq!(rule.encoding, Encoding::RawLayout);
            assert!(rule.put.ends_with("_raw"));
        }
    }

    #[test]
    fn test_bool_encoding_is_configurable() {
        let byte = scalar_rule(ScalarKind::Bool, &GeneratorConfig::default());
        assert_eq!(byte.width, 1);
        assert_eq!(byte.put, "put_bool");

        let config = GeneratorConfig {
            bool_encoding: BoolEncoding::Omitted,
            ..GeneratorConfig::default()
        };
        let omitted = scalar_rule(ScalarKind::Bool, &config);
        assert_eq!(omitted.encoding, Encoding::Omitted);
        assert_eq!(omitted.width, 0);
    }

    #[test]
    fn test_count_prefix_is_four_bytes() {
        assert_eq!(COUNT_PREFIX, 4);
    }
}
