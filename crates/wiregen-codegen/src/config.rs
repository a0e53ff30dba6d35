//! Generator configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GeneratorConfig
// ---------------------------------------------------------------------------

/// Settings for one generation run.
///
/// Every field has a default, so a JSON request may omit the whole
/// object or any part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// How `bool` scalars are put on the wire.
    pub bool_encoding: BoolEncoding,

    /// How generated impls are grouped into output units.
    pub grouping: OutputGrouping,

    /// Path, relative to a generated unit, of the module declaring the
    /// schema types. Units are meant to be child modules of it.
    pub types_path: String,

    /// Path to the runtime crate as seen from generated code.
    pub runtime_path: String,

    /// Appended to the unit stem to form its file name.
    pub file_suffix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            bool_encoding: BoolEncoding::Byte,
            grouping: OutputGrouping::PerType,
            types_path: "super".to_string(),
            runtime_path: "::wiregen_runtime".to_string(),
            file_suffix: "_wire.rs".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// BoolEncoding
// ---------------------------------------------------------------------------

/// Wire representation of booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolEncoding {
    /// One byte, `0` or `1`. Decoding any other byte is an error.
    #[default]
    Byte,

    /// Zero bytes: encode writes nothing and decode yields `false`.
    /// Only for reading data produced by encoders that never wrote
    /// booleans; values do not survive a round trip.
    Omitted,
}

// ---------------------------------------------------------------------------
// OutputGrouping
// ---------------------------------------------------------------------------

/// Which output unit a type's impl is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputGrouping {
    /// One unit per requested type: `<snake_name><suffix>`.
    #[default]
    PerType,

    /// One unit per declaring source file: `<source stem><suffix>`.
    /// Types without a source fall back to the schema's source.
    PerSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.bool_encoding, BoolEncoding::Byte);
        assert_eq!(config.grouping, OutputGrouping::PerType);
        assert_eq!(config.types_path, "super");
        assert_eq!(config.runtime_path, "::wiregen_runtime");
        assert_eq!(config.file_suffix, "_wire.rs");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"bool_encoding":"omitted"}"#).unwrap();
        assert_eq!(config.bool_encoding, BoolEncoding::Omitted);
        assert_eq!(config.grouping, OutputGrouping::PerType);
    }

    #[test]
    fn test_grouping_serializes_snake_case() {
        let json = serde_json::to_string(&OutputGrouping::PerSource).unwrap();
        assert_eq!(json, "\"per_source\"");
    }
}
