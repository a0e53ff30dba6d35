//! Integration tests for the facade and the `wiregen` binary.

use std::io::Write;
use std::process::{Command, Stdio};

use wiregen::prelude::*;

// =========================================================================
// Fixtures
// =========================================================================

fn schema() -> Schema {
    Schema::new("chat", "src/chat.rs")
        .with_type(TypeDecl::new(
            "Msg",
            TypeNode::record(vec![
                Field::new("count", TypeNode::scalar(ScalarKind::U32)),
                Field::new("items", TypeNode::sequence(TypeNode::Text)),
            ]),
        ))
        .with_type(TypeDecl::new(
            "Inbox",
            TypeNode::record(vec![
                Field::new("owner", TypeNode::Text),
                Field::new("messages", TypeNode::sequence(TypeNode::named("Msg"))),
            ]),
        ))
}

fn run_binary(input: &str) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_wiregen"))
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

// =========================================================================
// Library
// =========================================================================

#[test]
fn test_generate_and_dynamic_codec_agree_on_layout() {
    let schema = schema();
    let code = generate(&schema, &["Msg", "Inbox"], GeneratorConfig::default()).unwrap();
    assert_eq!(code.len(), 2);
    let inbox = &code.get("inbox_wire.rs").unwrap().contents;
    assert!(inbox.contains("<Msg as ::wiregen_runtime::WireCodec>::decode(r)?"));

    let codec = DynamicCodec::new(&schema, &GeneratorConfig::default()).unwrap();
    let msg = Value::Record(vec![
        Value::U32(2),
        Value::Seq(vec!["ab".into(), "x".into()]),
    ]);
    let value = Value::Record(vec!["me".into(), Value::Seq(vec![msg.clone(), msg])]);

    let bytes = codec.to_vec("Inbox", &value, ByteOrder::Big).unwrap();
    // owner (4 + 2) + count (4) + two 19-byte messages
    assert_eq!(bytes.len(), 6 + 4 + 19 * 2);
    let (decoded, rest) = codec.decode_prefix("Inbox", &bytes, ByteOrder::Big).unwrap();
    assert_eq!(decoded, value);
    assert!(rest.is_empty());
}

#[test]
fn test_generate_reports_missing_types() {
    let err = generate(&schema(), &["Outbox"], GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, WiregenError::Gen(_)));
    assert_eq!(err.to_string(), "type not found: Outbox");
}

// =========================================================================
// Binary
// =========================================================================

#[test]
fn test_binary_prints_units_with_markers() {
    let request = serde_json::json!({
        "schema": schema(),
        "types": ["Inbox", "Msg"],
        "config": { "grouping": "per_source" }
    });
    let output = run_binary(&request.to_string());
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("// ==> ").count(), 1);
    assert!(stdout.starts_with("// ==> chat_wire.rs\n"));
    let inbox = stdout.find("for Inbox {").unwrap();
    let msg = stdout.find("for Msg {").unwrap();
    assert!(inbox < msg);
}

#[test]
fn test_binary_fails_without_output_on_error() {
    let request = serde_json::json!({
        "schema": schema(),
        "types": ["Msg", "Missing"]
    });
    let output = run_binary(&request.to_string());
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_binary_rejects_malformed_input() {
    let output = run_binary("not json");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
