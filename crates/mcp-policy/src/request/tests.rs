// crates/mcp-policy/src/request/tests.rs
// ============================================================================
// Module: MCP Request Unit Tests
// Description: Unit tests for envelope parsing, classification, and tools.
// Purpose: Pin down envelope validation and the tool-call re-decode.
// ============================================================================

//! ## Overview
//! Exercises the parser and the request/tool records directly, without an
//! expression environment.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use policy_expr::NativeObject;
use policy_expr::Value;
use serde_json::json;

use crate::error::McpError;
use crate::parse::ParseLimits;
use crate::parse::parse_bytes;
use crate::parse::parse_str;
use crate::protocol::McpMethod;

fn parse(text: &str) -> Result<super::McpRequest, McpError> {
    parse_str(text, ParseLimits::default())
}

// ============================================================================
// SECTION: Envelope
// ============================================================================

#[test]
fn envelope_ignores_unknown_fields() {
    let request =
        parse(r#"{"jsonrpc":"2.0","id":7,"method":"tools/list","params":{"cursor":"a"}}"#).expect("parse");
    assert_eq!(request.method(), "tools/list");
    assert_eq!(request.kind(), McpMethod::ToolsList);
    assert_eq!(request.params().and_then(|params| params.get("cursor")), Some(&json!("a")));
}

#[test]
fn null_params_are_absent() {
    let request = parse(r#"{"method":"ping","params":null}"#).expect("parse");
    assert!(request.params().is_none());
    assert_eq!(request.kind(), McpMethod::Other);
    assert_eq!(request.field("params"), Some(Value::Null));
}

#[test]
fn malformed_envelopes_are_parse_errors() {
    for input in [
        "",
        "{",
        "[]",
        r#"["tools/list"]"#,
        "null",
        r#"{"params":{}}"#,
        r#"{"method":""}"#,
        r#"{"method":7}"#,
        r#"{"method":"tools/call","params":[1,2]}"#,
        r#"{"method":"tools/call","params":"name"}"#,
    ] {
        assert!(matches!(parse(input), Err(McpError::Parse(_))), "input {input:?} should fail");
    }
}

#[test]
fn invalid_utf8_bytes_are_parse_errors() {
    let result = parse_bytes(b"{\"method\":\"\xff\"}", ParseLimits::default());
    assert!(matches!(result, Err(McpError::Parse(_))));
}

#[test]
fn oversized_messages_fail_before_decode() {
    let limits = ParseLimits {
        max_message_bytes: 16,
    };
    let result = parse_str(r#"{"method":"tools/list"}"#, limits);
    let Err(McpError::Parse(message)) = result else {
        panic!("expected parse error");
    };
    assert!(message.contains("exceeds limit"));
}

#[test]
fn text_and_bytes_agree() {
    let text = r#"{"method":"tools/call","params":{"name":"search","arguments":{"q":1}}}"#;
    let from_text = parse_str(text, ParseLimits::default()).expect("text");
    let from_bytes = parse_bytes(text.as_bytes(), ParseLimits::default()).expect("bytes");
    assert_eq!(from_text, from_bytes);
}

// ============================================================================
// SECTION: Tool Extraction
// ============================================================================

#[test]
fn tool_call_yields_name_and_arguments() {
    let request =
        parse(r#"{"method":"tools/call","params":{"name":"search","arguments":{"query":"cats","limit":null}}}"#)
            .expect("parse");
    assert!(request.is_tool_call());
    assert!(!request.is_tool_list());
    let tool = request.tool().expect("tool");
    assert_eq!(tool.name(), "search");
    assert_eq!(tool.argument("query"), Value::from("cats"));
    assert!(tool.has_argument("limit"));
    assert_eq!(tool.argument("limit"), Value::Null);
    assert!(!tool.has_argument("missing"));
    assert_eq!(tool.argument("missing"), Value::Absent);
}

#[test]
fn oversized_integer_arguments_widen_to_double() {
    let request =
        parse(r#"{"method":"tools/call","params":{"name":"count","arguments":{"n":18446744073709551616,"m":18446744073709551615}}}"#)
            .expect("parse");
    let tool = request.tool().expect("tool");
    assert_eq!(tool.argument("n"), Value::Double(18_446_744_073_709_551_616.0));
    assert_eq!(tool.argument("m"), Value::UInt(u64::MAX));
}

#[test]
fn missing_or_null_arguments_are_empty() {
    for input in [
        r#"{"method":"tools/call","params":{"name":"noop"}}"#,
        r#"{"method":"tools/call","params":{"name":"noop","arguments":null}}"#,
    ] {
        let tool = parse(input).expect("parse").tool().expect("tool");
        assert!(tool.arguments().is_empty());
        assert_eq!(tool.argument_values(), Value::Map(std::collections::BTreeMap::new()));
    }
}

#[test]
fn tool_on_other_methods_is_method_mismatch() {
    let request = parse(r#"{"method":"tools/list"}"#).expect("parse");
    assert_eq!(
        request.tool(),
        Err(McpError::MethodMismatch {
            expected: "tools/call",
            actual: "tools/list".to_string(),
        })
    );
}

#[test]
fn tool_call_schema_violations_are_parse_errors() {
    for input in [
        r#"{"method":"tools/call"}"#,
        r#"{"method":"tools/call","params":{}}"#,
        r#"{"method":"tools/call","params":{"name":5}}"#,
        r#"{"method":"tools/call","params":{"name":"x","arguments":[1]}}"#,
    ] {
        let request = parse(input).expect("envelope parses");
        assert!(matches!(request.tool(), Err(McpError::Parse(_))), "input {input} should fail");
    }
}

#[test]
fn reflective_fields_expose_payloads() {
    let request =
        parse(r#"{"method":"tools/call","params":{"name":"search","arguments":{"q":"x"}}}"#).expect("parse");
    assert_eq!(request.field("method"), Some(Value::from("tools/call")));
    assert!(request.field("params").and_then(|params| params.as_map().cloned()).is_some());
    assert_eq!(request.field("id"), None);
    let tool = request.tool().expect("tool");
    assert_eq!(tool.field("name"), Some(Value::from("search")));
    assert_eq!(tool.field("arguments"), Some(tool.argument_values()));
}
