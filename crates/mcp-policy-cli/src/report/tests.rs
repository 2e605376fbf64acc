// crates/mcp-policy-cli/src/report/tests.rs
// ============================================================================
// Module: Report Unit Tests
// Description: Unit tests for inspection and function table reports.
// Purpose: Confirm reports reflect what the registered functions return.
// ============================================================================

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use mcp_policy::McpError;
use mcp_policy::McpMethod;
use mcp_policy::ParseLimits;
use mcp_policy::mcp_environment;
use serde_json::json;

use super::ReportError;
use super::function_table;
use super::inspect;

#[test]
fn tool_calls_report_name_and_arguments() {
    let env = mcp_environment(ParseLimits::default()).unwrap();
    let message = br#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"search","arguments":{"query":"rust","limit":5}}}"#;
    let report = inspect(&env, message).unwrap();
    assert_eq!(report.method, "tools/call");
    assert_eq!(report.kind, McpMethod::ToolsCall);
    assert!(report.is_tool_call);
    assert!(!report.is_tool_list);
    let tool = report.tool.unwrap();
    assert_eq!(tool.name, "search");
    assert_eq!(tool.arguments, json!({"query": "rust", "limit": 5}));
}

#[test]
fn other_methods_omit_tool_facts() {
    let env = mcp_environment(ParseLimits::default()).unwrap();
    let report = inspect(&env, br#"{"method":"tools/list"}"#).unwrap();
    assert!(report.is_tool_list);
    assert!(report.tool.is_none());
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(
        value,
        json!({"method": "tools/list", "kind": "tools/list", "is_tool_call": false, "is_tool_list": true})
    );

    let report = inspect(&env, br#"{"method":"ping"}"#).unwrap();
    assert_eq!(report.kind, McpMethod::Other);
}

#[test]
fn parse_failures_surface_as_eval_errors() {
    let env = mcp_environment(ParseLimits::default()).unwrap();
    let err = inspect(&env, b"{not json").unwrap_err();
    let ReportError::Eval(eval) = err else {
        panic!("expected an evaluation error");
    };
    assert!(matches!(eval.binding_error::<McpError>(), Some(McpError::Parse(_))));
}

#[test]
fn function_table_lists_every_overload() {
    let env = mcp_environment(ParseLimits::default()).unwrap();
    let table = function_table(&env);
    assert_eq!(table.len(), 9);
    let parse: Vec<_> = table.iter().filter(|entry| entry.function == "mcp.Parse").collect();
    assert_eq!(parse.len(), 2);
    assert!(parse.iter().all(|entry| !entry.member && entry.result == "mcp.MCPRequest"));
    let lookup = table.iter().find(|entry| entry.overload == "mcp_tool_argument").unwrap();
    assert!(lookup.member);
    assert_eq!(lookup.params, vec!["mcp.MCPTool".to_string(), "string".to_string()]);
    assert_eq!(lookup.result, "dyn");
}
