// crates/mcp-policy/src/library/tests.rs
// ============================================================================
// Module: MCP Library Unit Tests
// Description: Unit tests for library registration.
// Purpose: Ensure the declared table matches the documented function set.
// ============================================================================

//! ## Overview
//! Checks declared types, the namespace global, and the overload table.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use policy_expr::Env;
use policy_expr::Type;
use policy_expr::TypeDecl;

use super::McpLibrary;
use super::McpNamespace;
use super::NAMESPACE_TYPE;
use super::REQUEST_TYPE_NAME;
use super::TOOL_TYPE_NAME;
use super::mcp_environment;
use crate::parse::ParseLimits;

#[test]
fn registers_namespace_global() {
    let env = mcp_environment(ParseLimits::default()).expect("env");
    assert!(env.has_library("mcp"));
    assert_eq!(env.variable_type("mcp"), Some(NAMESPACE_TYPE));
    let handle = env.global("mcp").expect("global");
    assert!(handle.downcast_ref::<McpNamespace>().is_some());
}

#[test]
fn declares_object_types_with_fields() {
    let env = mcp_environment(ParseLimits::default()).expect("env");
    let Some(TypeDecl::Object {
        fields,
    }) = env.type_decl(REQUEST_TYPE_NAME)
    else {
        panic!("request type should be an object");
    };
    assert_eq!(fields.get("method"), Some(&Type::String));
    let Some(TypeDecl::Object {
        fields,
    }) = env.type_decl(TOOL_TYPE_NAME)
    else {
        panic!("tool type should be an object");
    };
    assert_eq!(fields.get("arguments"), Some(&Type::Map));
    assert_eq!(env.type_decl("mcp.MCP"), Some(&TypeDecl::Opaque));
}

#[test]
fn declares_every_overload() {
    let env = mcp_environment(ParseLimits::default()).expect("env");
    let mut ids: Vec<&str> =
        env.functions().flat_map(|(_, overloads)| overloads.iter().map(|overload| overload.id())).collect();
    ids.sort_unstable();
    assert_eq!(
        ids,
        [
            "mcp_parse_bytes",
            "mcp_parse_string",
            "mcp_request_is_tool_call",
            "mcp_request_is_tool_list",
            "mcp_request_tool",
            "mcp_tool_argument",
            "mcp_tool_get_arguments",
            "mcp_tool_has_argument",
            "mcp_tool_name",
        ]
    );
}

#[test]
fn repeated_install_is_idempotent() {
    let library = McpLibrary::new(ParseLimits::default());
    let mut builder = Env::builder();
    builder.library(&library).expect("first");
    builder.library(&library).expect("second");
    let env = builder.build().expect("env");
    assert_eq!(env.functions().count(), 8);
}
