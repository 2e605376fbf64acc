// crates/mcp-policy/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared helpers for MCP policy integration tests.
// Purpose: Build environments and drive policy functions by name.
// Dependencies: mcp-policy, policy-expr
// ============================================================================

//! ## Overview
//! Helpers that call registered functions the way an evaluator would:
//! `mcp.Parse(...)` as a global call and every accessor as a member call.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error;
use std::fmt;

use mcp_policy::McpError;
use mcp_policy::ParseLimits;
use mcp_policy::mcp_environment;
use policy_expr::Env;
use policy_expr::EvalError;
use policy_expr::Value;

// ============================================================================
// SECTION: Results
// ============================================================================

/// Standard result type for integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Assertion failure message.
#[derive(Debug)]
struct TestError(String);

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(Box::new(TestError(message.into()))) }
}

// ============================================================================
// SECTION: Environment Helpers
// ============================================================================

/// Tool-call message used across tests.
pub const SEARCH_CALL: &str =
    r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"search","arguments":{"query":"cats"}}}"#;

/// Tool-list message used across tests.
pub const TOOL_LIST: &str = r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#;

/// Builds the default MCP environment.
pub fn env() -> Env {
    mcp_environment(ParseLimits::default()).expect("mcp environment")
}

/// Calls `mcp.Parse` on a string operand.
pub fn parse(env: &Env, text: &str) -> Result<Value, EvalError> {
    env.call("mcp.Parse", &[Value::from(text)])
}

/// Calls a zero-argument member function.
pub fn member(env: &Env, function: &str, target: &Value) -> Result<Value, EvalError> {
    env.call_member(function, target, &[])
}

/// Returns the MCP error carried by an evaluation failure.
pub fn mcp_error(err: &EvalError) -> Option<&McpError> {
    err.binding_error::<McpError>()
}
