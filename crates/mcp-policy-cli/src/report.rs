// crates/mcp-policy-cli/src/report.rs
// ============================================================================
// Module: CLI Reports
// Description: Message inspection and function table reports.
// Purpose: Exercise the registered MCP functions the way a policy would.
// Dependencies: mcp-policy, policy-expr, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`inspect`] never calls the parser or accessors directly. Every fact in an
//! [`InspectReport`] comes from a function call through the built [`Env`], so
//! the report shows exactly what a policy evaluating the same message sees.

// ============================================================================
// SECTION: Imports
// ============================================================================

use mcp_policy::ConversionError;
use mcp_policy::FromValue;
use mcp_policy::McpMethod;
use mcp_policy::library::FN_ARGUMENTS;
use mcp_policy::library::FN_IS_TOOL_CALL;
use mcp_policy::library::FN_IS_TOOL_LIST;
use mcp_policy::library::FN_NAME;
use mcp_policy::library::FN_PARSE;
use mcp_policy::library::FN_TOOL;
use mcp_policy::to_json;
use policy_expr::Env;
use policy_expr::EvalError;
use policy_expr::Value;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while building a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A policy function call failed.
    #[error(transparent)]
    Eval(#[from] EvalError),
    /// A returned value had an unexpected shape.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

// ============================================================================
// SECTION: Inspection
// ============================================================================

/// Facts a policy can observe about one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    /// Declared method.
    pub method: String,
    /// Method classification.
    pub kind: McpMethod,
    /// Result of `IsToolCall()`.
    pub is_tool_call: bool,
    /// Result of `IsToolList()`.
    pub is_tool_list: bool,
    /// Tool facts; present only for tool calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolReport>,
}

/// Tool facts observed through `Tool()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolReport {
    /// Result of `Name()`.
    pub name: String,
    /// Result of `Arguments()`.
    pub arguments: JsonValue,
}

/// Evaluates the MCP functions against one raw message.
///
/// # Errors
///
/// Returns [`ReportError`] when any function call fails, including parse
/// failures of the message itself.
pub fn inspect(env: &Env, message: &[u8]) -> Result<InspectReport, ReportError> {
    let request = env.call(FN_PARSE, &[Value::from(message)])?;
    let method_value = env.select(&request, "method")?;
    let method = <&str>::extract(&method_value)?.to_string();
    let is_tool_call = bool::extract(&env.call_member(FN_IS_TOOL_CALL, &request, &[])?)?;
    let is_tool_list = bool::extract(&env.call_member(FN_IS_TOOL_LIST, &request, &[])?)?;
    let tool = if is_tool_call {
        let tool = env.call_member(FN_TOOL, &request, &[])?;
        let name_value = env.call_member(FN_NAME, &tool, &[])?;
        let arguments = env.call_member(FN_ARGUMENTS, &tool, &[])?;
        Some(ToolReport {
            name: <&str>::extract(&name_value)?.to_string(),
            arguments: to_json(&arguments)?,
        })
    } else {
        None
    };
    debug!(method = %method, is_tool_call, is_tool_list, "inspected message");
    Ok(InspectReport {
        kind: McpMethod::classify(&method),
        method,
        is_tool_call,
        is_tool_list,
        tool,
    })
}

// ============================================================================
// SECTION: Function Table
// ============================================================================

/// One registered overload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionEntry {
    /// Function name.
    pub function: String,
    /// Overload id.
    pub overload: &'static str,
    /// True for receiver-style overloads.
    pub member: bool,
    /// Declared parameter types, receiver first for members.
    pub params: Vec<String>,
    /// Declared result type.
    pub result: String,
}

/// Lists every overload in function-name order.
#[must_use]
pub fn function_table(env: &Env) -> Vec<FunctionEntry> {
    env.functions()
        .flat_map(|(function, overloads)| {
            overloads.iter().map(move |overload| FunctionEntry {
                function: function.to_string(),
                overload: overload.id(),
                member: overload.is_member(),
                params: overload.params().iter().map(ToString::to_string).collect(),
                result: overload.result().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests;
