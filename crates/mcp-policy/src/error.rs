// crates/mcp-policy/src/error.rs
// ============================================================================
// Module: MCP Policy Errors
// Description: Failures raised while bridging MCP requests into policy values.
// Purpose: Give every rejected input a distinct, downcastable error kind.
// Dependencies: policy-expr, thiserror
// ============================================================================

//! ## Overview
//! Every function registered by this crate returns [`McpError`] on failure.
//! The expression environment boxes it as the source of an
//! `EvalError::Function`, so callers recover the kind with
//! `EvalError::binding_error::<McpError>()`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use policy_expr::Type;
use thiserror::Error;

// ============================================================================
// SECTION: Conversion Errors
// ============================================================================

/// Failure converting between native data and dynamic values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The value has a different kind than the one requested.
    #[error("expected {expected}, found {actual}")]
    UnexpectedKind {
        /// Requested type.
        expected: Type,
        /// Runtime type of the value.
        actual: Type,
    },
    /// The value kind has no structured-data representation.
    #[error("{0} values have no JSON representation")]
    Unsupported(Type),
    /// Doubles must be finite to cross into structured data.
    #[error("non-finite double `{0}` has no JSON representation")]
    NonFinite(String),
    /// A decoded number has no numeric form in the value model.
    #[error("number `{0}` has no dynamic representation")]
    Unrepresentable(String),
    /// Native serialization or deserialization rejected the data.
    #[error("native conversion failed: {0}")]
    Native(String),
}

// ============================================================================
// SECTION: Bridge Errors
// ============================================================================

/// Errors returned by MCP policy functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum McpError {
    /// The input is not a well-formed MCP request.
    #[error("failed to parse MCP request: {0}")]
    Parse(String),
    /// A tool was requested from a request with another method.
    #[error("request is not a tool call: expected method `{expected}`, found `{actual}`")]
    MethodMismatch {
        /// Required method identifier.
        expected: &'static str,
        /// Method carried by the request.
        actual: String,
    },
    /// An argument name was not a string.
    #[error("argument name must be {expected}, found {actual}")]
    ArgumentType {
        /// Required key type.
        expected: Type,
        /// Runtime type of the supplied key.
        actual: Type,
    },
    /// A value could not be bridged.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}
