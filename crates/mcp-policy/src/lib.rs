// crates/mcp-policy/src/lib.rs
// ============================================================================
// Module: MCP Policy Bridge
// Description: MCP request introspection for policy expressions.
// Purpose: Parse MCP messages and expose tool-call facts as policy functions.
// Dependencies: policy-expr, serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! This crate bridges MCP JSON-RPC messages into the `policy-expr` value
//! model. Policies call `mcp.Parse(...)` on raw request text or bytes, then
//! ask the resulting request whether it is a tool call and which arguments
//! it carries. The crate supplies facts only; authorization decisions stay
//! with the policy text and its caller.
//!
//! Every function is pure over its inputs. Failures are returned as
//! [`McpError`] values and never abort the evaluator.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bridge;
pub mod error;
pub mod library;
pub mod parse;
pub mod protocol;
pub mod request;
pub mod tool;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bridge::FromValue;
pub use bridge::from_json;
pub use bridge::from_value;
pub use bridge::to_json;
pub use bridge::to_value;
pub use error::ConversionError;
pub use error::McpError;
pub use library::McpLibrary;
pub use library::McpNamespace;
pub use library::mcp_environment;
pub use parse::ParseLimits;
pub use parse::parse_bytes;
pub use parse::parse_str;
pub use protocol::METHOD_TOOLS_CALL;
pub use protocol::METHOD_TOOLS_LIST;
pub use protocol::McpMethod;
pub use request::McpRequest;
pub use tool::McpTool;
