// crates/mcp-policy/src/request.rs
// ============================================================================
// Module: MCP Request
// Description: Generic request envelope, classifier, and tool extractor.
// Purpose: Answer method questions and recover the tool-call payload shape.
// Dependencies: policy-expr, serde, serde_json
// ============================================================================

//! ## Overview
//! [`McpRequest`] keeps `params` untyped because its shape depends on the
//! method. [`McpRequest::tool`] recovers the tool-call shape by re-encoding
//! the envelope and decoding it again against the tool-call schema, so the
//! generic and specific decoders never disagree about the wire format.
//! `params` is boxed once at construction for reflective field access.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use policy_expr::NativeObject;
use policy_expr::Type;
use policy_expr::Value;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value as JsonValue;

use crate::bridge::from_json_map;
use crate::error::ConversionError;
use crate::error::McpError;
use crate::library::REQUEST_TYPE;
use crate::protocol::METHOD_TOOLS_CALL;
use crate::protocol::METHOD_TOOLS_LIST;
use crate::protocol::McpMethod;
use crate::tool::McpTool;

// ============================================================================
// SECTION: Request Envelope
// ============================================================================

/// Generic MCP request envelope.
///
/// # Invariants
/// - `method` is non-empty for requests produced by the parser.
/// - `params` is either absent or a JSON object; `null` decodes as absent.
/// - `boxed_params` mirrors `params` entry for entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McpRequest {
    /// Method identifier (the discriminator).
    method: String,
    /// Method-dependent parameters, not yet interpreted.
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Map<String, JsonValue>>,
    /// Boxed view of `params`.
    #[serde(skip)]
    boxed_params: Option<BTreeMap<String, Value>>,
}

impl McpRequest {
    /// Builds a request from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] when a parameter cannot be boxed.
    pub fn new(
        method: impl Into<String>,
        params: Option<Map<String, JsonValue>>,
    ) -> Result<Self, ConversionError> {
        let boxed_params = params.clone().map(from_json_map).transpose()?;
        Ok(Self {
            method: method.into(),
            params,
            boxed_params,
        })
    }

    /// Returns the method identifier.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the undecoded parameter payload.
    #[must_use]
    pub const fn params(&self) -> Option<&Map<String, JsonValue>> {
        self.params.as_ref()
    }

    /// Classifies the method.
    #[must_use]
    pub fn kind(&self) -> McpMethod {
        McpMethod::classify(&self.method)
    }

    /// Returns true for `tools/call` requests.
    #[must_use]
    pub fn is_tool_call(&self) -> bool {
        self.method == METHOD_TOOLS_CALL
    }

    /// Returns true for `tools/list` requests.
    #[must_use]
    pub fn is_tool_list(&self) -> bool {
        self.method == METHOD_TOOLS_LIST
    }

    /// Extracts the tool name and arguments of a tool call.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::MethodMismatch`] for other methods without
    /// decoding anything, and [`McpError::Parse`] when the parameters do not
    /// match the tool-call schema.
    pub fn tool(&self) -> Result<McpTool, McpError> {
        if !self.is_tool_call() {
            return Err(McpError::MethodMismatch {
                expected: METHOD_TOOLS_CALL,
                actual: self.method.clone(),
            });
        }
        let encoded = serde_json::to_vec(self)
            .map_err(|err| McpError::Parse(format!("failed to encode request: {err}")))?;
        let call: CallToolRequest = serde_json::from_slice(&encoded)
            .map_err(|err| McpError::Parse(format!("invalid tool call: {err}")))?;
        Ok(McpTool::new(call.params.name, call.params.arguments.unwrap_or_default())?)
    }
}

impl NativeObject for McpRequest {
    fn value_type(&self) -> Type {
        REQUEST_TYPE
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "method" => Some(Value::from(self.method.as_str())),
            "params" => Some(self.boxed_params.clone().map_or(Value::Null, Value::Map)),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Wire Shapes
// ============================================================================

/// Envelope shape used by the first decode pass.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    /// Method identifier.
    pub(crate) method: String,
    /// Parameters; `null` decodes as absent.
    #[serde(default)]
    pub(crate) params: Option<Map<String, JsonValue>>,
}

// ============================================================================
// SECTION: Tool-Call Schema
// ============================================================================

/// Tool-call request shape used by the second decode pass.
#[derive(Debug, Deserialize)]
struct CallToolRequest {
    /// Tool-call parameters.
    params: CallToolParams,
}

/// Tool-call parameters.
#[derive(Debug, Deserialize)]
struct CallToolParams {
    /// Tool name.
    name: String,
    /// Tool arguments; absent and `null` both mean no arguments.
    #[serde(default)]
    arguments: Option<Map<String, JsonValue>>,
}

#[cfg(test)]
mod tests;
