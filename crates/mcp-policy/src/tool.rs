// crates/mcp-policy/src/tool.rs
// ============================================================================
// Module: MCP Tool
// Description: Tool name and argument accessors for tool-call requests.
// Purpose: Expose per-argument facts to policy functions.
// Dependencies: policy-expr, serde_json
// ============================================================================

//! ## Overview
//! A [`McpTool`] is derived from a `tools/call` request and never mutated.
//! Arguments are boxed once when the tool is built, so lookups cannot fail.
//! Argument lookups distinguish a missing key ([`Value::Absent`]) from a key
//! bound to JSON `null` ([`Value::Null`]).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use policy_expr::NativeObject;
use policy_expr::Type;
use policy_expr::Value;
use serde_json::Map;
use serde_json::Value as JsonValue;

use crate::bridge::from_json_map;
use crate::error::ConversionError;
use crate::library::TOOL_TYPE;

// ============================================================================
// SECTION: Tool Record
// ============================================================================

/// Tool invocation recovered from a `tools/call` request.
#[derive(Debug, Clone, PartialEq)]
pub struct McpTool {
    /// Tool name.
    name: String,
    /// Tool arguments; empty when the call declares none.
    arguments: Map<String, JsonValue>,
    /// Boxed view of `arguments`.
    values: BTreeMap<String, Value>,
}

impl McpTool {
    /// Builds a tool record.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] when an argument cannot be boxed.
    pub fn new(
        name: impl Into<String>,
        arguments: Map<String, JsonValue>,
    ) -> Result<Self, ConversionError> {
        let values = from_json_map(arguments.clone())?;
        Ok(Self {
            name: name.into(),
            arguments,
            values,
        })
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw argument mapping.
    #[must_use]
    pub const fn arguments(&self) -> &Map<String, JsonValue> {
        &self.arguments
    }

    /// Returns true when the argument is present, even if it is `null`.
    #[must_use]
    pub fn has_argument(&self, name: &str) -> bool {
        self.arguments.contains_key(name)
    }

    /// Returns the argument as a dynamic value, or [`Value::Absent`].
    #[must_use]
    pub fn argument(&self, name: &str) -> Value {
        self.values.get(name).cloned().unwrap_or(Value::Absent)
    }

    /// Returns every argument as a dynamic map.
    #[must_use]
    pub fn argument_values(&self) -> Value {
        Value::Map(self.values.clone())
    }
}

impl NativeObject for McpTool {
    fn value_type(&self) -> Type {
        TOOL_TYPE
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::from(self.name.as_str())),
            "arguments" => Some(self.argument_values()),
            _ => None,
        }
    }
}
