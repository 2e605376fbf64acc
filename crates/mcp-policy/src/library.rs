// crates/mcp-policy/src/library.rs
// ============================================================================
// Module: MCP Policy Library
// Description: Registers MCP types, the namespace handle, and functions.
// Purpose: Install MCP introspection into a policy expression environment.
// Dependencies: policy-expr, tracing
// ============================================================================

//! ## Overview
//! [`McpLibrary`] declares one bound variable (`mcp`), three nominal types,
//! and the function table below. Registration happens once when the
//! environment is built; bindings capture only the copyable [`ParseLimits`],
//! so the built environment is safe to share across concurrent evaluations.
//!
//! | Function | Overload id | Signature |
//! |---|---|---|
//! | `mcp.Parse` | `mcp_parse_string` | `(string) -> mcp.MCPRequest` |
//! | `mcp.Parse` | `mcp_parse_bytes` | `(bytes) -> mcp.MCPRequest` |
//! | `IsToolCall` | `mcp_request_is_tool_call` | `request.() -> bool` |
//! | `IsToolList` | `mcp_request_is_tool_list` | `request.() -> bool` |
//! | `Tool` | `mcp_request_tool` | `request.() -> mcp.MCPTool` |
//! | `Name` | `mcp_tool_name` | `tool.() -> string` |
//! | `Arguments` | `mcp_tool_get_arguments` | `tool.() -> map` |
//! | `HasArgument` | `mcp_tool_has_argument` | `tool.(string) -> bool` |
//! | `GetArgument` | `mcp_tool_argument` | `tool.(string) -> dyn` |

// ============================================================================
// SECTION: Imports
// ============================================================================

use policy_expr::Binding;
use policy_expr::Env;
use policy_expr::EnvBuilder;
use policy_expr::EnvError;
use policy_expr::Library;
use policy_expr::NativeObject;
use policy_expr::Overload;
use policy_expr::Type;
use policy_expr::Value;
use tracing::debug;

use crate::bridge::FromValue;
use crate::error::ConversionError;
use crate::error::McpError;
use crate::parse::ParseLimits;
use crate::parse::parse_bytes;
use crate::parse::parse_str;
use crate::request::McpRequest;
use crate::tool::McpTool;

// ============================================================================
// SECTION: Names
// ============================================================================

/// Library name recorded by the environment.
pub const LIBRARY_NAME: &str = "mcp";

/// Variable bound to the namespace handle.
pub const NAMESPACE_VARIABLE: &str = "mcp";

/// Name of the opaque namespace handle type.
pub const NAMESPACE_TYPE_NAME: &str = "mcp.MCP";
/// Name of the parsed request type.
pub const REQUEST_TYPE_NAME: &str = "mcp.MCPRequest";
/// Name of the extracted tool type.
pub const TOOL_TYPE_NAME: &str = "mcp.MCPTool";

/// Opaque namespace handle type.
pub const NAMESPACE_TYPE: Type = Type::Opaque(NAMESPACE_TYPE_NAME);
/// Parsed request type.
pub const REQUEST_TYPE: Type = Type::Object(REQUEST_TYPE_NAME);
/// Extracted tool type.
pub const TOOL_TYPE: Type = Type::Object(TOOL_TYPE_NAME);

/// Parse function name.
pub const FN_PARSE: &str = "mcp.Parse";
/// Tool-call predicate name.
pub const FN_IS_TOOL_CALL: &str = "IsToolCall";
/// Tool-list predicate name.
pub const FN_IS_TOOL_LIST: &str = "IsToolList";
/// Tool extractor name.
pub const FN_TOOL: &str = "Tool";
/// Tool name accessor.
pub const FN_NAME: &str = "Name";
/// Argument enumeration name.
pub const FN_ARGUMENTS: &str = "Arguments";
/// Argument existence check name.
pub const FN_HAS_ARGUMENT: &str = "HasArgument";
/// Argument lookup name.
pub const FN_GET_ARGUMENT: &str = "GetArgument";

// Overload ids.
const PARSE_STRING: &str = "mcp_parse_string";
const PARSE_BYTES: &str = "mcp_parse_bytes";
const REQUEST_IS_TOOL_CALL: &str = "mcp_request_is_tool_call";
const REQUEST_IS_TOOL_LIST: &str = "mcp_request_is_tool_list";
const REQUEST_TOOL: &str = "mcp_request_tool";
const TOOL_NAME: &str = "mcp_tool_name";
const TOOL_ARGUMENTS: &str = "mcp_tool_get_arguments";
const TOOL_HAS_ARGUMENT: &str = "mcp_tool_has_argument";
const TOOL_ARGUMENT: &str = "mcp_tool_argument";

// ============================================================================
// SECTION: Namespace Handle
// ============================================================================

/// Stateless handle bound to the `mcp` variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct McpNamespace;

impl NativeObject for McpNamespace {
    fn value_type(&self) -> Type {
        NAMESPACE_TYPE
    }
}

// ============================================================================
// SECTION: Library
// ============================================================================

/// Installable MCP introspection library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct McpLibrary {
    /// Limits applied by the parse overloads.
    limits: ParseLimits,
}

impl McpLibrary {
    /// Creates a library with the given parse limits.
    #[must_use]
    pub const fn new(limits: ParseLimits) -> Self {
        Self {
            limits,
        }
    }

    /// Returns the parse limits.
    #[must_use]
    pub const fn limits(&self) -> ParseLimits {
        self.limits
    }
}

impl Library for McpLibrary {
    fn name(&self) -> &'static str {
        LIBRARY_NAME
    }

    fn install(&self, builder: &mut EnvBuilder) -> Result<(), EnvError> {
        let limits = self.limits;
        builder
            .opaque_type(NAMESPACE_TYPE_NAME)
            .object_type(REQUEST_TYPE_NAME, &[("method", Type::String), ("params", Type::Dyn)])
            .object_type(TOOL_TYPE_NAME, &[("name", Type::String), ("arguments", Type::Map)])
            .variable(NAMESPACE_VARIABLE, NAMESPACE_TYPE)
            .global(NAMESPACE_VARIABLE, Value::object(McpNamespace))
            .function(
                FN_PARSE,
                [
                    Overload::global(
                        PARSE_STRING,
                        vec![Type::String],
                        REQUEST_TYPE,
                        Binding::unary(move |text: &Value| traced(PARSE_STRING, parse_text(text, limits))),
                    ),
                    Overload::global(
                        PARSE_BYTES,
                        vec![Type::Bytes],
                        REQUEST_TYPE,
                        Binding::unary(move |data: &Value| traced(PARSE_BYTES, parse_data(data, limits))),
                    ),
                ],
            )
            .function(
                FN_IS_TOOL_CALL,
                [Overload::member(
                    REQUEST_IS_TOOL_CALL,
                    vec![REQUEST_TYPE],
                    Type::Bool,
                    Binding::unary(|target: &Value| {
                        traced(REQUEST_IS_TOOL_CALL, request(target).map(|req| Value::Bool(req.is_tool_call())))
                    }),
                )],
            )
            .function(
                FN_IS_TOOL_LIST,
                [Overload::member(
                    REQUEST_IS_TOOL_LIST,
                    vec![REQUEST_TYPE],
                    Type::Bool,
                    Binding::unary(|target: &Value| {
                        traced(REQUEST_IS_TOOL_LIST, request(target).map(|req| Value::Bool(req.is_tool_list())))
                    }),
                )],
            )
            .function(
                FN_TOOL,
                [Overload::member(
                    REQUEST_TOOL,
                    vec![REQUEST_TYPE],
                    TOOL_TYPE,
                    Binding::unary(|target: &Value| traced(REQUEST_TOOL, request_tool(target))),
                )],
            )
            .function(
                FN_NAME,
                [Overload::member(
                    TOOL_NAME,
                    vec![TOOL_TYPE],
                    Type::String,
                    Binding::unary(|target: &Value| {
                        traced(TOOL_NAME, tool(target).map(|tool| Value::from(tool.name())))
                    }),
                )],
            )
            .function(
                FN_ARGUMENTS,
                [Overload::member(
                    TOOL_ARGUMENTS,
                    vec![TOOL_TYPE],
                    Type::Map,
                    Binding::unary(|target: &Value| {
                        traced(TOOL_ARGUMENTS, tool(target).map(McpTool::argument_values))
                    }),
                )],
            )
            .function(
                FN_HAS_ARGUMENT,
                [Overload::member(
                    TOOL_HAS_ARGUMENT,
                    vec![TOOL_TYPE, Type::String],
                    Type::Bool,
                    Binding::binary(|target: &Value, key: &Value| {
                        traced(TOOL_HAS_ARGUMENT, has_argument(target, key))
                    }),
                )],
            )
            .function(
                FN_GET_ARGUMENT,
                [Overload::member(
                    TOOL_ARGUMENT,
                    vec![TOOL_TYPE, Type::String],
                    Type::Dyn,
                    Binding::binary(|target: &Value, key: &Value| {
                        traced(TOOL_ARGUMENT, get_argument(target, key))
                    }),
                )],
            );
        Ok(())
    }
}

/// Builds an environment holding only the MCP library.
///
/// # Errors
///
/// Returns [`EnvError`] when the declarations fail validation.
pub fn mcp_environment(limits: ParseLimits) -> Result<Env, EnvError> {
    let mut builder = Env::builder();
    builder.library(&McpLibrary::new(limits))?;
    builder.build()
}

// ============================================================================
// SECTION: Bindings
// ============================================================================

/// Records rejected inputs before they leave the library.
fn traced(overload: &'static str, result: Result<Value, McpError>) -> Result<Value, McpError> {
    if let Err(err) = &result {
        debug!(overload, error = %err, "mcp policy function rejected input");
    }
    result
}

/// Parses a string operand.
fn parse_text(text: &Value, limits: ParseLimits) -> Result<Value, McpError> {
    let text = <&str>::extract(text)?;
    parse_str(text, limits).map(Value::object)
}

/// Parses a bytes operand.
fn parse_data(data: &Value, limits: ParseLimits) -> Result<Value, McpError> {
    let data = <&[u8]>::extract(data)?;
    parse_bytes(data, limits).map(Value::object)
}

/// Unboxes a request receiver.
fn request(target: &Value) -> Result<&McpRequest, McpError> {
    target.downcast_ref::<McpRequest>().ok_or_else(|| {
        McpError::Conversion(ConversionError::UnexpectedKind {
            expected: REQUEST_TYPE,
            actual: target.value_type(),
        })
    })
}

/// Unboxes a tool receiver.
fn tool(target: &Value) -> Result<&McpTool, McpError> {
    target.downcast_ref::<McpTool>().ok_or_else(|| {
        McpError::Conversion(ConversionError::UnexpectedKind {
            expected: TOOL_TYPE,
            actual: target.value_type(),
        })
    })
}

/// Unboxes an argument name; non-string keys are an argument type error.
fn argument_name(key: &Value) -> Result<&str, McpError> {
    key.as_str().ok_or_else(|| McpError::ArgumentType {
        expected: Type::String,
        actual: key.value_type(),
    })
}

/// Extracts a tool from a request receiver.
fn request_tool(target: &Value) -> Result<Value, McpError> {
    request(target)?.tool().map(Value::object)
}

/// Checks argument existence.
fn has_argument(target: &Value, key: &Value) -> Result<Value, McpError> {
    let tool = tool(target)?;
    let name = argument_name(key)?;
    Ok(Value::Bool(tool.has_argument(name)))
}

/// Looks up an argument value.
fn get_argument(target: &Value, key: &Value) -> Result<Value, McpError> {
    let tool = tool(target)?;
    let name = argument_name(key)?;
    Ok(tool.argument(name))
}

#[cfg(test)]
mod tests;
