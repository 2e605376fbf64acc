// crates/mcp-policy/src/parse.rs
// ============================================================================
// Module: Request Parser
// Description: Decodes raw MCP messages into generic request envelopes.
// Purpose: Enforce size limits and envelope shape before any policy sees data.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Text and byte inputs share one decode path, so equivalent content always
//! yields identical requests. Only the method is interpreted here; `params`
//! is kept in its generic decoded form until a method-specific accessor asks
//! for it.
//!
//! Security posture: inputs are untrusted. Oversized messages are rejected
//! before decoding and every failure is an [`McpError::Parse`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value as JsonValue;

use crate::error::McpError;
use crate::request::Envelope;
use crate::request::McpRequest;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum size of a single protocol message (1 MiB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Resource limits applied while parsing.
///
/// # Invariants
/// - Limits are plain values captured by bindings; they are never mutated
///   after an environment is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Maximum accepted message size in bytes.
    pub max_message_bytes: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses a textual MCP message.
///
/// # Errors
///
/// Returns [`McpError::Parse`] when the text is oversized or malformed.
pub fn parse_str(text: &str, limits: ParseLimits) -> Result<McpRequest, McpError> {
    parse_bytes(text.as_bytes(), limits)
}

/// Parses a binary-encoded MCP message.
///
/// # Errors
///
/// Returns [`McpError::Parse`] when the bytes are oversized, not a UTF-8 JSON
/// object, missing a non-empty `method`, or carry a non-object `params`, and
/// [`McpError::Conversion`] when a parameter number cannot be boxed.
pub fn parse_bytes(bytes: &[u8], limits: ParseLimits) -> Result<McpRequest, McpError> {
    if bytes.len() > limits.max_message_bytes {
        return Err(McpError::Parse(format!(
            "message of {} bytes exceeds limit of {} bytes",
            bytes.len(),
            limits.max_message_bytes
        )));
    }
    let document: JsonValue =
        serde_json::from_slice(bytes).map_err(|err| McpError::Parse(err.to_string()))?;
    if !document.is_object() {
        return Err(McpError::Parse("message must be a JSON object".to_string()));
    }
    let envelope: Envelope =
        serde_json::from_value(document).map_err(|err| McpError::Parse(err.to_string()))?;
    if envelope.method.is_empty() {
        return Err(McpError::Parse("method must be a non-empty string".to_string()));
    }
    Ok(McpRequest::new(envelope.method, envelope.params)?)
}
