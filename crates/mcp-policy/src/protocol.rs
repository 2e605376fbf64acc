// crates/mcp-policy/src/protocol.rs
// ============================================================================
// Module: MCP Protocol Constants
// Description: Method identifiers and request classification for MCP.
// Purpose: Keep the wire-level discriminator values in one place.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! MCP requests are JSON-RPC envelopes whose `method` selects the shape of
//! `params`. Only the two tool methods are interpreted by this crate; every
//! other method classifies as [`McpMethod::Other`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// SECTION: Method Identifiers
// ============================================================================

/// JSON-RPC method for invoking a tool.
pub const METHOD_TOOLS_CALL: &str = "tools/call";

/// JSON-RPC method for listing tools.
pub const METHOD_TOOLS_LIST: &str = "tools/list";

// ============================================================================
// SECTION: Classification
// ============================================================================

/// MCP request method classification.
///
/// # Invariants
/// - Variants and labels are stable for reports and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum McpMethod {
    /// JSON-RPC tools/call.
    #[serde(rename = "tools/call")]
    ToolsCall,
    /// JSON-RPC tools/list.
    #[serde(rename = "tools/list")]
    ToolsList,
    /// Any other method.
    #[serde(rename = "other")]
    Other,
}

impl McpMethod {
    /// Classifies a method identifier by exact comparison.
    #[must_use]
    pub fn classify(method: &str) -> Self {
        match method {
            METHOD_TOOLS_CALL => Self::ToolsCall,
            METHOD_TOOLS_LIST => Self::ToolsList,
            _ => Self::Other,
        }
    }

    /// Returns a stable label for the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToolsCall => METHOD_TOOLS_CALL,
            Self::ToolsList => METHOD_TOOLS_LIST,
            Self::Other => "other",
        }
    }
}
