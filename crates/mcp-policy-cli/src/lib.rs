// crates/mcp-policy-cli/src/lib.rs
// ============================================================================
// Module: MCP Policy CLI Library
// Description: Report builders and logging setup for the `mcp-policy` binary.
// Purpose: Keep CLI behavior testable outside the process entry point.
// Dependencies: mcp-policy, mcp-policy-config, policy-expr, time, tracing-subscriber
// ============================================================================

//! ## Overview
//! The binary is a thin dispatcher; report construction and subscriber
//! installation live here.

pub mod logging;
pub mod report;
