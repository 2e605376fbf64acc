// crates/mcp-policy-config/src/lib.rs
// ============================================================================
// Module: MCP Policy Config Library
// Description: Canonical config model and validation for mcp-policy.toml.
// Purpose: Single source of truth for bridge limits and logging settings.
// Dependencies: mcp-policy, serde, toml
// ============================================================================

//! ## Overview
//! `mcp-policy-config` defines the configuration model shared by the CLI and
//! any embedder of the MCP policy library. Loading is strict and fail-closed.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
