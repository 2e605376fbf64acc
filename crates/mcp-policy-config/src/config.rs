// crates/mcp-policy-config/src/config.rs
// ============================================================================
// Module: MCP Policy Configuration
// Description: Configuration loading and validation for mcp-policy.toml.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: mcp-policy, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then `MCP_POLICY_CONFIG`, then the default
//! filename. Only the default file may be missing, in which case defaults
//! apply; an explicitly named file that cannot be read is an error.
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::ffi::OsString;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use mcp_policy::ParseLimits;
use mcp_policy::parse::DEFAULT_MAX_MESSAGE_BYTES;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "mcp-policy.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "MCP_POLICY_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Smallest accepted message size limit in bytes.
pub const MIN_MESSAGE_BYTES_LIMIT: usize = 64;
/// Largest accepted message size limit in bytes.
pub const MAX_MESSAGE_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Default log filter directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Maximum length of a log filter directive.
pub const MAX_LOG_LEVEL_LENGTH: usize = 256;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// MCP policy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct McpPolicyConfig {
    /// Library limits.
    #[serde(default)]
    pub library: LibraryConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl McpPolicyConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let source = resolve_path(path, env::var_os(CONFIG_ENV_VAR))?;
        Self::load_source(&source)
    }

    /// Loads configuration from a resolved source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_source(source: &ConfigSource) -> Result<Self, ConfigError> {
        validate_path(source.path())?;
        if !source.is_required() && !source.path().exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = read_bytes_with_limit(source.path(), MAX_CONFIG_FILE_SIZE)?;
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::parse(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the TOML is malformed or invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.library.validate()?;
        self.logging.validate()
    }
}

/// Library limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    /// Maximum accepted protocol message size in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

impl LibraryConfig {
    /// Returns the parse limits for the MCP library.
    #[must_use]
    pub const fn parse_limits(&self) -> ParseLimits {
        ParseLimits {
            max_message_bytes: self.max_message_bytes,
        }
    }

    /// Validates library limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_MESSAGE_BYTES_LIMIT ..= MAX_MESSAGE_BYTES_LIMIT).contains(&self.max_message_bytes) {
            return Err(ConfigError::Invalid(format!(
                "library.max_message_bytes must be between {MIN_MESSAGE_BYTES_LIMIT} and \
                 {MAX_MESSAGE_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Filter directive (for example `info` or `mcp_policy=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Timestamp format.
    #[serde(default)]
    pub timestamp: TimestampFormat,
    /// Disables ANSI color in text output.
    #[serde(default = "default_disable_color")]
    pub disable_color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_log_level(),
            timestamp: TimestampFormat::default(),
            disable_color: default_disable_color(),
        }
    }
}

impl LoggingConfig {
    /// Validates logging settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let level = self.level.trim();
        if level.is_empty() {
            return Err(ConfigError::Invalid("logging.level must be non-empty".to_string()));
        }
        if level.len() > MAX_LOG_LEVEL_LENGTH {
            return Err(ConfigError::Invalid("logging.level exceeds max length".to_string()));
        }
        if level.chars().any(|ch| ch.is_control() || ch.is_whitespace()) {
            return Err(ConfigError::Invalid(
                "logging.level must not contain whitespace or control characters".to_string(),
            ));
        }
        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human-readable text.
    Text,
}

impl LogFormat {
    /// Returns the config label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

/// Log timestamp format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    /// Subscriber default timestamps.
    Default,
    /// ISO 8601 with millisecond precision.
    Iso8601,
    /// RFC 3339 with second precision.
    #[default]
    Rfc3339,
    /// RFC 3339 with nanosecond precision.
    Rfc3339Nano,
    /// Milliseconds since the Unix epoch.
    Millis,
    /// Nanoseconds since the Unix epoch.
    Nanos,
    /// Seconds since the Unix epoch.
    Epoch,
}

impl TimestampFormat {
    /// Returns the config label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Iso8601 => "iso8601",
            Self::Rfc3339 => "rfc3339",
            Self::Rfc3339Nano => "rfc3339nano",
            Self::Millis => "millis",
            Self::Nanos => "nanos",
            Self::Epoch => "epoch",
        }
    }
}

/// Default message size limit.
const fn default_max_message_bytes() -> usize {
    DEFAULT_MAX_MESSAGE_BYTES
}

/// Default log filter directive.
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Color is off unless explicitly enabled.
const fn default_disable_color() -> bool {
    true
}

// ============================================================================
// SECTION: Path Resolution
// ============================================================================

/// Where a configuration path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path supplied by the caller.
    Explicit(PathBuf),
    /// Path read from `MCP_POLICY_CONFIG`.
    Environment(PathBuf),
    /// Default filename in the working directory.
    Default(PathBuf),
}

impl ConfigSource {
    /// Returns the resolved path.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(path) | Self::Environment(path) | Self::Default(path) => path,
        }
    }

    /// Returns true when a missing file is an error.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        !matches!(self, Self::Default(_))
    }
}

/// Resolves the config path from the caller, the environment, or defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the environment path is too long.
pub fn resolve_path(
    path: Option<&Path>,
    env_path: Option<OsString>,
) -> Result<ConfigSource, ConfigError> {
    if let Some(path) = path {
        return Ok(ConfigSource::Explicit(path.to_path_buf()));
    }
    if let Some(env_path) = env_path {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ConfigSource::Environment(PathBuf::from(env_path)));
    }
    Ok(ConfigSource::Default(PathBuf::from(DEFAULT_CONFIG_NAME)))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Reads a file, failing once it grows past `max_bytes`.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ConfigError> {
    let too_large = || ConfigError::Invalid("config file exceeds size limit".to_string());
    let file = File::open(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    let size = file.metadata().map_err(|err| ConfigError::Io(err.to_string()))?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| too_large())?;
    if size > limit {
        return Err(too_large());
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() > max_bytes {
        return Err(too_large());
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
