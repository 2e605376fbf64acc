// crates/mcp-policy-cli/src/main.rs
// ============================================================================
// Module: MCP Policy CLI Entry Point
// Description: Command dispatcher for offline MCP policy tooling.
// Purpose: Inspect messages, list policy functions, and validate config.
// Dependencies: clap, mcp-policy, mcp-policy-cli, mcp-policy-config, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The `mcp-policy` binary evaluates the registered MCP functions against a
//! single message read from a file or stdin and prints what a policy would
//! observe. It never opens a network listener. Security posture: message
//! input is untrusted and size-limited before it is decoded.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use mcp_policy::mcp_environment;
use mcp_policy_cli::logging;
use mcp_policy_cli::report::function_table;
use mcp_policy_cli::report::inspect;
use mcp_policy_config::LogFormat;
use mcp_policy_config::McpPolicyConfig;
use mcp_policy_config::TimestampFormat;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "mcp-policy", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (overrides `MCP_POLICY_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Log output format.
    #[arg(long, value_enum, value_name = "FORMAT", global = true)]
    log_format: Option<LogFormatArg>,
    /// Log level filter directive.
    #[arg(long, value_name = "FILTER", global = true)]
    log_level: Option<String>,
    /// Log timestamp format.
    #[arg(long, value_enum, value_name = "FORMAT", global = true)]
    log_timestamp: Option<TimestampArg>,
    /// Disable ANSI color in text logs.
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    disable_log_color: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate the MCP functions against one message.
    Inspect(InspectCommand),
    /// List the registered policy functions.
    Functions,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `inspect`.
#[derive(Args, Debug)]
struct InspectCommand {
    /// Message file, or `-` for stdin.
    #[arg(long, value_name = "PATH|-")]
    input: PathBuf,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration.
    Validate,
}

/// Log format flag values.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormatArg {
    /// One JSON object per event.
    Json,
    /// Human-readable text.
    Text,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Text => Self::Text,
        }
    }
}

/// Timestamp flag values.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TimestampArg {
    /// Subscriber default.
    Default,
    /// ISO 8601, milliseconds.
    Iso8601,
    /// RFC 3339, seconds.
    Rfc3339,
    /// RFC 3339, nanoseconds.
    #[value(name = "rfc3339nano")]
    Rfc3339Nano,
    /// Unix milliseconds.
    Millis,
    /// Unix nanoseconds.
    Nanos,
    /// Unix seconds.
    Epoch,
}

impl From<TimestampArg> for TimestampFormat {
    fn from(value: TimestampArg) -> Self {
        match value {
            TimestampArg::Default => Self::Default,
            TimestampArg::Iso8601 => Self::Iso8601,
            TimestampArg::Rfc3339 => Self::Rfc3339,
            TimestampArg::Rfc3339Nano => Self::Rfc3339Nano,
            TimestampArg::Millis => Self::Millis,
            TimestampArg::Nanos => Self::Nanos,
            TimestampArg::Epoch => Self::Epoch,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Loads configuration, installs logging, and dispatches the command.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    logging::init(&config.logging).map_err(|err| CliError::new(err.to_string()))?;

    match cli.command {
        Commands::Inspect(command) => command_inspect(&command, &config),
        Commands::Functions => command_functions(&config),
        Commands::Config {
            command: ConfigCommand::Validate,
        } => command_config_validate(),
    }
}

/// Loads the config file and applies logging flag overrides.
fn load_config(cli: &Cli) -> CliResult<McpPolicyConfig> {
    let mut config = McpPolicyConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    apply_overrides(&mut config, cli);
    config.validate().map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    Ok(config)
}

/// Applies logging flags on top of file configuration.
fn apply_overrides(config: &mut McpPolicyConfig, cli: &Cli) {
    if let Some(format) = cli.log_format {
        config.logging.format = format.into();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if let Some(timestamp) = cli.log_timestamp {
        config.logging.timestamp = timestamp.into();
    }
    if cli.disable_log_color {
        config.logging.disable_color = true;
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the inspect command.
fn command_inspect(command: &InspectCommand, config: &McpPolicyConfig) -> CliResult<ExitCode> {
    let limits = config.library.parse_limits();
    let env = mcp_environment(limits)
        .map_err(|err| CliError::new(format!("failed to build policy environment: {err}")))?;
    let message = read_input(&command.input, limits.max_message_bytes)?;
    info!(bytes = message.len(), "inspecting message");
    let report = inspect(&env, &message).map_err(|err| CliError::new(err.to_string()))?;
    write_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the function listing command.
fn command_functions(config: &McpPolicyConfig) -> CliResult<ExitCode> {
    let env = mcp_environment(config.library.parse_limits())
        .map_err(|err| CliError::new(format!("failed to build policy environment: {err}")))?;
    write_json(&function_table(&env))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the config validation command.
fn command_config_validate() -> CliResult<ExitCode> {
    write_stdout_line("config ok").map_err(|err| output_error("stdout", &err))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded reads.
#[derive(Debug)]
enum ReadLimitError {
    /// I/O failure.
    Io(std::io::Error),
    /// Input size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads the message from a file or stdin.
fn read_input(input: &Path, max_bytes: usize) -> CliResult<Vec<u8>> {
    let result = if input.as_os_str() == "-" {
        read_stream_with_limit(std::io::stdin().lock(), max_bytes)
    } else {
        read_bytes_with_limit(input, max_bytes)
    };
    result.map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(format!("failed to read {}: {err}", input.display()))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!(
            "input {} is {size} bytes, exceeding limit of {limit} bytes",
            input.display()
        )),
    })
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    read_stream_with_limit(file, max_bytes)
}

/// Reads at most one byte past the limit so oversize input is detected.
fn read_stream_with_limit<R: Read>(reader: R, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let read_limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    reader.take(read_limit).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes pretty JSON to stdout with a trailing newline.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| CliError::new(format!("failed to render report: {err}")))?;
    bytes.push(b'\n');
    std::io::stdout().write_all(&bytes).map_err(|err| output_error("stdout", &err))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> CliError {
    CliError::new(format!("failed to write {stream}: {error}"))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
