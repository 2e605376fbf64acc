// crates/mcp-policy-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: Installs the process-wide tracing subscriber.
// Purpose: Route structured events to stderr in the configured shape.
// Dependencies: mcp-policy-config, time, tracing-subscriber
// ============================================================================

//! ## Overview
//! Library crates only emit `tracing` events; the CLI decides where they go.
//! Events are written to stderr so stdout stays reserved for reports. The
//! timestamp of every event is rendered by [`LogTimer`] using the `time`
//! crate, one shape per [`TimestampFormat`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io;

use mcp_policy_config::LogFormat;
use mcp_policy_config::LoggingConfig;
use mcp_policy_config::TimestampFormat;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

// ============================================================================
// SECTION: Timestamp Shapes
// ============================================================================

/// Microsecond UTC timestamps, matching the subscriber's built-in clock.
const DEFAULT_SHAPE: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");

/// ISO 8601 with millisecond precision.
const ISO8601_SHAPE: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// RFC 3339 truncated to whole seconds.
const RFC3339_SECONDS_SHAPE: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// Renders a UTC instant in the requested shape.
///
/// # Errors
///
/// Returns [`time::error::Format`] when the instant cannot be rendered.
pub fn render_timestamp(
    format: TimestampFormat,
    instant: OffsetDateTime,
) -> Result<String, time::error::Format> {
    let nanos = instant.unix_timestamp_nanos();
    match format {
        TimestampFormat::Default => instant.format(DEFAULT_SHAPE),
        TimestampFormat::Iso8601 => instant.format(ISO8601_SHAPE),
        TimestampFormat::Rfc3339 => instant.format(RFC3339_SECONDS_SHAPE),
        TimestampFormat::Rfc3339Nano => instant.format(&Rfc3339),
        TimestampFormat::Millis => Ok((nanos / 1_000_000).to_string()),
        TimestampFormat::Nanos => Ok(nanos.to_string()),
        TimestampFormat::Epoch => Ok(instant.unix_timestamp().to_string()),
    }
}

/// Event clock for the fmt layer.
#[derive(Debug, Clone, Copy)]
pub struct LogTimer {
    /// Selected timestamp shape.
    format: TimestampFormat,
}

impl LogTimer {
    /// Creates a timer for the given shape.
    #[must_use]
    pub const fn new(format: TimestampFormat) -> Self {
        Self {
            format,
        }
    }
}

impl FormatTime for LogTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let stamp = render_timestamp(self.format, OffsetDateTime::now_utc()).map_err(|_| fmt::Error)?;
        w.write_str(&stamp)
    }
}

// ============================================================================
// SECTION: Subscriber
// ============================================================================

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The level is not a valid filter directive.
    #[error("invalid log level `{level}`: {message}")]
    Filter {
        /// Rejected directive.
        level: String,
        /// Parser message.
        message: String,
    },
    /// A global subscriber was already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Builds the level filter for a configured directive.
///
/// # Errors
///
/// Returns [`LoggingError::Filter`] when the directive does not parse.
pub fn level_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(level).map_err(|err| LoggingError::Filter {
        level: level.to_string(),
        message: err.to_string(),
    })
}

/// Installs the global subscriber writing to stderr.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(level_filter(&config.level)?)
        .with_writer(io::stderr)
        .with_timer(LogTimer::new(config.timestamp))
        .with_ansi(!config.disable_color);
    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|err| LoggingError::Install(err.to_string()))
}
