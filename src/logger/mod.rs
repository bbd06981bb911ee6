//! Leveled logging capability consumed by the event logger.
//!
//! The mailer side never sees a concrete backend: everything goes through the
//! [`Logger`] trait, which mirrors a PSR-style `log(level, message, context)`
//! call and reports sink failures back to the caller.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, SinkError};

/// Structured context attached to a log line.
pub type LogContext = serde_json::Map<String, serde_json::Value>;

/// Log levels used by the event logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug level (protocol plumbing).
    Debug,
    /// Info level.
    Info,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level name.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::UnknownLevel(s.to_string())),
        }
    }
}

/// A leveled logging sink.
///
/// Implementations must not send mail through the mailer they are observing,
/// or logging a send will trigger another send.
#[cfg_attr(test, mockall::automock)]
pub trait Logger: Send + Sync {
    /// Writes one log line.
    fn log(&self, level: LogLevel, message: &str, context: &LogContext) -> Result<(), SinkError>;
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn log(&self, level: LogLevel, message: &str, context: &LogContext) -> Result<(), SinkError> {
        (**self).log(level, message, context)
    }
}

/// Forwards log lines to `tracing` events under the `mailer` target.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

#[cfg(feature = "tracing")]
impl TracingLogger {
    /// Creates a new tracing logger.
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "tracing")]
impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, context: &LogContext) -> Result<(), SinkError> {
        let context = if context.is_empty() {
            String::new()
        } else {
            serde_json::to_string(context).map_err(|e| SinkError::new(e.to_string()).with_cause(e))?
        };

        match level {
            LogLevel::Debug => tracing::debug!(target: "mailer", context = %context, "{}", message),
            LogLevel::Info => tracing::info!(target: "mailer", context = %context, "{}", message),
            LogLevel::Error => tracing::error!(target: "mailer", context = %context, "{}", message),
        }
        Ok(())
    }
}
