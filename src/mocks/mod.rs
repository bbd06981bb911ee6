//! Mock implementations for testing.
//!
//! Provides in-memory loggers and payload helpers for exercising listeners
//! without a real mailer or logging backend.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::{SinkError, TransportError};
use crate::logger::{LogContext, LogLevel, Logger};
use crate::types::{RawMessage, TransportExceptionEvent};

/// A log line captured by [`RecordingLogger`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    /// Log level.
    pub level: LogLevel,
    /// Full message, prefix included.
    pub message: String,
    /// Structured context.
    pub context: LogContext,
    /// When the record was captured.
    pub timestamp: DateTime<Utc>,
}

/// Logger that keeps every record in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl RecordingLogger {
    /// Creates an empty recording logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured records.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    /// Returns captured messages in order.
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|r| r.message.clone()).collect()
    }

    /// Returns the most recent record.
    pub fn last(&self) -> Option<LogRecord> {
        self.lock().last().cloned()
    }

    /// Returns the number of captured records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clears recorded data.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogRecord>> {
        // Records survive a panic in another holder.
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: LogLevel, message: &str, context: &LogContext) -> Result<(), SinkError> {
        self.lock().push(LogRecord {
            level,
            message: message.to_string(),
            context: context.clone(),
            timestamp: Utc::now(),
        });
        Ok(())
    }
}

/// Logger whose sink is always unavailable.
#[derive(Debug, Clone)]
pub struct FailingLogger {
    message: String,
}

impl FailingLogger {
    /// Creates a logger failing with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for FailingLogger {
    fn default() -> Self {
        Self::new("log sink unavailable")
    }
}

impl Logger for FailingLogger {
    fn log(&self, _level: LogLevel, _message: &str, _context: &LogContext) -> Result<(), SinkError> {
        Err(SinkError::new(self.message.clone()))
    }
}

/// Creates a serialized test message.
pub fn test_message() -> RawMessage {
    RawMessage::new(
        "From: sender@example.com\r\n\
         To: recipient@example.com\r\n\
         Subject: Test Subject\r\n\
         \r\n\
         Test body\r\n",
    )
}

/// Creates a transport exception event.
pub fn connection_refused() -> TransportExceptionEvent {
    TransportExceptionEvent::new(TransportError::new("Connection refused"))
}
