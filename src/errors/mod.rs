//! Error types for the mailer event logger.
//!
//! Listeners report two kinds of failure back to the dispatching mailer:
//! transport failures re-raised after logging, and failures of the logging
//! sink itself. Neither is recovered from locally.

use thiserror::Error;

/// Result type returned by listener callbacks and the dispatcher.
pub type ListenerResult<T> = Result<T, ListenerError>;

/// Result type for configuration parsing.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failure raised by (or on behalf of) a mail transport.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransportError {
    /// Human-readable message.
    message: String,
    /// SMTP status code if available.
    code: Option<u16>,
    /// Underlying cause.
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    /// Creates a new transport error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            cause: None,
        }
    }

    /// Sets the SMTP status code.
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    /// Sets the underlying cause.
    pub fn with_cause<E: std::error::Error + Send + Sync + 'static>(mut self, cause: E) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the SMTP status code if available.
    pub fn code(&self) -> Option<u16> {
        self.code
    }
}

/// Failure reported by a [`Logger`](crate::logger::Logger) implementation.
#[derive(Error, Debug)]
#[error("log sink failed: {message}")]
pub struct SinkError {
    message: String,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SinkError {
    /// Creates a new sink error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Sets the underlying cause.
    pub fn with_cause<E: std::error::Error + Send + Sync + 'static>(mut self, cause: E) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string()).with_cause(err)
    }
}

/// Error returned from a listener callback.
#[derive(Error, Debug)]
pub enum ListenerError {
    /// A transport failure that must reach the caller of the send operation.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The logging sink failed while handling an event.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl ListenerError {
    /// Returns the transport error, if this is one.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            ListenerError::Transport(err) => Some(err),
            ListenerError::Sink(_) => None,
        }
    }

    /// Returns true if this error came from the logging sink.
    pub fn is_sink(&self) -> bool {
        matches!(self, ListenerError::Sink(_))
    }
}

/// A mailer event name that does not match any known event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown mailer event: {0}")]
pub struct UnknownEvent(pub String);

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("invalid event logger configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A level name was not recognized.
    #[error("unknown log level: {0}")]
    UnknownLevel(String),
}
