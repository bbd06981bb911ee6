//! # SMTP Event Logger
//!
//! Logs mailer activity through a pluggable leveled logger:
//! - Message sends (INFO on success, ERROR otherwise)
//! - Transport errors (ERROR, then re-raised to the caller)
//! - Protocol commands, responses and transport start/stop (DEBUG)
//!
//! Every level can be overridden or disabled per event.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use integrations_smtp_logger::{
//!     CommandEvent, EventDispatcher, EventLogger, LogLevel, MailerEvent,
//!     mocks::RecordingLogger,
//! };
//!
//! let sink = RecordingLogger::new();
//! let plugin = EventLogger::builder(Arc::new(sink.clone()))
//!     .level(MailerEvent::CommandSent, Some(LogLevel::Info))
//!     .build();
//!
//! let mut dispatcher = EventDispatcher::new();
//! dispatcher.bind(Arc::new(plugin));
//!
//! dispatcher.command_sent(&mut CommandEvent::new("EHLO example.com")).unwrap();
//! assert_eq!(sink.messages(), vec!["[MAILER] >> EHLO example.com"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// Logging capability
pub mod logger;

// Listener contracts
pub mod events;

// Plugin
pub mod plugin;

// Mocks for testing
pub mod mocks;

// Re-exports for convenience
pub use config::{EventLevelMap, EventLoggerConfig, DEFAULT_LEVELS, LOG_PREFIX};
pub use errors::{
    ConfigError, ConfigResult, ListenerError, ListenerResult, SinkError, TransportError,
    UnknownEvent,
};
pub use events::{
    CommandListener, EventDispatcher, ResponseListener, SendListener, TransportChangeListener,
    TransportExceptionListener,
};
#[cfg(feature = "tracing")]
pub use logger::TracingLogger;
pub use logger::{LogContext, LogLevel, Logger};
pub use plugin::{EventLogger, EventLoggerBuilder};
pub use types::{
    CommandEvent, Event, MailerEvent, Message, NamedTransport, RawMessage, ResponseEvent,
    SendEvent, SendStatus, TransportChangeEvent, TransportExceptionEvent,
};
