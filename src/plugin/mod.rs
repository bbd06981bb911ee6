//! The mailer event logger plugin.
//!
//! Message sends that succeed are logged at INFO and failures at ERROR.
//! Transport errors are logged at ERROR and then re-raised to the caller of
//! the send. Plumbing events (commands, responses, transport start/stop) are
//! logged at DEBUG. Every level can be overridden or disabled per event.
//!
//! The logger must not send mail through the mailer it observes, or each
//! logged send will trigger another one.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::{EventLevelMap, EventLoggerConfig, LOG_PREFIX};
use crate::errors::{ListenerResult, TransportError};
use crate::events::{
    CommandListener, ResponseListener, SendListener, TransportChangeListener,
    TransportExceptionListener,
};
use crate::logger::{LogContext, LogLevel, Logger};
use crate::types::{
    CommandEvent, Event, MailerEvent, ResponseEvent, SendEvent, TransportChangeEvent,
    TransportExceptionEvent,
};

/// Logs mailer activity through a [`Logger`].
#[derive(Clone)]
pub struct EventLogger {
    logger: Arc<dyn Logger>,
    levels: EventLevelMap,
}

impl EventLogger {
    /// Creates an event logger using the default level table.
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            logger,
            levels: EventLevelMap::defaults(),
        }
    }

    /// Creates an event logger with string-keyed level overrides.
    ///
    /// Unknown keys are accepted and have no effect.
    pub fn with_levels<I, K>(logger: Arc<dyn Logger>, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<LogLevel>)>,
        K: AsRef<str>,
    {
        let mut levels = EventLevelMap::defaults();
        levels.apply_overrides(overrides);
        Self { logger, levels }
    }

    /// Creates an event logger from a loaded configuration.
    pub fn from_config(logger: Arc<dyn Logger>, config: &EventLoggerConfig) -> Self {
        Self {
            logger,
            levels: config.resolve(),
        }
    }

    /// Returns a builder for typed overrides.
    pub fn builder(logger: Arc<dyn Logger>) -> EventLoggerBuilder {
        EventLoggerBuilder {
            logger,
            levels: EventLevelMap::defaults(),
        }
    }

    /// Returns the resolved level table.
    pub fn levels(&self) -> &EventLevelMap {
        &self.levels
    }

    fn log(&self, level: Option<LogLevel>, message: &str, context: &LogContext) -> ListenerResult<()> {
        // No level means the event is disabled.
        if let Some(level) = level {
            let line = format!("{}{}", LOG_PREFIX, message);
            self.logger.log(level, &line, context)?;
        }
        Ok(())
    }

    fn log_event(&self, event: MailerEvent, message: &str) -> ListenerResult<()> {
        self.log(self.levels.get(event), message, &LogContext::new())
    }
}

impl fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLogger")
            .field("prefix", &LOG_PREFIX)
            .field("levels", &self.levels)
            .finish_non_exhaustive()
    }
}

impl SendListener for EventLogger {
    fn before_send_performed(&self, evt: &mut SendEvent<'_>) -> ListenerResult<()> {
        let mut context = LogContext::new();
        context.insert("message".to_string(), Value::String(evt.message().render()));

        self.log(
            self.levels.get(MailerEvent::BeforeSend),
            "MESSAGE (beforeSend): ",
            &context,
        )
    }

    fn send_performed(&self, evt: &mut SendEvent<'_>) -> ListenerResult<()> {
        let status = evt.status();
        let level = if status.is_success() {
            self.levels.get(MailerEvent::SendSuccess)
        } else {
            self.levels.get(MailerEvent::SendFailure)
        };

        let mut context = LogContext::new();
        context.insert("result".to_string(), Value::from(status.code()));
        context.insert(
            "failed_recipients".to_string(),
            Value::from(evt.failed_recipients().to_vec()),
        );
        context.insert("message".to_string(), Value::String(evt.message().render()));

        self.log(level, "MESSAGE (sendPerformed): ", &context)
    }
}

impl CommandListener for EventLogger {
    fn command_sent(&self, evt: &mut CommandEvent) -> ListenerResult<()> {
        self.log_event(MailerEvent::CommandSent, &format!(">> {}", evt.command()))
    }
}

impl ResponseListener for EventLogger {
    fn response_received(&self, evt: &mut ResponseEvent) -> ListenerResult<()> {
        self.log_event(MailerEvent::ResponseReceived, &format!("<< {}", evt.response()))
    }
}

impl TransportChangeListener for EventLogger {
    fn before_transport_started(&self, evt: &mut TransportChangeEvent) -> ListenerResult<()> {
        self.log_event(
            MailerEvent::BeforeTransportStart,
            &format!("++ Starting {}", evt.transport_name()),
        )
    }

    fn transport_started(&self, evt: &mut TransportChangeEvent) -> ListenerResult<()> {
        self.log_event(
            MailerEvent::TransportStarted,
            &format!("++ {} started", evt.transport_name()),
        )
    }

    fn before_transport_stopped(&self, evt: &mut TransportChangeEvent) -> ListenerResult<()> {
        self.log_event(
            MailerEvent::BeforeTransportStop,
            &format!("++ Stopping {}", evt.transport_name()),
        )
    }

    fn transport_stopped(&self, evt: &mut TransportChangeEvent) -> ListenerResult<()> {
        self.log_event(
            MailerEvent::TransportStopped,
            &format!("++ {} stopped", evt.transport_name()),
        )
    }
}

impl TransportExceptionListener for EventLogger {
    fn exception_thrown(&self, evt: &mut TransportExceptionEvent) -> ListenerResult<()> {
        let message = evt.exception().message().to_string();
        self.log_event(MailerEvent::ExceptionThrown, &format!("!! {}", message))?;

        evt.cancel_bubble();
        Err(TransportError::new(message).into())
    }
}

/// Builder for [`EventLogger`] with typed level overrides.
pub struct EventLoggerBuilder {
    logger: Arc<dyn Logger>,
    levels: EventLevelMap,
}

impl EventLoggerBuilder {
    /// Sets the level for an event; `None` disables it.
    pub fn level(mut self, event: MailerEvent, level: Option<LogLevel>) -> Self {
        self.levels.set(event, level);
        self
    }

    /// Disables an event.
    pub fn disable(self, event: MailerEvent) -> Self {
        self.level(event, None)
    }

    /// Builds the event logger.
    pub fn build(self) -> EventLogger {
        EventLogger {
            logger: self.logger,
            levels: self.levels,
        }
    }
}
