//! Event identifiers and payloads dispatched by the mailer.
//!
//! Payloads borrow what they describe: the mailer builds one per lifecycle
//! point, hands it to each registered listener in turn, and drops it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{TransportError, UnknownEvent};

/// The ten mailer events that can be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MailerEvent {
    /// Immediately before a message is sent.
    BeforeSend,
    /// A message was sent successfully.
    SendSuccess,
    /// A message send did not succeed.
    SendFailure,
    /// The transport raised an exception.
    ExceptionThrown,
    /// A protocol command was written.
    CommandSent,
    /// A protocol response was read.
    ResponseReceived,
    /// A transport is about to start.
    BeforeTransportStart,
    /// A transport has started.
    TransportStarted,
    /// A transport is about to stop.
    BeforeTransportStop,
    /// A transport has stopped.
    TransportStopped,
}

impl MailerEvent {
    /// Every event, in table order.
    pub const ALL: [MailerEvent; 10] = [
        MailerEvent::BeforeSend,
        MailerEvent::SendSuccess,
        MailerEvent::SendFailure,
        MailerEvent::ExceptionThrown,
        MailerEvent::CommandSent,
        MailerEvent::ResponseReceived,
        MailerEvent::BeforeTransportStart,
        MailerEvent::TransportStarted,
        MailerEvent::BeforeTransportStop,
        MailerEvent::TransportStopped,
    ];

    /// Returns the canonical event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MailerEvent::BeforeSend => "before-send",
            MailerEvent::SendSuccess => "send-success",
            MailerEvent::SendFailure => "send-failure",
            MailerEvent::ExceptionThrown => "exception-thrown",
            MailerEvent::CommandSent => "command-sent",
            MailerEvent::ResponseReceived => "response-received",
            MailerEvent::BeforeTransportStart => "before-transport-start",
            MailerEvent::TransportStarted => "transport-started",
            MailerEvent::BeforeTransportStop => "before-transport-stop",
            MailerEvent::TransportStopped => "transport-stopped",
        }
    }

    /// Returns the listener-method style key historically used for this event.
    pub fn legacy_key(&self) -> &'static str {
        match self {
            MailerEvent::BeforeSend => "beforeSendPerformed",
            MailerEvent::SendSuccess => "sendPerformed.SUCCESS",
            MailerEvent::SendFailure => "sendPerformed.NOT_SUCCESS",
            MailerEvent::ExceptionThrown => "exceptionThrown",
            MailerEvent::CommandSent => "commandSent",
            MailerEvent::ResponseReceived => "responseReceived",
            MailerEvent::BeforeTransportStart => "beforeTransportStarted",
            MailerEvent::TransportStarted => "transportStarted",
            MailerEvent::BeforeTransportStop => "beforeTransportStopped",
            MailerEvent::TransportStopped => "transportStopped",
        }
    }

    /// Looks up an event by canonical name or legacy key.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == name || event.legacy_key() == name)
    }
}

impl fmt::Display for MailerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MailerEvent {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

/// Outcome of a send operation as reported by the mailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendStatus {
    /// Sending has not been attempted yet.
    Pending,
    /// The message was spooled for later delivery.
    Spooled,
    /// Every recipient was accepted.
    Success,
    /// Some recipients were accepted.
    Tentative,
    /// The send failed.
    Failed,
}

impl SendStatus {
    /// Returns the mailer's numeric result code.
    pub fn code(&self) -> u32 {
        match self {
            SendStatus::Pending => 0x0001,
            SendStatus::Spooled => 0x0011,
            SendStatus::Success => 0x0010,
            SendStatus::Tentative => 0x0100,
            SendStatus::Failed => 0x1000,
        }
    }

    /// Returns true only for a complete success.
    pub fn is_success(&self) -> bool {
        matches!(self, SendStatus::Success)
    }
}

/// A message the mailer can serialize for logging.
pub trait Message {
    /// Renders the full message (headers and body) as it would go on the wire.
    fn render(&self) -> String;
}

/// An already-serialized message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage(String);

impl RawMessage {
    /// Wraps serialized message text.
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    /// Returns the message text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Message for RawMessage {
    fn render(&self) -> String {
        self.0.clone()
    }
}

/// Propagation flag shared by all event payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bubble {
    cancelled: bool,
}

impl Bubble {
    /// Stops the event from reaching any further listener.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Returns true once propagation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Behaviour common to every event payload.
pub trait Event {
    /// Returns the propagation flag.
    fn bubble(&self) -> &Bubble;

    /// Returns the propagation flag mutably.
    fn bubble_mut(&mut self) -> &mut Bubble;

    /// Stops further listeners from seeing this event.
    fn cancel_bubble(&mut self) {
        self.bubble_mut().cancel();
    }

    /// Returns true if a listener cancelled propagation.
    fn bubble_cancelled(&self) -> bool {
        self.bubble().is_cancelled()
    }
}

macro_rules! impl_event {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Event for $ty {
                fn bubble(&self) -> &Bubble {
                    &self.bubble
                }

                fn bubble_mut(&mut self) -> &mut Bubble {
                    &mut self.bubble
                }
            }
        )+
    };
}

/// Raised before and after a message is sent.
pub struct SendEvent<'a> {
    message: &'a dyn Message,
    status: SendStatus,
    failed_recipients: Vec<String>,
    bubble: Bubble,
}

impl<'a> SendEvent<'a> {
    /// Creates a pending send event for a message.
    pub fn new(message: &'a dyn Message) -> Self {
        Self {
            message,
            status: SendStatus::Pending,
            failed_recipients: Vec::new(),
            bubble: Bubble::default(),
        }
    }

    /// Sets the send status.
    pub fn with_status(mut self, status: SendStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the recipients the server rejected.
    pub fn with_failed_recipients<I, S>(mut self, recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failed_recipients = recipients.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the message being sent.
    pub fn message(&self) -> &dyn Message {
        self.message
    }

    /// Returns the send status.
    pub fn status(&self) -> SendStatus {
        self.status
    }

    /// Returns the rejected recipient addresses.
    pub fn failed_recipients(&self) -> &[String] {
        &self.failed_recipients
    }
}

impl fmt::Debug for SendEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendEvent")
            .field("status", &self.status)
            .field("failed_recipients", &self.failed_recipients)
            .field("bubble", &self.bubble)
            .finish_non_exhaustive()
    }
}

/// Raised after a protocol command was written.
#[derive(Debug, Clone)]
pub struct CommandEvent {
    command: String,
    bubble: Bubble,
}

impl CommandEvent {
    /// Creates a command event.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            bubble: Bubble::default(),
        }
    }

    /// Returns the command text, without the trailing CRLF.
    pub fn command(&self) -> &str {
        self.command.trim_end_matches(['\r', '\n'])
    }
}

/// Raised after a protocol response was read.
#[derive(Debug, Clone)]
pub struct ResponseEvent {
    response: String,
    bubble: Bubble,
}

impl ResponseEvent {
    /// Creates a response event.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            bubble: Bubble::default(),
        }
    }

    /// Returns the response text, without the trailing CRLF.
    pub fn response(&self) -> &str {
        self.response.trim_end_matches(['\r', '\n'])
    }
}

/// A transport that can name itself in log lines.
///
/// The default name is the implementing type's own name, so a transport held
/// as `Box<dyn NamedTransport>` still reports its concrete type.
pub trait NamedTransport {
    /// Returns the transport's display name.
    fn transport_name(&self) -> String {
        short_type_name::<Self>()
    }
}

/// Raised around transport start and stop.
#[derive(Debug, Clone)]
pub struct TransportChangeEvent {
    transport: String,
    bubble: Bubble,
}

impl TransportChangeEvent {
    /// Creates an event for a transport with the given type name.
    pub fn new(transport: impl Into<String>) -> Self {
        Self {
            transport: transport.into(),
            bubble: Bubble::default(),
        }
    }

    /// Creates an event named after `source`.
    pub fn for_source<T: NamedTransport + ?Sized>(source: &T) -> Self {
        Self::new(source.transport_name())
    }

    /// Returns the transport type name.
    pub fn transport_name(&self) -> &str {
        &self.transport
    }
}

/// Raised when the transport hits an error.
#[derive(Debug)]
pub struct TransportExceptionEvent {
    exception: TransportError,
    bubble: Bubble,
}

impl TransportExceptionEvent {
    /// Creates an exception event.
    pub fn new(exception: TransportError) -> Self {
        Self {
            exception,
            bubble: Bubble::default(),
        }
    }

    /// Returns the transport error.
    pub fn exception(&self) -> &TransportError {
        &self.exception
    }

    /// Consumes the event, returning the transport error.
    pub fn into_exception(self) -> TransportError {
        self.exception
    }
}

impl_event!(
    SendEvent<'_>,
    CommandEvent,
    ResponseEvent,
    TransportChangeEvent,
    TransportExceptionEvent,
);

/// Strips module paths from every segment of a type name.
///
/// `my_crate::transport::SmtpTransport` becomes `SmtpTransport`, and
/// `(u8, my_crate::SmtpTransport)` becomes `(u8, SmtpTransport)`.
pub fn short_type_name<T: ?Sized>() -> String {
    strip_paths(std::any::type_name::<T>())
}

fn strip_paths(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut word = String::new();
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_alphanumeric() || c == '_' {
            word.push(c);
        } else if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            word.clear();
        } else {
            out.push_str(&word);
            word.clear();
            out.push(c);
        }
    }
    out.push_str(&word);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SmtpTransport;

    impl NamedTransport for SmtpTransport {}

    struct RelayTransport;

    impl NamedTransport for RelayTransport {
        fn transport_name(&self) -> String {
            "relay.example.com".to_string()
        }
    }

    #[test]
    fn test_event_names_roundtrip() {
        for event in MailerEvent::ALL {
            assert_eq!(event.as_str().parse::<MailerEvent>().unwrap(), event);
            assert_eq!(MailerEvent::from_name(event.legacy_key()), Some(event));
        }
        let err = "sendPerformed".parse::<MailerEvent>().unwrap_err();
        assert_eq!(err.to_string(), "unknown mailer event: sendPerformed");
    }

    #[test]
    fn test_event_serde_name() {
        let json = serde_json::to_string(&MailerEvent::BeforeTransportStart).unwrap();
        assert_eq!(json, "\"before-transport-start\"");
    }

    #[test]
    fn test_send_status_codes() {
        assert_eq!(SendStatus::Success.code(), 16);
        assert_eq!(SendStatus::Failed.code(), 4096);
        assert!(SendStatus::Success.is_success());
        assert!(!SendStatus::Tentative.is_success());
        assert!(!SendStatus::Spooled.is_success());
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<SmtpTransport>(), "SmtpTransport");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec<u8>");
        assert_eq!(short_type_name::<(u8, SmtpTransport)>(), "(u8, SmtpTransport)");
        assert_eq!(short_type_name::<[SmtpTransport; 2]>(), "[SmtpTransport; 2]");
        assert_eq!(short_type_name::<&SmtpTransport>(), "&SmtpTransport");
        assert_eq!(
            short_type_name::<Vec<std::string::String>>(),
            "Vec<String>"
        );
    }

    #[test]
    fn test_transport_name_through_trait_object() {
        let boxed: Box<dyn NamedTransport> = Box::new(SmtpTransport);
        assert_eq!(
            TransportChangeEvent::for_source(&*boxed).transport_name(),
            "SmtpTransport"
        );
        assert_eq!(
            TransportChangeEvent::for_source(&SmtpTransport).transport_name(),
            "SmtpTransport"
        );
        assert_eq!(
            TransportChangeEvent::for_source(&RelayTransport).transport_name(),
            "relay.example.com"
        );
    }

    #[test]
    fn test_command_strips_crlf() {
        let evt = CommandEvent::new("EHLO example.com\r\n");
        assert_eq!(evt.command(), "EHLO example.com");

        let evt = ResponseEvent::new("250 OK\r\n");
        assert_eq!(evt.response(), "250 OK");
    }

    #[test]
    fn test_cancel_bubble() {
        let mut evt = TransportExceptionEvent::new(TransportError::new("boom"));
        assert!(!evt.bubble_cancelled());
        evt.cancel_bubble();
        assert!(evt.bubble_cancelled());
        assert_eq!(evt.into_exception().message(), "boom");
    }

    #[test]
    fn test_send_event_accessors() {
        let message = RawMessage::new("Subject: hi\r\n\r\nbody");
        let evt = SendEvent::new(&message)
            .with_status(SendStatus::Tentative)
            .with_failed_recipients(["bad@example.com"]);
        assert_eq!(evt.status(), SendStatus::Tentative);
        assert_eq!(evt.failed_recipients(), &["bad@example.com".to_string()]);
        assert_eq!(evt.message().render(), "Subject: hi\r\n\r\nbody");
    }
}
