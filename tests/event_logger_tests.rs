//! Integration tests for the event logger registered on a dispatcher.

use std::sync::Arc;

use integrations_smtp_logger::mocks::{connection_refused, test_message, FailingLogger, RecordingLogger};
use integrations_smtp_logger::{
    CommandEvent, Event, EventDispatcher, EventLogger, EventLoggerConfig, ListenerResult,
    LogLevel, MailerEvent, NamedTransport, ResponseEvent, SendEvent, SendStatus,
    TransportChangeEvent, TransportExceptionEvent, TransportExceptionListener, LOG_PREFIX,
};

struct SmtpTransport;

impl NamedTransport for SmtpTransport {}

fn bound(plugin: EventLogger) -> EventDispatcher {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.bind(Arc::new(plugin));
    dispatcher
}

#[test]
fn test_full_send_conversation_is_logged() {
    // Arrange
    let sink = RecordingLogger::new();
    let dispatcher = bound(EventLogger::new(Arc::new(sink.clone())));
    let transport = SmtpTransport;
    let message = test_message();

    // Act
    dispatcher
        .before_transport_started(&mut TransportChangeEvent::for_source(&transport))
        .unwrap();
    dispatcher
        .transport_started(&mut TransportChangeEvent::for_source(&transport))
        .unwrap();
    dispatcher
        .before_send_performed(&mut SendEvent::new(&message))
        .unwrap();
    dispatcher
        .command_sent(&mut CommandEvent::new("EHLO example.com\r\n"))
        .unwrap();
    dispatcher
        .response_received(&mut ResponseEvent::new("250 OK\r\n"))
        .unwrap();
    dispatcher
        .send_performed(&mut SendEvent::new(&message).with_status(SendStatus::Success))
        .unwrap();
    dispatcher
        .before_transport_stopped(&mut TransportChangeEvent::for_source(&transport))
        .unwrap();
    dispatcher
        .transport_stopped(&mut TransportChangeEvent::for_source(&transport))
        .unwrap();

    // Assert
    assert_eq!(
        sink.messages(),
        vec![
            "[MAILER] ++ Starting SmtpTransport",
            "[MAILER] ++ SmtpTransport started",
            "[MAILER] MESSAGE (beforeSend): ",
            "[MAILER] >> EHLO example.com",
            "[MAILER] << 250 OK",
            "[MAILER] MESSAGE (sendPerformed): ",
            "[MAILER] ++ Stopping SmtpTransport",
            "[MAILER] ++ SmtpTransport stopped",
        ]
    );
    let levels: Vec<LogLevel> = sink.records().iter().map(|r| r.level).collect();
    assert_eq!(levels[5], LogLevel::Info);
    assert!(levels
        .iter()
        .enumerate()
        .all(|(i, level)| i == 5 || *level == LogLevel::Debug));
}

#[test]
fn test_boxed_transport_logs_concrete_name() {
    // Arrange
    let sink = RecordingLogger::new();
    let dispatcher = bound(EventLogger::new(Arc::new(sink.clone())));
    let transport: Box<dyn NamedTransport> = Box::new(SmtpTransport);

    // Act
    dispatcher
        .transport_started(&mut TransportChangeEvent::for_source(&*transport))
        .unwrap();

    // Assert
    assert_eq!(sink.messages(), vec!["[MAILER] ++ SmtpTransport started"]);
}

#[test]
fn test_every_message_prefixed_once() {
    // Arrange
    let sink = RecordingLogger::new();
    let dispatcher = bound(EventLogger::new(Arc::new(sink.clone())));

    // Act
    dispatcher
        .command_sent(&mut CommandEvent::new("MAIL FROM:<a@example.com>"))
        .unwrap();
    dispatcher
        .response_received(&mut ResponseEvent::new("[MAILER] echoed"))
        .unwrap();

    // Assert
    for message in sink.messages() {
        assert!(message.starts_with(LOG_PREFIX));
        assert!(!message[LOG_PREFIX.len()..].starts_with(LOG_PREFIX));
    }
}

#[test]
fn test_send_performed_context() {
    // Arrange
    let sink = RecordingLogger::new();
    let dispatcher = bound(EventLogger::new(Arc::new(sink.clone())));
    let message = test_message();

    // Act
    dispatcher
        .send_performed(
            &mut SendEvent::new(&message)
                .with_status(SendStatus::Tentative)
                .with_failed_recipients(["bounced@example.com"]),
        )
        .unwrap();

    // Assert
    let record = sink.last().unwrap();
    assert_eq!(record.level, LogLevel::Error);
    assert_eq!(record.context["result"], serde_json::json!(256));
    assert_eq!(
        record.context["failed_recipients"],
        serde_json::json!(["bounced@example.com"])
    );
    assert_eq!(record.context["message"], serde_json::json!(message.as_str()));
}

#[test]
fn test_exception_is_logged_and_reraised() {
    // Arrange
    let sink = RecordingLogger::new();
    let dispatcher = bound(EventLogger::new(Arc::new(sink.clone())));
    let mut evt = connection_refused();

    // Act
    let result = dispatcher.exception_thrown(&mut evt);

    // Assert
    let err = result.unwrap_err();
    assert_eq!(err.as_transport().unwrap().message(), "Connection refused");
    assert_eq!(err.to_string(), "Connection refused");
    assert!(evt.bubble_cancelled());
    let record = sink.last().unwrap();
    assert_eq!(record.level, LogLevel::Error);
    assert_eq!(record.message, "[MAILER] !! Connection refused");
}

struct CountingListener(std::sync::atomic::AtomicUsize);

impl TransportExceptionListener for CountingListener {
    fn exception_thrown(&self, _evt: &mut TransportExceptionEvent) -> ListenerResult<()> {
        self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_exception_not_propagated_to_later_listeners() {
    // Arrange
    let sink = RecordingLogger::new();
    let later = Arc::new(CountingListener(Default::default()));
    let mut dispatcher = bound(EventLogger::new(Arc::new(sink.clone())));
    dispatcher.add_transport_exception_listener(later.clone());

    // Act
    let result = dispatcher.exception_thrown(&mut connection_refused());

    // Assert
    assert!(result.is_err());
    assert_eq!(later.0.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn test_disabled_events_are_dropped() {
    // Arrange
    let sink = RecordingLogger::new();
    let config = EventLoggerConfig::from_json(
        r#"{"levels": {"commandSent": "off", "response-received": null}}"#,
    )
    .unwrap();
    let dispatcher = bound(EventLogger::from_config(Arc::new(sink.clone()), &config));

    // Act
    dispatcher.command_sent(&mut CommandEvent::new("NOOP")).unwrap();
    dispatcher
        .response_received(&mut ResponseEvent::new("250 OK"))
        .unwrap();
    dispatcher
        .transport_started(&mut TransportChangeEvent::new("SmtpTransport"))
        .unwrap();

    // Assert
    assert_eq!(sink.messages(), vec!["[MAILER] ++ SmtpTransport started"]);
}

#[test]
fn test_unknown_override_keys_have_no_effect() {
    // Arrange
    let sink = RecordingLogger::new();
    let plugin = EventLogger::with_levels(
        Arc::new(sink.clone()),
        [("sendPerformed", Some(LogLevel::Debug)), ("made-up", None)],
    );

    // Act & Assert
    for event in MailerEvent::ALL {
        assert_eq!(
            plugin.levels().get(event),
            EventLoggerConfig::new().resolve().get(event)
        );
    }
}

#[test]
fn test_sink_failure_reaches_caller() {
    // Arrange
    let dispatcher = bound(EventLogger::new(Arc::new(FailingLogger::new("disk full"))));

    // Act
    let result = dispatcher.command_sent(&mut CommandEvent::new("QUIT"));

    // Assert
    let err = result.unwrap_err();
    assert!(err.is_sink());
    assert_eq!(err.to_string(), "log sink failed: disk full");
}
