//! Logged SMTP Conversation Example
//!
//! This example demonstrates how to:
//! - Route mailer events to `tracing` through the event logger
//! - Override and disable levels from a JSON configuration
//! - Observe a transport error being re-raised after it is logged
//!
//! Run with `cargo run --example logged_send --features tracing`.

use std::sync::Arc;

use integrations_smtp_logger::mocks::test_message;
use integrations_smtp_logger::{
    CommandEvent, EventDispatcher, EventLogger, EventLoggerConfig, NamedTransport, ResponseEvent,
    SendEvent, SendStatus, TracingLogger, TransportChangeEvent, TransportError,
    TransportExceptionEvent,
};

struct SmtpTransport;

impl NamedTransport for SmtpTransport {}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Promote commands to INFO and silence responses
    let config = EventLoggerConfig::from_json(
        r#"{"levels": {"command-sent": "info", "response-received": "off"}}"#,
    )?;
    let plugin = EventLogger::from_config(Arc::new(TracingLogger::new()), &config);

    let mut dispatcher = EventDispatcher::new();
    dispatcher.bind(Arc::new(plugin));

    let transport = SmtpTransport;
    let message = test_message();

    dispatcher.before_transport_started(&mut TransportChangeEvent::for_source(&transport))?;
    dispatcher.transport_started(&mut TransportChangeEvent::for_source(&transport))?;
    dispatcher.before_send_performed(&mut SendEvent::new(&message))?;

    for (command, response) in [
        ("EHLO example.com", "250 smtp.example.com"),
        ("MAIL FROM:<sender@example.com>", "250 OK"),
        ("RCPT TO:<recipient@example.com>", "250 OK"),
        ("DATA", "354 Start mail input"),
    ] {
        dispatcher.command_sent(&mut CommandEvent::new(command))?;
        dispatcher.response_received(&mut ResponseEvent::new(response))?;
    }

    dispatcher.send_performed(&mut SendEvent::new(&message).with_status(SendStatus::Success))?;

    // The logger re-raises transport errors to the caller
    let mut evt = TransportExceptionEvent::new(TransportError::new("Connection reset by peer"));
    if let Err(e) = dispatcher.exception_thrown(&mut evt) {
        eprintln!("Send failed: {}", e);
    }

    dispatcher.before_transport_stopped(&mut TransportChangeEvent::for_source(&transport))?;
    dispatcher.transport_stopped(&mut TransportChangeEvent::for_source(&transport))?;

    Ok(())
}
