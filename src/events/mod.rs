//! Listener contracts and the synchronous event dispatcher.
//!
//! The dispatcher is owned by the mailer. At each lifecycle point it builds a
//! payload and notifies the registered listeners of that category in
//! registration order, until one cancels the bubble or returns an error.

use std::fmt;
use std::sync::Arc;

use crate::errors::ListenerResult;
use crate::types::{
    CommandEvent, Event, ResponseEvent, SendEvent, TransportChangeEvent, TransportExceptionEvent,
};

/// Receives message send notifications.
pub trait SendListener: Send + Sync {
    /// Invoked immediately before the message is sent.
    fn before_send_performed(&self, evt: &mut SendEvent<'_>) -> ListenerResult<()>;

    /// Invoked immediately after the message is sent.
    fn send_performed(&self, evt: &mut SendEvent<'_>) -> ListenerResult<()>;
}

/// Receives protocol command notifications.
pub trait CommandListener: Send + Sync {
    /// Invoked immediately following a command being sent.
    fn command_sent(&self, evt: &mut CommandEvent) -> ListenerResult<()>;
}

/// Receives protocol response notifications.
pub trait ResponseListener: Send + Sync {
    /// Invoked immediately following a response coming back.
    fn response_received(&self, evt: &mut ResponseEvent) -> ListenerResult<()>;
}

/// Receives transport start/stop notifications.
pub trait TransportChangeListener: Send + Sync {
    /// Invoked just before a transport is started.
    fn before_transport_started(&self, evt: &mut TransportChangeEvent) -> ListenerResult<()>;

    /// Invoked immediately after the transport is started.
    fn transport_started(&self, evt: &mut TransportChangeEvent) -> ListenerResult<()>;

    /// Invoked just before a transport is stopped.
    fn before_transport_stopped(&self, evt: &mut TransportChangeEvent) -> ListenerResult<()>;

    /// Invoked immediately after the transport is stopped.
    fn transport_stopped(&self, evt: &mut TransportChangeEvent) -> ListenerResult<()>;
}

/// Receives transport error notifications.
pub trait TransportExceptionListener: Send + Sync {
    /// Invoked as a transport error is raised inside the transport.
    fn exception_thrown(&self, evt: &mut TransportExceptionEvent) -> ListenerResult<()>;
}

/// Routes mailer events to registered listeners.
#[derive(Default)]
pub struct EventDispatcher {
    send: Vec<Arc<dyn SendListener>>,
    command: Vec<Arc<dyn CommandListener>>,
    response: Vec<Arc<dyn ResponseListener>>,
    transport_change: Vec<Arc<dyn TransportChangeListener>>,
    transport_exception: Vec<Arc<dyn TransportExceptionListener>>,
}

impl EventDispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a send listener.
    pub fn add_send_listener(&mut self, listener: Arc<dyn SendListener>) -> &mut Self {
        self.send.push(listener);
        self
    }

    /// Registers a command listener.
    pub fn add_command_listener(&mut self, listener: Arc<dyn CommandListener>) -> &mut Self {
        self.command.push(listener);
        self
    }

    /// Registers a response listener.
    pub fn add_response_listener(&mut self, listener: Arc<dyn ResponseListener>) -> &mut Self {
        self.response.push(listener);
        self
    }

    /// Registers a transport change listener.
    pub fn add_transport_change_listener(
        &mut self,
        listener: Arc<dyn TransportChangeListener>,
    ) -> &mut Self {
        self.transport_change.push(listener);
        self
    }

    /// Registers a transport exception listener.
    pub fn add_transport_exception_listener(
        &mut self,
        listener: Arc<dyn TransportExceptionListener>,
    ) -> &mut Self {
        self.transport_exception.push(listener);
        self
    }

    /// Registers one listener for all five categories.
    pub fn bind<T>(&mut self, listener: Arc<T>) -> &mut Self
    where
        T: SendListener
            + CommandListener
            + ResponseListener
            + TransportChangeListener
            + TransportExceptionListener
            + 'static,
    {
        self.send.push(listener.clone());
        self.command.push(listener.clone());
        self.response.push(listener.clone());
        self.transport_change.push(listener.clone());
        self.transport_exception.push(listener);
        self
    }

    /// Returns the total number of registrations across categories.
    pub fn listener_count(&self) -> usize {
        self.send.len()
            + self.command.len()
            + self.response.len()
            + self.transport_change.len()
            + self.transport_exception.len()
    }

    /// Dispatches a before-send notification.
    pub fn before_send_performed(&self, evt: &mut SendEvent<'_>) -> ListenerResult<()> {
        dispatch(&self.send, evt, |l, e| l.before_send_performed(e))
    }

    /// Dispatches a send-performed notification.
    pub fn send_performed(&self, evt: &mut SendEvent<'_>) -> ListenerResult<()> {
        dispatch(&self.send, evt, |l, e| l.send_performed(e))
    }

    /// Dispatches a command-sent notification.
    pub fn command_sent(&self, evt: &mut CommandEvent) -> ListenerResult<()> {
        dispatch(&self.command, evt, |l, e| l.command_sent(e))
    }

    /// Dispatches a response-received notification.
    pub fn response_received(&self, evt: &mut ResponseEvent) -> ListenerResult<()> {
        dispatch(&self.response, evt, |l, e| l.response_received(e))
    }

    /// Dispatches a before-transport-started notification.
    pub fn before_transport_started(&self, evt: &mut TransportChangeEvent) -> ListenerResult<()> {
        dispatch(&self.transport_change, evt, |l, e| l.before_transport_started(e))
    }

    /// Dispatches a transport-started notification.
    pub fn transport_started(&self, evt: &mut TransportChangeEvent) -> ListenerResult<()> {
        dispatch(&self.transport_change, evt, |l, e| l.transport_started(e))
    }

    /// Dispatches a before-transport-stopped notification.
    pub fn before_transport_stopped(&self, evt: &mut TransportChangeEvent) -> ListenerResult<()> {
        dispatch(&self.transport_change, evt, |l, e| l.before_transport_stopped(e))
    }

    /// Dispatches a transport-stopped notification.
    pub fn transport_stopped(&self, evt: &mut TransportChangeEvent) -> ListenerResult<()> {
        dispatch(&self.transport_change, evt, |l, e| l.transport_stopped(e))
    }

    /// Dispatches a transport exception.
    pub fn exception_thrown(&self, evt: &mut TransportExceptionEvent) -> ListenerResult<()> {
        dispatch(&self.transport_exception, evt, |l, e| l.exception_thrown(e))
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("send", &self.send.len())
            .field("command", &self.command.len())
            .field("response", &self.response.len())
            .field("transport_change", &self.transport_change.len())
            .field("transport_exception", &self.transport_exception.len())
            .finish()
    }
}

fn dispatch<L, E, F>(listeners: &[Arc<L>], evt: &mut E, mut call: F) -> ListenerResult<()>
where
    L: ?Sized,
    E: Event,
    F: FnMut(&L, &mut E) -> ListenerResult<()>,
{
    // The first listener always runs; the flag is checked after each call.
    for listener in listeners {
        call(&**listener, &mut *evt)?;
        if evt.bubble_cancelled() {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                listeners = listeners.len(),
                "Event bubble cancelled, skipping remaining listeners"
            );
            break;
        }
    }
    Ok(())
}
