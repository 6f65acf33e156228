//!
//! Fan-out of server events to the user.
//!
//! Every subscribed event is routed through one shared handler: it emits a
//! [`Toast`] through the configured [`Notifier`] and forwards the raw payload to
//! the optional caller-supplied [`EventHandler`]. Because all names share that
//! one handler, unsubscribing everything is a single pass over the set.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::events::event::{Frame, ServerEvent};

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Toast { level, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Error, message)
    }

    /// The toast for `event`: the payload's `message`, else its `type`, else the event name.
    pub fn for_event(event: ServerEvent, payload: &Value) -> Self {
        let text = ["message", "type"]
            .iter()
            .filter_map(|key| payload.get(key).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| event.wire_name().to_string());
        let level = match event {
            ServerEvent::LeaveRequestApproved => ToastLevel::Success,
            ServerEvent::LeaveRequestRejected => ToastLevel::Warning,
            _ => ToastLevel::Info,
        };
        Toast::new(level, text)
    }
}

/// Sink for toasts. The host UI implements this.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Writes toasts to the log. Useful for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Info | ToastLevel::Success => {
                tracing::info!(level = ?toast.level, "{}", toast.message)
            }
            ToastLevel::Warning => tracing::warn!("{}", toast.message),
            ToastLevel::Error => tracing::error!("{}", toast.message),
        }
    }
}

/// Caller-supplied callback receiving the raw payload of every dispatched event.
pub type EventHandler = Arc<dyn Fn(ServerEvent, &Value) + Send + Sync>;

/// Routes subscribed events to the shared handler.
pub struct EventDispatcher {
    subscriptions: BTreeSet<ServerEvent>,
    handler: Option<EventHandler>,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscriptions", &self.subscriptions)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl EventDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        EventDispatcher { subscriptions: BTreeSet::new(), handler: None, notifier }
    }

    pub fn set_handler(&mut self, handler: Option<EventHandler>) {
        self.handler = handler;
    }

    /// Returns `false` if `event` was already subscribed.
    pub fn subscribe(&mut self, event: ServerEvent) -> bool {
        self.subscriptions.insert(event)
    }

    pub fn subscribe_all(&mut self) {
        self.subscriptions.extend(ServerEvent::ALL);
    }

    /// Returns `false` if `event` was not subscribed.
    pub fn unsubscribe(&mut self, event: ServerEvent) -> bool {
        self.subscriptions.remove(&event)
    }

    /// Drops every subscription and the custom handler. Returns how many names were removed.
    pub fn unsubscribe_all(&mut self) -> usize {
        let n = self.subscriptions.len();
        self.subscriptions.clear();
        self.handler = None;
        n
    }

    pub fn is_subscribed(&self, event: ServerEvent) -> bool {
        self.subscriptions.contains(&event)
    }

    pub fn subscriptions(&self) -> impl Iterator<Item = ServerEvent> + '_ {
        self.subscriptions.iter().copied()
    }

    /// Emits a toast not tied to an event (connection errors and the like).
    pub fn notify(&self, toast: Toast) {
        self.notifier.notify(toast);
    }

    /// Delivers `payload` for `event`. Returns whether anything was delivered.
    pub fn dispatch(&self, event: ServerEvent, payload: &Value) -> bool {
        if !self.is_subscribed(event) {
            tracing::debug!(%event, "event not subscribed, dropping");
            return false;
        }
        self.notifier.notify(Toast::for_event(event, payload));
        if let Some(handler) = &self.handler {
            handler(event, payload);
        }
        true
    }

    pub fn dispatch_frame(&self, frame: &Frame) -> bool {
        match frame.server_event() {
            Some(event) => self.dispatch(event, &frame.payload),
            None => {
                tracing::debug!(event = %frame.event, "unrecognised event, dropping");
                false
            }
        }
    }
}
