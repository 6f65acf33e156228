//! Test doubles for the session binding, available with the `test-utils` feature.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::SessionError;
use crate::events::{Notifier, Toast};
use crate::session::runtime::{Connection, InboundSink, Transport};

/// Collects every toast it is given.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().clone()
    }

    pub fn clear(&self) {
        self.toasts.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().push(toast);
    }
}

#[derive(Debug, Default)]
struct MockState {
    connects: Vec<String>,
    closes: usize,
    live: usize,
    max_live: usize,
    sinks: Vec<InboundSink>,
    failing: HashSet<String>,
    stall: bool,
}

/// Scripted transport. Records every connect and close, and keeps the sink of
/// each successful connection so tests can push traffic through it.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection attempts for `token` fail from now on.
    pub fn fail_for(&self, token: &str) {
        self.state.lock().failing.insert(token.to_string());
    }

    /// While set, connection attempts never resolve.
    pub fn set_stall(&self, stall: bool) {
        self.state.lock().stall = stall;
    }

    /// Tokens of every connection attempt, in order.
    pub fn connects(&self) -> Vec<String> {
        self.state.lock().connects.clone()
    }

    /// Connections closed through [`Connection::close`].
    pub fn closes(&self) -> usize {
        self.state.lock().closes
    }

    /// Connections currently open.
    pub fn live(&self) -> usize {
        self.state.lock().live
    }

    /// Highest number of simultaneously open connections seen.
    pub fn max_live(&self) -> usize {
        self.state.lock().max_live
    }

    /// Sink of the most recent successful connection.
    pub fn last_sink(&self) -> Option<InboundSink> {
        self.state.lock().sinks.last().cloned()
    }

    pub fn sink(&self, index: usize) -> Option<InboundSink> {
        self.state.lock().sinks.get(index).cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, token: &str, sink: InboundSink) -> Result<Box<dyn Connection>, SessionError> {
        let stall = {
            let mut state = self.state.lock();
            state.connects.push(token.to_string());
            if state.failing.contains(token) {
                return Err(SessionError::ConnectFailed("connection refused".to_string()));
            }
            state.stall
        };
        if stall {
            std::future::pending::<()>().await;
        }
        {
            let mut state = self.state.lock();
            state.sinks.push(sink);
            state.live += 1;
            state.max_live = state.max_live.max(state.live);
        }
        Ok(Box::new(MockConnection { state: self.state.clone(), closed: false }))
    }
}

struct MockConnection {
    state: Arc<Mutex<MockState>>,
    closed: bool,
}

impl Connection for MockConnection {
    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let mut state = self.state.lock();
            state.closes += 1;
            state.live -= 1;
        }
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        if !self.closed {
            self.state.lock().live -= 1;
        }
    }
}
