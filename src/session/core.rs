//!
//! Session binding: the connection lifecycle driven by the observed token.
//!
//! The binding owns at most one [`Connection`] at a time. Every observed token is
//! compared with the token of the last connection attempt:
//!
//! * same token → nothing happens (a failed attempt is not retried);
//! * empty token → the live connection, if any, is closed;
//! * different token → the live connection is closed first, then a new attempt
//!   is made for the new token.
//!
//! Each attempt gets a new generation number. Inbound traffic carrying an older
//! generation belongs to a torn-down connection and is discarded.
//!
//! Connecting happens in two phases so that callers sharing the binding behind
//! a lock never hold it across the transport handshake:
//!
//! 1. [`SessionBinding::observe`] applies the token change and hands back a
//!    [`PendingConnect`] if an attempt is needed;
//! 2. the caller awaits [`PendingConnect::run`] with the lock released;
//! 3. [`SessionBinding::complete`] commits the result, or closes it if the
//!    attempt was superseded in the meantime.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use crate::error::SessionError;
use crate::events::{EventDispatcher, Toast};
use crate::session::runtime::{Connection, Inbound, InboundSink, Transport};
use crate::session::token::normalize;
use crate::types::ConnectionState;

/// Transitions buffered per state listener before the oldest are dropped.
const TRANSITION_CAPACITY: usize = 32;

/// Counters for the connection lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleStats {
    /// Connection attempts handed to the transport.
    pub attempts: u64,
    /// Attempts that produced a live connection.
    pub opened: u64,
    /// Live connections closed by the binding itself.
    pub teardowns: u64,
    /// Live connections ended by the remote side.
    pub remote_closes: u64,
}

/// A connection attempt that has been started but not yet handed to the transport.
pub struct PendingConnect {
    generation: u64,
    token: String,
    sink: InboundSink,
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl PendingConnect {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Runs the handshake, bounded by the connect timeout.
    pub async fn run(self) -> ConnectAttempt {
        let PendingConnect { generation, token, sink, transport, timeout } = self;
        tracing::debug!(generation, "opening session connection");
        let result = match tokio::time::timeout(timeout, transport.connect(&token, sink)).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::ConnectTimeout(timeout.as_millis() as u64)),
        };
        ConnectAttempt { generation, result }
    }
}

/// Outcome of [`PendingConnect::run`], to be passed to [`SessionBinding::complete`].
pub struct ConnectAttempt {
    generation: u64,
    result: Result<Box<dyn Connection>, SessionError>,
}

impl ConnectAttempt {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub struct SessionBinding {
    state: ConnectionState,
    /// Token of the most recent connection attempt, successful or not.
    token: Option<String>,
    generation: u64,
    /// Generation of the attempt currently in flight.
    in_flight: Option<u64>,
    connection: Option<Box<dyn Connection>>,
    transport: Arc<dyn Transport>,
    dispatcher: EventDispatcher,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    transitions: broadcast::Sender<ConnectionState>,
    connect_timeout: Duration,
    stats: LifecycleStats,
}

impl std::fmt::Debug for SessionBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBinding")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("in_flight", &self.in_flight)
            .field("has_token", &self.token.is_some())
            .field("stats", &self.stats)
            .finish()
    }
}

impl SessionBinding {
    /// Creates a disconnected binding and the receiver its connections deliver into.
    pub fn new(
        transport: Arc<dyn Transport>,
        dispatcher: EventDispatcher,
        connect_timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Inbound>) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (transitions, _) = broadcast::channel(TRANSITION_CAPACITY);
        let binding = SessionBinding {
            state: ConnectionState::Disconnected,
            token: None,
            generation: 0,
            in_flight: None,
            connection: None,
            transport,
            dispatcher,
            inbound_tx,
            transitions,
            connect_timeout,
            stats: LifecycleStats::default(),
        };
        (binding, inbound_rx)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> LifecycleStats {
        self.stats
    }

    pub fn has_connection(&self) -> bool {
        self.connection.is_some()
    }

    /// True while an attempt started by [`observe`](Self::observe) awaits completion.
    pub fn is_connecting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Every state change from now on, in order, including the short-lived
    /// `Reconnecting` step.
    pub fn transitions(&self) -> broadcast::Receiver<ConnectionState> {
        self.transitions.subscribe()
    }

    pub(crate) fn transition_sender(&self) -> broadcast::Sender<ConnectionState> {
        self.transitions.clone()
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut EventDispatcher {
        &mut self.dispatcher
    }

    /// Replaces the inbound channel, returning the new receiver.
    ///
    /// Connections opened before the swap keep sending into the old channel,
    /// so the live connection is torn down first.
    pub fn reattach(&mut self) -> mpsc::UnboundedReceiver<Inbound> {
        self.reset();
        let (tx, rx) = mpsc::unbounded_channel();
        self.inbound_tx = tx;
        rx
    }

    /// Reacts to one token observation, running any resulting attempt to completion.
    pub async fn observe_token(&mut self, observed: Option<String>) {
        if let Some(pending) = self.observe(observed) {
            let attempt = pending.run().await;
            self.complete(attempt);
        }
    }

    /// Applies one token observation without waiting on the transport.
    ///
    /// Returns the attempt to run when the token calls for a new connection.
    /// Starting a new attempt supersedes any attempt still in flight.
    pub fn observe(&mut self, observed: Option<String>) -> Option<PendingConnect> {
        let observed = normalize(observed);
        if observed == self.token {
            return None;
        }
        match observed {
            None => {
                tracing::info!(generation = self.generation, "session token cleared");
                self.reset();
                None
            }
            Some(token) => {
                if self.connection.is_some() {
                    self.set_state(ConnectionState::Reconnecting);
                    tracing::info!(generation = self.generation, "session token changed, reconnecting");
                    self.teardown();
                }
                Some(self.begin(token))
            }
        }
    }

    fn begin(&mut self, token: String) -> PendingConnect {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.token = Some(token.clone());
        self.stats.attempts += 1;
        self.set_state(ConnectionState::Connecting);
        PendingConnect {
            generation: self.generation,
            token,
            sink: InboundSink::new(self.generation, self.inbound_tx.clone()),
            transport: self.transport.clone(),
            timeout: self.connect_timeout,
        }
    }

    /// Commits the outcome of an attempt. Attempts that were superseded or
    /// cancelled by a reset are discarded, closing their connection if one opened.
    pub fn complete(&mut self, attempt: ConnectAttempt) {
        let ConnectAttempt { generation, result } = attempt;
        if self.in_flight != Some(generation) {
            tracing::debug!(stale = generation, current = self.generation, "discarding superseded attempt");
            if let Ok(mut connection) = result {
                connection.close();
            }
            return;
        }
        self.in_flight = None;
        match result {
            Ok(connection) => {
                self.connection = Some(connection);
                self.stats.opened += 1;
                self.set_state(ConnectionState::Connected);
                tracing::info!(generation, "session connected");
            }
            Err(e) => {
                self.set_state(ConnectionState::Disconnected);
                tracing::warn!(generation, error = %e, "session connection failed");
                self.dispatcher.notify(Toast::error(format!("Live updates unavailable: {}", e)));
            }
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            tracing::debug!(from = %self.state, to = %state, "session state");
            self.state = state;
            // No listeners is fine.
            let _ = self.transitions.send(state);
        }
    }

    /// Closes the live connection, if any.
    fn teardown(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.close();
            self.stats.teardowns += 1;
            tracing::debug!(generation = self.generation, "session connection closed");
        }
    }

    /// Back to `Disconnected` with no remembered token.
    fn reset(&mut self) {
        self.teardown();
        self.token = None;
        self.in_flight = None;
        self.set_state(ConnectionState::Disconnected);
    }

    /// Routes one piece of inbound traffic. Stale generations are ignored.
    pub fn handle_inbound(&mut self, inbound: Inbound) {
        if inbound.generation() != self.generation || self.connection.is_none() {
            tracing::trace!(
                stale = inbound.generation(),
                current = self.generation,
                "ignoring inbound from inactive connection"
            );
            return;
        }
        match inbound {
            Inbound::Frame { frame, .. } => {
                self.dispatcher.dispatch_frame(&frame);
            }
            Inbound::Closed { reason, .. } => {
                // The remote side already ended it; nothing left to close.
                self.connection = None;
                self.stats.remote_closes += 1;
                self.set_state(ConnectionState::Disconnected);
                tracing::warn!(generation = self.generation, %reason, "session closed by server");
                self.dispatcher.notify(Toast::warning(format!("Disconnected from live updates: {}", reason)));
            }
        }
    }

    /// Unmount: closes the connection, forgets the token and drops every subscription.
    pub fn shutdown(&mut self) {
        self.reset();
        let removed = self.dispatcher.unsubscribe_all();
        tracing::debug!(removed, "session binding shut down");
    }
}
