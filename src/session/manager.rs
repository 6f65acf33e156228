//! Owned session manager with an explicit `start()` / `stop()` lifecycle.
//!
//! The manager wraps a [`SessionBinding`] and, while running, a single
//! background task that multiplexes the token poll timer, inbound traffic, the
//! connection attempt in flight and cancellation. Hosts create one per
//! application root and pass it down.
//!
//! The binding lock is never held across a transport handshake, so state reads
//! and subscription changes stay responsive while an attempt is pending and
//! `stop()` abandons the attempt at once.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::events::{EventDispatcher, EventHandler, Notifier, ServerEvent};
use crate::session::core::{ConnectAttempt, LifecycleStats, SessionBinding};
use crate::session::runtime::{Inbound, Transport, WebSocketTransport};
use crate::session::token::TokenSource;
use crate::types::ConnectionState;

struct Running {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub struct SessionManager {
    binding: Arc<Mutex<SessionBinding>>,
    /// Receiver for the binding's current channel while stopped.
    idle_rx: Option<mpsc::UnboundedReceiver<Inbound>>,
    tokens: Arc<dyn TokenSource>,
    transitions: broadcast::Sender<ConnectionState>,
    poll_interval: Duration,
    running: Option<Running>,
}

impl SessionManager {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let dispatcher = EventDispatcher::new(notifier);
        let (binding, rx) = SessionBinding::new(transport, dispatcher, config.connect_timeout());
        let transitions = binding.transition_sender();
        SessionManager {
            binding: Arc::new(Mutex::new(binding)),
            idle_rx: Some(rx),
            tokens,
            transitions,
            poll_interval: config.poll_interval(),
            running: None,
        }
    }

    /// A manager backed by the WebSocket transport.
    pub fn websocket(config: &ClientConfig, tokens: Arc<dyn TokenSource>, notifier: Arc<dyn Notifier>) -> Self {
        let transport = Arc::new(WebSocketTransport::new(config.clone()));
        Self::new(config, transport, tokens, notifier)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub async fn state(&self) -> ConnectionState {
        self.binding.lock().await.state()
    }

    /// Every state change from now on, including the short-lived `Reconnecting` step.
    pub fn transitions(&self) -> broadcast::Receiver<ConnectionState> {
        self.transitions.subscribe()
    }

    pub async fn stats(&self) -> LifecycleStats {
        self.binding.lock().await.stats()
    }

    pub async fn subscribe(&self, event: ServerEvent) -> bool {
        self.binding.lock().await.dispatcher_mut().subscribe(event)
    }

    pub async fn subscribe_all(&self) {
        self.binding.lock().await.dispatcher_mut().subscribe_all();
    }

    pub async fn unsubscribe(&self, event: ServerEvent) -> bool {
        self.binding.lock().await.dispatcher_mut().unsubscribe(event)
    }

    /// Sets the callback that receives raw payloads of dispatched events.
    pub async fn set_handler(&self, handler: Option<EventHandler>) {
        self.binding.lock().await.dispatcher_mut().set_handler(handler);
    }

    /// Reads the token once and reacts to it. Hosts with an observable token
    /// store can call this from their change notification.
    pub async fn poll_now(&self) {
        let token = self.tokens.current_token().await;
        let pending = self.binding.lock().await.observe(token);
        if let Some(pending) = pending {
            let attempt = pending.run().await;
            self.binding.lock().await.complete(attempt);
        }
    }

    /// Spawns the poll loop. Must be called from within a Tokio runtime.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        if self.running.is_some() {
            return Err(SessionError::AlreadyStarted);
        }
        let rx = match self.idle_rx.take() {
            Some(rx) => rx,
            None => self.binding.lock().await.reattach(),
        };
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_loop(
            self.binding.clone(),
            self.tokens.clone(),
            rx,
            self.poll_interval,
            cancel.clone(),
        ));
        self.running = Some(Running { cancel, task });
        tracing::info!(poll_interval_ms = self.poll_interval.as_millis() as u64, "session manager started");
        Ok(())
    }

    /// Stops the loop, abandons any attempt in flight, closes the connection
    /// and drops every subscription. A no-op on a stopped manager.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        running.cancel.cancel();
        if let Err(e) = running.task.await {
            tracing::error!(error = %e, "session loop ended abnormally");
        }
        self.binding.lock().await.shutdown();
        tracing::info!("session manager stopped");
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancel.cancel();
        }
    }
}

/// Resolves with the attempt in flight, or never if there is none.
async fn next_attempt(pending: &mut Option<BoxFuture<'static, ConnectAttempt>>) -> ConnectAttempt {
    match pending {
        Some(attempt) => attempt.await,
        None => std::future::pending().await,
    }
}

async fn run_loop(
    binding: Arc<Mutex<SessionBinding>>,
    tokens: Arc<dyn TokenSource>,
    mut rx: mpsc::UnboundedReceiver<Inbound>,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut pending: Option<BoxFuture<'static, ConnectAttempt>> = None;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            Some(inbound) = rx.recv() => {
                binding.lock().await.handle_inbound(inbound);
            }
            attempt = next_attempt(&mut pending), if pending.is_some() => {
                pending = None;
                binding.lock().await.complete(attempt);
            }
            _ = ticker.tick() => {
                let token = tokens.current_token().await;
                let mut binding = binding.lock().await;
                match binding.observe(token) {
                    // Replacing the future drops a superseded handshake.
                    Some(next) => pending = Some(next.run().boxed()),
                    None if !binding.is_connecting() => pending = None,
                    None => {}
                }
            }
        }
    }
    tracing::debug!("session loop exited");
}
