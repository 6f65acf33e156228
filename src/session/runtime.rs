//! Session transport abstraction.
//!
//! A `Transport` opens the push channel for one token and feeds everything it
//! receives into an [`InboundSink`]. Keeping the channel behind a trait lets the
//! lifecycle logic in `core` stay independent of the wire, and lets tests swap
//! in a scripted transport.
//!
//! [`WebSocketTransport`] is the production implementation.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::events::{decode_frame, Frame};

/// Traffic delivered from a connection to its binding, tagged with the
/// generation of the connection attempt that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Frame { generation: u64, frame: Frame },
    /// The remote side ended the stream.
    Closed { generation: u64, reason: String },
}

impl Inbound {
    pub fn generation(&self) -> u64 {
        match self {
            Inbound::Frame { generation, .. } | Inbound::Closed { generation, .. } => *generation,
        }
    }
}

/// Where a connection delivers its traffic.
#[derive(Debug, Clone)]
pub struct InboundSink {
    generation: u64,
    tx: mpsc::UnboundedSender<Inbound>,
}

impl InboundSink {
    pub fn new(generation: u64, tx: mpsc::UnboundedSender<Inbound>) -> Self {
        InboundSink { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `false` once the binding has gone away.
    pub fn frame(&self, frame: Frame) -> bool {
        self.tx.send(Inbound::Frame { generation: self.generation, frame }).is_ok()
    }

    pub fn closed(&self, reason: impl Into<String>) -> bool {
        self.tx
            .send(Inbound::Closed { generation: self.generation, reason: reason.into() })
            .is_ok()
    }
}

/// A live channel. Closing must be synchronous from the caller's point of view:
/// once `close` returns, the connection may not deliver anything further.
pub trait Connection: Send {
    fn close(&mut self);
}

/// Trait implemented by pluggable transports.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn connect(&self, token: &str, sink: InboundSink) -> Result<Box<dyn Connection>, SessionError>;
}

/// WebSocket push channel.
///
/// The token travels both as the `token` query parameter and as a bearer
/// `Authorization` header on the upgrade request.
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    config: ClientConfig,
}

impl WebSocketTransport {
    pub fn new(config: ClientConfig) -> Self {
        WebSocketTransport { config }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&self, token: &str, sink: InboundSink) -> Result<Box<dyn Connection>, SessionError> {
        let url = self.config.socket_url(token)?;
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| SessionError::ConnectFailed(e.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| SessionError::InvalidToken)?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|e| SessionError::ConnectFailed(e.to_string()))?;
        tracing::info!(
            host = url.host_str().unwrap_or_default(),
            path = url.path(),
            generation = sink.generation(),
            "websocket connected"
        );

        let cancel = CancellationToken::new();
        tokio::spawn(read_loop(stream, sink, cancel.clone()));
        Ok(Box::new(WebSocketConnection { cancel }))
    }
}

struct WebSocketConnection {
    cancel: CancellationToken,
}

impl Connection for WebSocketConnection {
    fn close(&mut self) {
        self.cancel.cancel();
    }
}

impl Drop for WebSocketConnection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn read_loop(
    mut stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    sink: InboundSink,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                if let Err(e) = stream.close(None).await {
                    tracing::debug!(error = %e, "websocket close handshake failed");
                }
                return;
            }
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => match decode_frame(&text) {
                    Ok(frame) => {
                        if !sink.frame(frame) {
                            return;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "dropping inbound frame"),
                },
                Some(Ok(Message::Close(close))) => {
                    let reason = close
                        .map(|c| c.reason.to_string())
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| "closed by server".to_string());
                    sink.closed(reason);
                    return;
                }
                // Pings are answered by tungstenite; binary frames carry nothing for us.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    sink.closed(e.to_string());
                    return;
                }
                None => {
                    sink.closed("stream ended");
                    return;
                }
            }
        }
    }
}
