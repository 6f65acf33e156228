pub mod core;
pub mod manager;
pub mod runtime;
pub mod token;


// Re-export the primary types so callers can use `crate::session::*`.
pub use self::core::{ConnectAttempt, LifecycleStats, PendingConnect, SessionBinding};
pub use manager::SessionManager;
pub use runtime::{Connection, Inbound, InboundSink, Transport, WebSocketTransport};
pub use token::{FileTokenStore, MemoryTokenStore, TokenSource};
