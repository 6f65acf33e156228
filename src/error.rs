//!
//! Defines error types for the leave client core.

/// Errors raised while interpreting access-control input.
///
/// Lookups themselves never fail; this only surfaces when a caller asks for a
/// strict parse of a role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// The role name does not match any known role.
    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

/// Errors in client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The base URL could not be parsed or uses an unsupported scheme.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    /// A duration setting was not a positive integer of milliseconds.
    #[error("Invalid value for {name}: {value}")]
    InvalidDuration { name: &'static str, value: String },
}

/// Errors produced by the session binding and its transports.
///
/// None of these are fatal to the host; the binding reports them as toasts
/// and returns to `Disconnected`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Endpoint construction failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// The token cannot be carried in a handshake header.
    #[error("Session token is not a valid header value")]
    InvalidToken,
    /// The transport could not establish a connection.
    #[error("Connection failed: {0}")]
    ConnectFailed(String),
    /// The transport did not answer within the connect timeout.
    #[error("Connection attempt timed out after {0} ms")]
    ConnectTimeout(u64),
    /// An inbound frame was not valid JSON of the expected shape.
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),
    /// `start()` was called on a running session manager.
    #[error("Session manager is already running")]
    AlreadyStarted,
}

/// Errors at the REST boundary, produced from an [`ApiOutcome`](crate::api::ApiOutcome).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a failure envelope or a non-2xx status.
    #[error("{0}")]
    Remote(String),
}
