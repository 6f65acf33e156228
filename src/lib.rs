#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! Leave-Core is the client-side core of the leave/HR management dashboards.
//!
//! It provides two independent pieces:
//! - a role → permission table with pure, fail-closed lookups that decide what
//!   each dashboard renders and allows, and
//! - a session binding that keeps one push connection tied to the current
//!   session token and fans server events out to subscribers as toasts.
//!
//! Permission checks here are UI gating only and never a security boundary.

// Shared data types (Role, ConnectionState).
pub mod types;

// Rights vocabulary and the standard permission table.
pub mod rights;

// Permission table and entries.
pub mod access;

// Server events, frames and fan-out.
pub mod events;

// Token-bound connection lifecycle.
pub mod session;

// Typed REST response boundary.
pub mod api;

pub mod config;

pub mod error;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use access::{Permission, PermissionTable};
pub use api::ApiOutcome;
pub use config::ClientConfig;
pub use events::{ServerEvent, Toast, ToastLevel};
pub use rights::{filter_allowed_actions, get_allowed_actions, has_permission};
pub use session::SessionManager;
pub use types::{ConnectionState, Role};

/// Installs a global `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns `false` if a global subscriber was already set.
#[cfg(feature = "tracing-init")]
pub fn init_tracing() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok()
}
