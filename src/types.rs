//!
//! Shared types used across the permission model and the session binding.
//!
//! `Role` is the server-issued identity tag; `ConnectionState` is the observable
//! state of a session binding. Resource and action names stay plain strings
//! because the backend treats them as free-form.

use std::fmt;
use std::str::FromStr;

use crate::error::AccessError;

/// A server-issued role tag.
///
/// The set is the union of the roles the dashboards use
/// (`ADMIN`, `HR_MANAGER`, `MANAGER`, `EMPLOYEE`, `GUEST`) and the
/// permission utility's `STAFF` role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    HrManager,
    Manager,
    Employee,
    Guest,
    Staff,
}

impl Role {
    /// Every known role, in declaration order.
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::HrManager,
        Role::Manager,
        Role::Employee,
        Role::Guest,
        Role::Staff,
    ];

    /// The wire name the backend issues for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::HrManager => "HR_MANAGER",
            Role::Manager => "MANAGER",
            Role::Employee => "EMPLOYEE",
            Role::Guest => "GUEST",
            Role::Staff => "STAFF",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    /// Case-insensitive. The one word break in `HR_MANAGER` may be written
    /// `_`, `-` or nothing (`hr_manager`, `HR-MANAGER`, `HrManager`); separators
    /// anywhere else are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = s.trim().to_ascii_uppercase().replace('-', "_");
        match folded.as_str() {
            "ADMIN" => Ok(Role::Admin),
            "HR_MANAGER" | "HRMANAGER" => Ok(Role::HrManager),
            "MANAGER" => Ok(Role::Manager),
            "EMPLOYEE" => Ok(Role::Employee),
            "GUEST" => Ok(Role::Guest),
            "STAFF" => Ok(Role::Staff),
            _ => Err(AccessError::UnknownRole(s.to_string())),
        }
    }
}

/// Observable lifecycle state of a session binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum ConnectionState {
    /// No token, no connection. A valid resting state.
    #[default]
    Disconnected,
    /// Token present, connection attempt in flight.
    Connecting,
    /// Token present, connection live.
    Connected,
    /// Token changed while a connection existed; the old one is being torn down.
    Reconnecting,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
        };
        f.write_str(s)
    }
}
