//! Server-pushed event names and the JSON frame that carries them.

use std::fmt;

use serde_json::Value;

use crate::error::SessionError;

/// The named events the backend pushes over the session channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerEvent {
    LeaveRequestCreated,
    LeaveRequestApproved,
    LeaveRequestRejected,
    LeaveRequestCancelled,
    /// Generic notification not tied to a leave request.
    Notification,
}

impl ServerEvent {
    pub const ALL: [ServerEvent; 5] = [
        ServerEvent::LeaveRequestCreated,
        ServerEvent::LeaveRequestApproved,
        ServerEvent::LeaveRequestRejected,
        ServerEvent::LeaveRequestCancelled,
        ServerEvent::Notification,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            ServerEvent::LeaveRequestCreated => "leave_request_created",
            ServerEvent::LeaveRequestApproved => "leave_request_approved",
            ServerEvent::LeaveRequestRejected => "leave_request_rejected",
            ServerEvent::LeaveRequestCancelled => "leave_request_cancelled",
            ServerEvent::Notification => "notification",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.wire_name() == name)
    }
}

impl fmt::Display for ServerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// One inbound text frame: `{"event": "<name>", "payload": <any>}`.
///
/// The event name stays a string here so that frames for names this client
/// does not recognise still decode and can be logged.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}

impl Frame {
    pub fn new(event: ServerEvent, payload: Value) -> Self {
        Frame { event: event.wire_name().to_string(), payload }
    }

    /// The recognised event, if any.
    pub fn server_event(&self) -> Option<ServerEvent> {
        ServerEvent::from_wire_name(&self.event)
    }
}

pub fn decode_frame(text: &str) -> Result<Frame, SessionError> {
    serde_json::from_str(text).map_err(|e| SessionError::MalformedFrame(e.to_string()))
}

pub fn encode_frame(frame: &Frame) -> String {
    // Value and String fields always serialize.
    serde_json::to_string(frame).unwrap_or_default()
}
