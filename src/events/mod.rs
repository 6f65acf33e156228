//!
//! Server-pushed events and their fan-out to subscribers.

pub mod event;
pub mod dispatch;

pub use event::{decode_frame, encode_frame, Frame, ServerEvent};
pub use dispatch::{EventDispatcher, EventHandler, Notifier, Toast, ToastLevel, TracingNotifier};
