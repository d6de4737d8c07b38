//! Wire-format envelope for server-synthesized notices.
//!
//! Client frames are never parsed; only the join/leave notices built here
//! have a schema enforced by the server.

use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};

/// Tag for lifecycle notices.
pub const EVENT_OTHER: &str = "other";
/// Tag clients put on their own chat messages. Informational only.
pub const EVENT_MESSAGE: &str = "message";

/// Notice content for a join ("joined the room").
pub const JOINED_TEXT: &str = "加入聊天室";
/// Notice content for a leave ("left the room").
pub const LEFT_TEXT: &str = "離開聊天室";

/// A broadcast envelope: `{"event", "name", "content"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    pub name: String,
    pub content: String,
}

impl Envelope {
    pub fn new(event: &str, name: &str, content: &str) -> Self {
        Self {
            event: event.to_string(),
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    /// Lifecycle notice announcing that `name` joined.
    pub fn joined(name: &str) -> Self {
        Self::new(EVENT_OTHER, name, JOINED_TEXT)
    }

    /// Lifecycle notice announcing that `name` left.
    pub fn left(name: &str) -> Self {
        Self::new(EVENT_OTHER, name, LEFT_TEXT)
    }

    /// Serialize into a text frame.
    pub fn to_frame(&self) -> Message {
        // Three plain string fields always serialize.
        let json = serde_json::to_string(self).expect("envelope serializes to JSON");
        Message::Text(json.into())
    }
}
