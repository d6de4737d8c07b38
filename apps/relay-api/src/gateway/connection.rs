//! Connection identity and the write half handed to the registry.

use std::fmt;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::SinkExt;
use ulid::Ulid;

const ID_PREFIX: &str = "conn";

/// Unique identity of one connected client (`conn_` prefixed ULID).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(format!("{ID_PREFIX}_{}", Ulid::new()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outbound side of a connection. The registry owns one of these per live
/// connection while the session keeps the inbound stream.
#[async_trait]
pub trait ConnectionSink: Send {
    /// Write one frame to the peer.
    async fn send(&mut self, frame: Message) -> Result<(), axum::Error>;

    /// Close the connection. Failures are ignored; the peer may already be gone.
    async fn close(&mut self);
}

#[async_trait]
impl ConnectionSink for SplitSink<WebSocket, Message> {
    async fn send(&mut self, frame: Message) -> Result<(), axum::Error> {
        SinkExt::send(self, frame).await
    }

    async fn close(&mut self) {
        let _ = SinkExt::send(self, Message::Close(None)).await;
        let _ = SinkExt::close(self).await;
    }
}
