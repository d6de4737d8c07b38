//! Per-connection session: register, announce, relay, then tear down.

use axum::extract::ws::Message;
use futures_util::{Stream, StreamExt};

use super::connection::{ConnectionId, ConnectionSink};
use super::events::Envelope;
use super::fanout::Broadcaster;

/// Lifecycle of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Handshake still owned by the HTTP layer.
    Upgrading,
    /// Registered and relaying frames.
    Active,
    /// Read loop ended; leaving the registry.
    Closing,
    Closed,
}

/// State for a single WebSocket connection.
pub struct Session {
    id: ConnectionId,
    /// Client-supplied display name. Untrusted.
    name: String,
    broadcaster: Broadcaster,
    state: SessionState,
}

impl Session {
    pub fn new(name: String, broadcaster: Broadcaster) -> Self {
        Self {
            id: ConnectionId::new(),
            name,
            broadcaster,
            state: SessionState::Upgrading,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(connection_id = %self.id, from = ?self.state, to = ?next, "session state");
        self.state = next;
    }

    /// Drive the session from a completed upgrade until the connection is
    /// gone. `sink` goes into the registry; `stream` is read here until it
    /// ends, errors, or the registry evicts the connection after a failed
    /// write.
    pub async fn run<St>(mut self, sink: Box<dyn ConnectionSink>, mut stream: St) -> SessionState
    where
        St: Stream<Item = Result<Message, axum::Error>> + Unpin,
    {
        let registry = self.broadcaster.registry().clone();

        let Some(mut eviction) = registry.register(self.id.clone(), sink).await else {
            tracing::warn!(connection_id = %self.id, "connection id already registered");
            self.transition(SessionState::Closed);
            return self.state;
        };
        self.transition(SessionState::Active);

        tracing::info!(connection_id = %self.id, name = %self.name, "client joined");
        self.broadcaster.broadcast(Envelope::joined(&self.name).to_frame()).await;

        loop {
            tokio::select! {
                biased;

                _ = &mut eviction => {
                    tracing::debug!(connection_id = %self.id, "evicted after failed write");
                    break;
                }

                msg = stream.next() => {
                    match msg {
                        Some(Ok(frame @ (Message::Text(_) | Message::Binary(_)))) => {
                            self.broadcaster.broadcast(frame).await;
                        }
                        // Pings are answered by the WebSocket layer itself.
                        Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            tracing::debug!(?e, connection_id = %self.id, "ws read error");
                            break;
                        }
                    }
                }
            }
        }
        self.transition(SessionState::Closing);

        // `None` here means a failed broadcast already pruned and closed it.
        let sink = registry.deregister(&self.id).await;
        self.broadcaster.broadcast(Envelope::left(&self.name).to_frame()).await;
        if let Some(mut sink) = sink {
            sink.close().await;
        }

        tracing::info!(connection_id = %self.id, name = %self.name, "client left");
        self.transition(SessionState::Closed);
        self.state
    }
}
