//! Live set of connections that receive broadcasts.
//!
//! A single `tokio::sync::Mutex` guards registration, removal and the full
//! iterate-and-write pass of a broadcast. Writes are awaited while the lock
//! is held, so a connection is never written to by two broadcasts at once and
//! never removed halfway through another caller's iteration.

use std::collections::HashMap;

use futures_util::future::BoxFuture;
use tokio::sync::{oneshot, Mutex};

use super::connection::{ConnectionId, ConnectionSink};

/// Outcome of visiting one connection in [`ConnectionRegistry::retain_each`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Keep,
    Evict,
}

/// Resolves once the registry drops the connection, either by eviction or
/// by deregistration.
pub type Eviction = oneshot::Receiver<()>;

struct Entry {
    sink: Box<dyn ConnectionSink>,
    evicted: oneshot::Sender<()>,
}

/// Shared registry of all live connections.
pub struct ConnectionRegistry {
    conns: Mutex<HashMap<ConnectionId, Entry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            conns: Mutex::new(HashMap::new()),
        }
    }

    /// Add a connection to the live set.
    ///
    /// Returns the eviction signal for the new entry, or `None` without
    /// touching the existing entry if `id` is already registered.
    pub async fn register(&self, id: ConnectionId, sink: Box<dyn ConnectionSink>) -> Option<Eviction> {
        let mut conns = self.conns.lock().await;
        if conns.contains_key(&id) {
            return None;
        }
        let (evicted, eviction) = oneshot::channel();
        conns.insert(id, Entry { sink, evicted });
        Some(eviction)
    }

    /// Remove a connection, handing its sink back to the caller.
    /// Returns `None` if the connection was not registered.
    pub async fn deregister(&self, id: &ConnectionId) -> Option<Box<dyn ConnectionSink>> {
        self.conns.lock().await.remove(id).map(|entry| entry.sink)
    }

    /// Visit every registered connection under the lock.
    ///
    /// Connections for which `visit` returns [`Visit::Evict`] are removed,
    /// closed and signalled before the lock is released. Returns how many
    /// were evicted.
    pub async fn retain_each<F>(&self, mut visit: F) -> usize
    where
        F: for<'a> FnMut(&'a ConnectionId, &'a mut Box<dyn ConnectionSink>) -> BoxFuture<'a, Visit>,
    {
        let mut conns = self.conns.lock().await;

        let mut evicted = Vec::new();
        for (id, entry) in conns.iter_mut() {
            if visit(id, &mut entry.sink).await == Visit::Evict {
                evicted.push(id.clone());
            }
        }

        for id in &evicted {
            if let Some(mut entry) = conns.remove(id) {
                tracing::debug!(connection_id = %id, "evicting connection");
                entry.sink.close().await;
                // The owning session may already be tearing down.
                let _ = entry.evicted.send(());
            }
        }

        evicted.len()
    }

    pub async fn contains(&self, id: &ConnectionId) -> bool {
        self.conns.lock().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.conns.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conns.lock().await.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
