//! Broadcast engine: writes one frame to every registered connection.
//!
//! A failed write only affects its recipient. That connection is closed and
//! pruned from the registry, and delivery continues to everyone else.

use std::sync::Arc;

use axum::extract::ws::Message;
use futures_util::FutureExt;

use super::registry::{ConnectionRegistry, Visit};

/// Fan-out over the shared registry. Clones share the same registry.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Deliver `frame` to every registered connection, sender included.
    ///
    /// Returns the number of recipients that failed and were evicted. The
    /// broadcast itself never fails.
    pub async fn broadcast(&self, frame: Message) -> usize {
        let failed = self
            .registry
            .retain_each(|id, sink| {
                let frame = frame.clone();
                async move {
                    match sink.send(frame).await {
                        Ok(()) => Visit::Keep,
                        Err(e) => {
                            tracing::debug!(?e, connection_id = %id, "broadcast write failed");
                            Visit::Evict
                        }
                    }
                }
                .boxed()
            })
            .await;

        if failed > 0 {
            tracing::debug!(failed, "pruned unwritable connections");
        }
        failed
    }
}
