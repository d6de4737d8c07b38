pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;

use std::sync::Arc;

use config::Config;
use gateway::fanout::Broadcaster;
use gateway::origin::OriginPolicy;
use gateway::registry::ConnectionRegistry;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub origins: Arc<OriginPolicy>,
    pub broadcaster: Broadcaster,
}

impl AppState {
    /// Build state with an empty registry. The registry lives as long as the
    /// server that owns this state.
    pub fn new(config: Config) -> Self {
        let origins = OriginPolicy::new(config.allowed_origins.iter().cloned());
        Self {
            config: Arc::new(config),
            origins: Arc::new(origins),
            broadcaster: Broadcaster::new(Arc::new(ConnectionRegistry::new())),
        }
    }
}
