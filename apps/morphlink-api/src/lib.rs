pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;

use std::sync::Arc;

use config::Config;
use gateway::dispatcher::BroadcastDispatcher;
use gateway::registry::RoomRegistry;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: Arc<BroadcastDispatcher>,
}

impl AppState {
    /// Build fresh, empty relay state from `config`.
    pub fn new(config: Config) -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let dispatcher = BroadcastDispatcher::new(
            registry,
            config.sender_policy,
            config.send_queue_capacity,
        );

        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
        }
    }
}
