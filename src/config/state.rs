// Application state module
// Shared state handed to every connection: configuration and the message store

use std::sync::Arc;

use super::types::Config;
use crate::store::MessageStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: Arc<MessageStore>,
}

impl AppState {
    /// Create `AppState` around an externally owned store
    pub const fn new(config: Config, store: Arc<MessageStore>) -> Self {
        Self { config, store }
    }

    /// Fresh state with its own empty store
    #[cfg(test)]
    pub fn with_empty_store(config: Config) -> Self {
        Self::new(config, Arc::new(MessageStore::new()))
    }
}
