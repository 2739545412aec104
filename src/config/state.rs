// Application state module
// Holds the loaded configuration and the injected record store

use std::sync::Arc;

use super::types::Config;
use crate::store::RecordStore;

/// Application state shared by every connection task
///
/// Immutable after startup; the store handle is the only path to persisted data.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn RecordStore>) -> Self {
        Self {
            config: config.clone(),
            store,
        }
    }
}
