use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::EntityStore;

/// Shared handles available to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }
}
