use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{DatabaseBackend, DatabaseConfig};
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::store::{EntityStore, StoreResult};

/// Opens the store selected by `DATABASE_BACKEND`.
pub async fn open_store(config: &DatabaseConfig) -> StoreResult<Arc<dyn EntityStore>> {
    match config.backend {
        DatabaseBackend::Postgres => {
            let store = PgStore::connect(config).await?;
            if config.run_migrations {
                store.migrate().await?;
            }
            info!("Using PostgreSQL store at {}", config.redacted_url());
            Ok(Arc::new(store))
        }
        DatabaseBackend::Memory => {
            warn!("Using in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn memory_backend_needs_no_database_url() {
        let mut config = AppConfig::development().database;
        config.backend = DatabaseBackend::Memory;
        config.url = None;

        let store = open_store(&config).await.unwrap();
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn postgres_backend_requires_url() {
        let mut config = AppConfig::development().database;
        config.backend = DatabaseBackend::Postgres;
        config.url = None;

        let err = open_store(&config).await.err().unwrap();
        assert!(matches!(err, crate::database::StoreError::ConfigMissing("DATABASE_URL")));
    }
}
