use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use super::{
    config::{Config, StoreBackend},
    database::{RedisStore, init_redis},
    memory::MemoryStore,
    store::ThoughtStore,
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ThoughtStore>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let store: Arc<dyn ThoughtStore> = match config.store {
            StoreBackend::Redis => {
                info!("Connecting to Redis...");
                Arc::new(RedisStore::new(init_redis(&config.redis_url).await?))
            }
            StoreBackend::Memory => {
                info!("Using in-memory store, thoughts will not survive a restart");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn ThoughtStore>) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
