use std::sync::Arc;

use tracing::info;

use crate::config::StaticConfig;
use crate::errors::{FilelinkerError, Result};

pub mod backend;
pub mod link_store;
pub mod models;

pub use backend::{FileKvStore, KvListPage, KvStore, MemoryKvStore, RedisKvStore};
pub use link_store::LinkStore;
pub use models::{LinkKind, LinkRecord, SourceConfig, SourceType};

pub struct StorageFactory;

impl StorageFactory {
    /// Build the key-value backend named by `store.type`
    pub async fn create_kv(config: &StaticConfig) -> Result<Arc<dyn KvStore>> {
        let store: Arc<dyn KvStore> = match config.store.store_type.as_str() {
            "memory" => Arc::new(MemoryKvStore::new()),
            "file" => Arc::new(FileKvStore::open(&config.store.file_path).await?),
            "redis" => Arc::new(RedisKvStore::connect(&config.store.redis).await?),
            other => {
                return Err(FilelinkerError::invalid_configuration(format!(
                    "Unknown store type '{}'. Supported: memory, file, redis",
                    other
                )));
            }
        };
        info!("Using store backend: {}", store.backend_name());
        Ok(store)
    }

    pub async fn create(config: &StaticConfig) -> Result<Arc<LinkStore>> {
        let kv = Self::create_kv(config).await?;
        Ok(Arc::new(LinkStore::new(
            kv,
            config.codes.folder_length,
            config.store.scan_page_size,
        )))
    }
}
