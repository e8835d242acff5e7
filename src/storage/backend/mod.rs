//! Key-value store backends
//!
//! The link store only needs `get/put/delete` and a cursor-paginated key
//! listing. Three backends implement that contract:
//! - `memory`: process-local, for tests and throwaway runs
//! - `file`: a JSON object on disk
//! - `redis`: shared store, cursor maps onto `SCAN`

mod file;
mod memory;
mod redis_kv;

use async_trait::async_trait;

use crate::errors::Result;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;
pub use redis_kv::RedisKvStore;

/// 一页键列表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvListPage {
    pub keys: Vec<String>,
    /// `None` 表示已经遍历完
    pub cursor: Option<String>,
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, value: String) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;

    /// List keys after `cursor`, at most `limit` per page
    async fn list(&self, cursor: Option<&str>, limit: usize) -> Result<KvListPage>;

    fn backend_name(&self) -> &'static str;
}
