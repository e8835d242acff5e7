use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{KvListPage, KvStore};
use crate::errors::Result;

/// 进程内存储，键有序，cursor 为上一页最后一个键
#[derive(Default)]
pub struct MemoryKvStore {
    data: RwLock<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

/// Page through an ordered map, shared with the file backend
pub(super) fn page_after(
    data: &BTreeMap<String, String>,
    cursor: Option<&str>,
    limit: usize,
) -> KvListPage {
    let lower = match cursor {
        Some(c) => Bound::Excluded(c),
        None => Bound::Unbounded,
    };
    let limit = limit.max(1);

    let mut iter = data
        .range::<str, _>((lower, Bound::Unbounded))
        .map(|(k, _)| k.clone());
    let keys: Vec<String> = iter.by_ref().take(limit).collect();
    let has_more = iter.next().is_some();

    KvListPage {
        cursor: if has_more { keys.last().cloned() } else { None },
        keys,
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        self.data.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }

    async fn list(&self, cursor: Option<&str>, limit: usize) -> Result<KvListPage> {
        Ok(page_after(&self.data.read(), cursor, limit))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
