use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use super::memory::page_after;
use super::{KvListPage, KvStore};
use crate::errors::{FilelinkerError, Result};

/// JSON 文件存储：整个文件是一个 `{ key: value }` 对象
///
/// 每次写入都会重写整个文件（先写临时文件再 rename）。
/// 内存中的数据只在文件写入成功后才替换。
pub struct FileKvStore {
    file_path: PathBuf,
    data: Mutex<BTreeMap<String, String>>,
}

impl FileKvStore {
    pub async fn open(file_path: impl AsRef<Path>) -> Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();

        let data = match tokio::fs::read_to_string(&file_path).await {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str::<BTreeMap<String, String>>(&content).map_err(|e| {
                error!("Failed to parse store file {}: {}", file_path.display(), e);
                FilelinkerError::serialization(format!(
                    "Failed to parse store file {}: {}",
                    file_path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Store file not found, creating {}", file_path.display());
                let empty = BTreeMap::new();
                Self::save(&file_path, &empty).await?;
                empty
            }
            Err(e) => return Err(e.into()),
        };

        info!("Loaded {} keys from {}", data.len(), file_path.display());
        Ok(Self {
            file_path,
            data: Mutex::new(data),
        })
    }

    async fn save(path: &Path, data: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        let tmp = path.with_extension("json.tmp");

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        debug!("Store file written: {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        next.insert(key.to_string(), value);
        Self::save(&self.file_path, &next).await?;
        *data = next;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut data = self.data.lock().await;
        if !data.contains_key(key) {
            return Ok(());
        }
        let mut next = data.clone();
        next.remove(key);
        Self::save(&self.file_path, &next).await?;
        *data = next;
        Ok(())
    }

    async fn list(&self, cursor: Option<&str>, limit: usize) -> Result<KvListPage> {
        Ok(page_after(&*self.data.lock().await, cursor, limit))
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
