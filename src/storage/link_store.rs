//! Typed access to link records
//!
//! Wraps a [`KvStore`] with JSON (de)serialisation and fills in the fields
//! that older records never stored.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::backend::KvStore;
use super::models::{LinkKind, LinkRecord};
use crate::errors::{FilelinkerError, Result};

pub struct LinkStore {
    kv: Arc<dyn KvStore>,
    folder_code_length: usize,
    scan_page_size: usize,
}

impl LinkStore {
    pub fn new(kv: Arc<dyn KvStore>, folder_code_length: usize, scan_page_size: usize) -> Self {
        Self {
            kv,
            folder_code_length,
            scan_page_size: scan_page_size.max(1),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.kv.backend_name()
    }

    /// Kind implied by the code length, for records stored without `type`
    pub fn infer_kind(&self, code: &str) -> LinkKind {
        if code.chars().count() == self.folder_code_length {
            LinkKind::Folder
        } else {
            LinkKind::File
        }
    }

    /// Decode a stored value
    ///
    /// Values that are not JSON objects are bare legacy URLs. A JSON object
    /// that does not match the record layout is a `Serialization` error.
    pub fn decode(&self, code: &str, raw: &str) -> Result<LinkRecord> {
        let trimmed = raw.trim();
        let mut record = if trimmed.starts_with('{') {
            serde_json::from_str::<LinkRecord>(trimmed).map_err(|e| {
                FilelinkerError::serialization(format!("Unreadable record '{}': {}", code, e))
            })?
        } else {
            trace!("Value for '{}' is a bare URL", code);
            LinkRecord::legacy(trimmed)
        };
        if record.kind.is_none() {
            record.kind = Some(self.infer_kind(code));
        }
        Ok(record)
    }

    pub async fn get(&self, code: &str) -> Result<Option<LinkRecord>> {
        match self.kv.get(code).await? {
            Some(raw) => self.decode(code, &raw).map(Some),
            None => Ok(None),
        }
    }

    pub async fn exists(&self, code: &str) -> Result<bool> {
        Ok(self.kv.get(code).await?.is_some())
    }

    pub async fn put(&self, code: &str, record: &LinkRecord) -> Result<()> {
        self.kv.put(code, record.to_json()?).await?;
        debug!("LinkStore: stored '{}'", code);
        Ok(())
    }

    pub async fn delete(&self, code: &str) -> Result<()> {
        self.kv.delete(code).await?;
        debug!("LinkStore: deleted '{}'", code);
        Ok(())
    }

    /// Count one visit and write the record back
    ///
    /// Read-increment-write without a conditional update: two concurrent
    /// visits that loaded the same `visits` value both write `visits + 1`,
    /// so one count is lost and a quota can be overrun by the racing visit.
    pub async fn record_visit(&self, code: &str, record: &mut LinkRecord) -> Result<()> {
        record.visits = record.visits.saturating_add(1);
        self.put(code, record).await
    }

    /// Every record in the store, following the cursor until it runs out
    ///
    /// Unreadable values and keys that vanish mid-scan are skipped.
    pub async fn scan_all(&self) -> Result<Vec<(String, LinkRecord)>> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.kv.list(cursor.as_deref(), self.scan_page_size).await?;
            for key in page.keys {
                match self.kv.get(&key).await? {
                    Some(raw) => match self.decode(&key, &raw) {
                        Ok(record) => records.push((key, record)),
                        Err(e) => warn!("Skipping '{}': {}", key, e),
                    },
                    None => warn!("Key '{}' disappeared during scan", key),
                }
            }

            match page.cursor {
                Some(next) if Some(&next) != cursor.as_ref() => cursor = Some(next),
                Some(next) => {
                    return Err(FilelinkerError::store_operation(format!(
                        "Store returned the same cursor '{}' twice",
                        next
                    )));
                }
                None => break,
            }
        }

        debug!("LinkStore: scanned {} records", records.len());
        Ok(records)
    }
}
