use async_trait::async_trait;

use super::{FileItem, SourceAdapter};
use crate::errors::{FilelinkerError, Result};
use crate::storage::{LinkRecord, SourceConfig, SourceType};
use crate::utils::path;

/// `none` 来源：目标就是外部 URL
#[derive(Debug, Default)]
pub struct DirectAdapter;

#[async_trait]
impl SourceAdapter for DirectAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::None
    }

    async fn list_files(&self, _path: &str, _config: &SourceConfig) -> Result<Vec<FileItem>> {
        Err(FilelinkerError::invalid_configuration(
            "A direct link cannot be browsed",
        ))
    }

    async fn resolve_download(&self, sub_path: &str, record: &LinkRecord) -> Result<String> {
        if !path::is_root(sub_path) {
            return Err(FilelinkerError::not_found(format!(
                "Direct link has no entry '{}'",
                path::normalize(sub_path)
            )));
        }
        Ok(record.target.clone())
    }
}
