//! Source backends
//!
//! A link's `sourceType` picks one adapter from the [`BackendRegistry`].
//! Every adapter lists a directory and turns a sub-path into a download URL;
//! all upstream traffic goes through [`HttpClient`].

pub mod alist;
pub mod direct;
pub mod http;
pub mod registry;
pub mod release_assets;
pub mod repo_contents;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::Result;
use crate::storage::{LinkRecord, SourceConfig, SourceType};

pub use alist::AListAdapter;
pub use direct::DirectAdapter;
pub use http::{Headers, HttpClient, UpstreamResponse, UpstreamStream, UreqHttpClient};
pub use registry::BackendRegistry;
pub use release_assets::ReleaseAssetsAdapter;
pub use repo_contents::RepoContentsAdapter;

/// 统一的目录项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    /// 目录为空串
    pub download_locator: String,
    pub source_tag: &'static str,
}

impl FileItem {
    pub fn directory(name: impl Into<String>, source_tag: &'static str) -> Self {
        Self {
            name: name.into(),
            size: 0,
            is_directory: true,
            modified_at: None,
            download_locator: String::new(),
            source_tag,
        }
    }

    pub fn file(
        name: impl Into<String>,
        size: u64,
        download_locator: impl Into<String>,
        source_tag: &'static str,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            is_directory: false,
            modified_at: None,
            download_locator: download_locator.into(),
            source_tag,
        }
    }

    pub fn with_modified(mut self, modified_at: Option<DateTime<Utc>>) -> Self {
        self.modified_at = modified_at;
        self
    }
}

/// Parse an upstream RFC 3339 timestamp, dropping anything unparsable
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source_type(&self) -> SourceType;

    /// List the directory at `path` (already joined with the link's root)
    async fn list_files(&self, path: &str, config: &SourceConfig) -> Result<Vec<FileItem>>;

    /// Download URL for `sub_path` below the link's root
    async fn resolve_download(&self, sub_path: &str, record: &LinkRecord) -> Result<String>;
}
