//! AList 文件服务适配器

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use super::http::HttpClient;
use super::{FileItem, SourceAdapter, parse_timestamp};
use crate::config::AListConfig;
use crate::errors::{FilelinkerError, Result};
use crate::storage::{LinkRecord, SourceConfig, SourceType};
use crate::utils::{encode_path, path};

const SOURCE_TAG: &str = "alist";

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<ListData>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    #[serde(default)]
    content: Option<Vec<Entry>>,
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    name: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    is_dir: Option<bool>,
    /// 旧版本 AList 只有 type，1 表示目录
    #[serde(rename = "type", default)]
    entry_type: Option<i64>,
    #[serde(default)]
    modified: Option<String>,
}

impl Entry {
    fn is_directory(&self) -> bool {
        self.is_dir.unwrap_or(self.entry_type == Some(1))
    }
}

pub struct AListAdapter {
    api_url: String,
    token: String,
    page_size: u32,
    http: Arc<dyn HttpClient>,
}

impl AListAdapter {
    pub fn new(config: &AListConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            page_size: config.page_size,
            http,
        }
    }

    /// `/d/` 直链，不访问网络
    fn download_url(&self, full_path: &str) -> String {
        format!(
            "{}/d/{}",
            self.api_url,
            encode_path(&path::strip_root(full_path))
        )
    }
}

#[async_trait]
impl SourceAdapter for AListAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::AList
    }

    async fn list_files(&self, dir: &str, _config: &SourceConfig) -> Result<Vec<FileItem>> {
        let dir = path::normalize(dir);
        let url = format!("{}/api/fs/list", self.api_url);
        let body = json!({
            "path": dir,
            "password": "",
            "page": 1,
            "per_page": self.page_size,
            "refresh": false,
        });

        debug!("AList list {}", dir);
        let response = self
            .http
            .post_json(&url, vec![("Authorization", self.token.clone())], body)
            .await?;

        if !response.is_success() {
            warn!("AList list {} returned HTTP {}", dir, response.status);
            return Err(FilelinkerError::backend_unavailable(format!(
                "AList returned HTTP {}",
                response.status
            )));
        }

        let envelope: Envelope = response.json()?;
        if envelope.code != 200 {
            let message = if envelope.message.is_empty() {
                format!("AList error code {}", envelope.code)
            } else {
                envelope.message
            };
            if message.to_ascii_lowercase().contains("not found") {
                return Err(FilelinkerError::not_found(message));
            }
            warn!("AList list {} failed: {}", dir, message);
            return Err(FilelinkerError::backend_unavailable(message));
        }

        let (entries, total) = match envelope.data {
            Some(data) => (data.content.unwrap_or_default(), data.total),
            None => (Vec::new(), None),
        };
        if let Some(total) = total
            && total > entries.len() as u64
        {
            warn!(
                "AList listing of {} truncated: {} of {} entries returned",
                dir,
                entries.len(),
                total
            );
        }

        // 保持上游顺序
        Ok(entries
            .into_iter()
            .map(|entry| {
                let modified = parse_timestamp(entry.modified.as_deref());
                if entry.is_directory() {
                    FileItem::directory(entry.name, SOURCE_TAG).with_modified(modified)
                } else {
                    let locator = self.download_url(&path::join(&dir, &entry.name));
                    FileItem::file(entry.name, entry.size, locator, SOURCE_TAG)
                        .with_modified(modified)
                }
            })
            .collect())
    }

    async fn resolve_download(&self, sub_path: &str, record: &LinkRecord) -> Result<String> {
        Ok(self.download_url(&path::join(&record.target, sub_path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::http::stub::StubHttpClient;
    use crate::storage::LinkKind;

    fn adapter(stub: Arc<StubHttpClient>) -> AListAdapter {
        let config = AListConfig {
            api_url: "https://alist.test/".into(),
            token: "tok".into(),
            page_size: 0,
        };
        AListAdapter::new(&config, stub)
    }

    #[tokio::test]
    async fn test_list_sends_expected_request() {
        let stub = Arc::new(StubHttpClient::new());
        stub.respond(
            "https://alist.test/api/fs/list",
            200,
            r#"{"code":200,"message":"success","data":{"content":[
                {"name":"guide","size":0,"is_dir":true,"modified":"2024-01-02T03:04:05Z"},
                {"name":"a b.pdf","size":42,"is_dir":false}
            ],"total":2}}"#,
        );
        let items = adapter(stub.clone())
            .list_files("/docs/", &SourceConfig::default())
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert!(items[0].is_directory);
        assert!(items[0].download_locator.is_empty());
        assert!(items[0].modified_at.is_some());
        assert_eq!(items[1].size, 42);
        assert_eq!(items[1].download_locator, "https://alist.test/d/docs/a%20b.pdf");

        let requests = stub.requests.lock();
        let body = requests[0].body.as_ref().unwrap();
        assert_eq!(body["path"], "/docs");
        assert_eq!(body["per_page"], 0);
        assert_eq!(body["refresh"], false);
        assert_eq!(requests[0].headers, vec![("Authorization", "tok".to_string())]);
    }

    #[tokio::test]
    async fn test_type_flag_when_is_dir_missing() {
        let stub = Arc::new(StubHttpClient::new());
        stub.respond(
            "https://alist.test/api/fs/list",
            200,
            r#"{"code":200,"data":{"content":[{"name":"sub","type":1},{"name":"f","type":0}]}}"#,
        );
        let items = adapter(stub).list_files("/", &SourceConfig::default()).await.unwrap();
        assert!(items[0].is_directory);
        assert!(!items[1].is_directory);
    }

    #[tokio::test]
    async fn test_envelope_errors() {
        let stub = Arc::new(StubHttpClient::new());
        stub.respond(
            "https://alist.test/api/fs/list",
            200,
            r#"{"code":500,"message":"object not found"}"#,
        );
        let result = adapter(stub.clone()).list_files("/x", &SourceConfig::default()).await;
        assert!(matches!(result, Err(FilelinkerError::NotFound(_))));

        stub.respond(
            "https://alist.test/api/fs/list",
            200,
            r#"{"code":401,"message":"token is invalidated"}"#,
        );
        let result = adapter(stub.clone()).list_files("/x", &SourceConfig::default()).await;
        assert!(matches!(result, Err(FilelinkerError::BackendUnavailable(m)) if m.contains("token")));

        stub.respond("https://alist.test/api/fs/list", 502, "bad gateway");
        let result = adapter(stub).list_files("/x", &SourceConfig::default()).await;
        assert!(matches!(result, Err(FilelinkerError::BackendUnavailable(_))));
    }

    #[tokio::test]
    async fn test_missing_data_is_empty() {
        let stub = Arc::new(StubHttpClient::new());
        stub.respond("https://alist.test/api/fs/list", 200, r#"{"code":200,"data":null}"#);
        let items = adapter(stub).list_files("/", &SourceConfig::default()).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_download_without_network() {
        let stub = Arc::new(StubHttpClient::new());
        let record = LinkRecord::new("/shared/docs", LinkKind::Folder, SourceType::AList);
        let url = adapter(stub.clone())
            .resolve_download("guide/intro.md", &record)
            .await
            .unwrap();
        assert_eq!(url, "https://alist.test/d/shared/docs/guide/intro.md");
        assert_eq!(stub.request_count(), 0);
    }
}
