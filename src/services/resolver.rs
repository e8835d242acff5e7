//! Link resolution
//!
//! Turns an incoming `/s/{code}/{sub}` request into one of four outcomes.
//! The order is fixed: lookup, access code, expiry, quota, then dispatch on
//! the link kind. A request that fails an earlier gate never reaches the
//! later ones and is not counted as a visit.

use std::sync::Arc;

use chrono::Utc;
use subtle::ConstantTimeEq;
use tracing::{debug, info, trace, warn};

use crate::config::LinksConfig;
use crate::errors::{FilelinkerError, Result};
use crate::sources::{BackendRegistry, FileItem, HttpClient};
use crate::storage::{LinkKind, LinkRecord, LinkStore};
use crate::utils::{extract_filename, path};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveRequest {
    pub code: String,
    pub sub_path: String,
    /// `?code=`
    pub query_access_code: Option<String>,
    /// `X-Access-Code`
    pub header_access_code: Option<String>,
    /// `?type=file`
    pub as_file: bool,
    /// `?download=1`
    pub download: bool,
}

impl ResolveRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn with_sub_path(mut self, sub_path: impl Into<String>) -> Self {
        self.sub_path = sub_path.into();
        self
    }

    /// 查询参数优先于请求头
    fn supplied_access_code(&self) -> Option<&str> {
        self.query_access_code
            .as_deref()
            .filter(|c| !c.is_empty())
            .or_else(|| self.header_access_code.as_deref().filter(|c| !c.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// 需要访问码（未提供或不匹配）
    AccessGate { code: String },
    Listing {
        path: String,
        items: Vec<FileItem>,
        access_code: Option<String>,
    },
    Download {
        url: String,
        file_name: String,
        access_code: Option<String>,
    },
    FileInfo {
        name: String,
        size: u64,
        download_url: String,
        access_code: Option<String>,
    },
}

pub struct Resolver {
    store: Arc<LinkStore>,
    registry: Arc<BackendRegistry>,
    http: Arc<dyn HttpClient>,
    links: LinksConfig,
}

impl Resolver {
    pub fn new(
        store: Arc<LinkStore>,
        registry: Arc<BackendRegistry>,
        http: Arc<dyn HttpClient>,
        links: LinksConfig,
    ) -> Self {
        Self {
            store,
            registry,
            http,
            links,
        }
    }

    pub async fn resolve(&self, request: &ResolveRequest) -> Result<Resolution> {
        let code = request.code.as_str();
        let mut record = self
            .store
            .get(code)
            .await?
            .ok_or_else(|| FilelinkerError::not_found(format!("Link '{}' not found", code)))?;

        let accepted_code = match record.access_code() {
            Some(expected) => match request.supplied_access_code() {
                Some(supplied) if bool::from(supplied.as_bytes().ct_eq(expected.as_bytes())) => {
                    Some(supplied.to_string())
                }
                supplied => {
                    debug!(
                        "Access gate for '{}' ({})",
                        code,
                        if supplied.is_some() { "wrong code" } else { "no code" }
                    );
                    return Ok(Resolution::AccessGate {
                        code: code.to_string(),
                    });
                }
            },
            None => None,
        };

        if record.is_expired_at(Utc::now()) {
            debug!("Link '{}' expired", code);
            return Err(FilelinkerError::gone(format!("Link '{}' has expired", code)));
        }
        if record.is_quota_exhausted() {
            debug!("Link '{}' reached its visit limit", code);
            return Err(FilelinkerError::gone(format!(
                "Link '{}' has reached its visit limit",
                code
            )));
        }

        if self.links.count_unlimited_visits || record.max_visits.is_some() {
            self.store.record_visit(code, &mut record).await?;
            trace!("Link '{}' visits now {}", code, record.visits);
        }

        let sub_path = path::normalize(&request.sub_path);
        let has_sub_path = !path::is_root(&sub_path);

        match record.kind() {
            LinkKind::Folder if !has_sub_path => {
                self.listing(&record, &record.target, accepted_code).await
            }
            LinkKind::Folder if request.as_file => {
                self.file(&record, &sub_path, request.download, accepted_code)
                    .await
            }
            LinkKind::Folder => {
                let dir = path::join(&record.target, &sub_path);
                self.listing(&record, &dir, accepted_code).await
            }
            LinkKind::File => {
                self.file(&record, path::ROOT, request.download, accepted_code)
                    .await
            }
        }
    }

    async fn listing(
        &self,
        record: &LinkRecord,
        dir: &str,
        access_code: Option<String>,
    ) -> Result<Resolution> {
        let adapter = self.registry.resolve(record.source_type())?;
        let dir = path::normalize(dir);
        let items = adapter.list_files(&dir, &record.source_config).await?;
        info!("Listing {} via {}: {} items", dir, record.source_type(), items.len());
        Ok(Resolution::Listing {
            path: dir,
            items,
            access_code,
        })
    }

    async fn file(
        &self,
        record: &LinkRecord,
        sub_path: &str,
        download: bool,
        access_code: Option<String>,
    ) -> Result<Resolution> {
        let adapter = self.registry.resolve(record.source_type())?;
        let url = adapter.resolve_download(sub_path, record).await?;

        let name = path::segments(sub_path)
            .last()
            .map(|s| s.to_string())
            .unwrap_or_else(|| extract_filename(&url));

        // 未加访问码的文件链接直接下载
        let direct = record.kind() == LinkKind::File
            && record.access_code().is_none()
            && path::is_root(sub_path);

        if download || direct {
            info!("Download {} -> {}", name, url);
            return Ok(Resolution::Download {
                url,
                file_name: name,
                access_code,
            });
        }

        let size = match self.http.content_length(&url).await {
            Ok(size) => size.unwrap_or(0),
            Err(e) => {
                warn!("Size probe for {} failed: {}", url, e);
                0
            }
        };
        Ok(Resolution::FileInfo {
            name,
            size,
            download_url: url,
            access_code,
        })
    }
}
