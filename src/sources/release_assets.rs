//! Release 资源适配器
//!
//! 根目录下每个 release 一个目录（按 tag 命名），目录内是该 release 的资源。
//! 只有一个 release 在范围内时可以展平，根目录直接列资源。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::http::{Headers, HttpClient};
use super::{FileItem, SourceAdapter, parse_timestamp};
use crate::config::GitHubConfig;
use crate::errors::{FilelinkerError, Result};
use crate::storage::{LinkRecord, SourceConfig, SourceType};
use crate::utils::path;

const SOURCE_TAG: &str = "release_assets";
const LATEST: &str = "latest";
const DEFAULT_RECENT_COUNT: u32 = 10;
const MAX_RECENT_COUNT: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Clone, Deserialize)]
struct Asset {
    name: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    browser_download_url: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

/// 范围内的 release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseScope {
    Latest,
    Pinned(String),
    Recent(u32),
}

impl ReleaseScope {
    pub fn from_config(config: &SourceConfig) -> Self {
        match config.tag() {
            Some(tag) if tag.eq_ignore_ascii_case(LATEST) => ReleaseScope::Latest,
            Some(tag) => ReleaseScope::Pinned(tag.to_string()),
            None => ReleaseScope::Recent(
                config
                    .count
                    .unwrap_or(DEFAULT_RECENT_COUNT)
                    .clamp(1, MAX_RECENT_COUNT),
            ),
        }
    }

    /// 是否只有一个 release
    pub fn is_single(&self) -> bool {
        !matches!(self, ReleaseScope::Recent(n) if *n > 1)
    }

    fn pinned_tag(&self) -> Option<&str> {
        match self {
            ReleaseScope::Pinned(tag) => Some(tag),
            _ => None,
        }
    }
}

pub struct ReleaseAssetsAdapter {
    api_url: String,
    web_url: String,
    token: Option<String>,
    user_agent: String,
    http: Arc<dyn HttpClient>,
}

impl ReleaseAssetsAdapter {
    pub fn new(config: &GitHubConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            web_url: config.web_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
            user_agent: config.user_agent.clone(),
            http,
        }
    }

    fn headers(&self) -> Headers {
        let mut headers = vec![
            ("Accept", "application/vnd.github+json".to_string()),
            ("User-Agent", self.user_agent.clone()),
        ];
        if let Some(token) = &self.token {
            headers.push(("Authorization", format!("Bearer {}", token)));
        }
        headers
    }

    fn asset_url(&self, owner: &str, repo: &str, tag: &str, asset: &str) -> String {
        format!(
            "{}/{}/{}/releases/download/{}/{}",
            self.web_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            urlencoding::encode(tag),
            urlencoding::encode(asset)
        )
    }

    async fn fetch_releases(&self, owner: &str, repo: &str, scope: &ReleaseScope) -> Result<Vec<Release>> {
        let base = format!(
            "{}/repos/{}/{}/releases",
            self.api_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );
        let url = match scope {
            ReleaseScope::Latest => format!("{}/latest", base),
            ReleaseScope::Pinned(tag) => format!("{}/tags/{}", base, urlencoding::encode(tag)),
            ReleaseScope::Recent(count) => format!("{}?per_page={}", base, count),
        };

        debug!("Fetching releases of {}/{} ({:?})", owner, repo, scope);
        let response = self.http.get(&url, self.headers()).await?;
        match response.status {
            s if (200..300).contains(&s) => {}
            404 => {
                return Err(FilelinkerError::not_found(format!(
                    "No release found for {}/{}",
                    owner, repo
                )));
            }
            s => {
                warn!("Release request for {}/{} returned HTTP {}", owner, repo, s);
                return Err(FilelinkerError::backend_unavailable(format!(
                    "Release API returned HTTP {}",
                    s
                )));
            }
        }

        match scope {
            ReleaseScope::Recent(_) => response.json(),
            _ => Ok(vec![response.json::<Release>()?]),
        }
    }

    fn asset_items(&self, owner: &str, repo: &str, release: Release) -> Vec<FileItem> {
        let tag = release.tag_name;
        release
            .assets
            .into_iter()
            .map(|asset| {
                let locator = asset
                    .browser_download_url
                    .filter(|u| !u.is_empty())
                    .unwrap_or_else(|| self.asset_url(owner, repo, &tag, &asset.name));
                FileItem::file(asset.name, asset.size, locator, SOURCE_TAG)
                    .with_modified(parse_timestamp(asset.updated_at.as_deref()))
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for ReleaseAssetsAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::ReleaseAssets
    }

    async fn list_files(&self, dir: &str, config: &SourceConfig) -> Result<Vec<FileItem>> {
        let (owner, repo) = config.repository()?;
        let scope = ReleaseScope::from_config(config);
        let segments = path::segments(dir);

        let flatten = config.flatten_release_folder && scope.is_single();
        if config.flatten_release_folder && !flatten {
            debug!(
                "flattenReleaseFolder ignored for {}/{}: more than one release in scope",
                owner, repo
            );
        }

        if flatten {
            if !segments.is_empty() {
                return Err(FilelinkerError::not_found(format!("{} not found", dir)));
            }
            let releases = self.fetch_releases(owner, repo, &scope).await?;
            return Ok(releases
                .into_iter()
                .next()
                .map(|release| self.asset_items(owner, repo, release))
                .unwrap_or_default());
        }

        match segments.as_slice() {
            [] => {
                let releases = self.fetch_releases(owner, repo, &scope).await?;
                Ok(releases
                    .into_iter()
                    .map(|release| {
                        let published = parse_timestamp(release.published_at.as_deref());
                        FileItem::directory(release.tag_name, SOURCE_TAG).with_modified(published)
                    })
                    .collect())
            }
            [tag] => {
                let releases = self.fetch_releases(owner, repo, &scope).await?;
                releases
                    .into_iter()
                    .find(|release| release.tag_name == *tag)
                    .map(|release| self.asset_items(owner, repo, release))
                    .ok_or_else(|| FilelinkerError::not_found(format!("Release '{}' not found", tag)))
            }
            _ => Err(FilelinkerError::not_found(format!("{} not found", dir))),
        }
    }

    async fn resolve_download(&self, sub_path: &str, record: &LinkRecord) -> Result<String> {
        let config = &record.source_config;
        let (owner, repo) = config.repository()?;
        let full = path::join(&record.target, sub_path);
        let scope = ReleaseScope::from_config(config);

        match path::segments(&full).as_slice() {
            [tag, asset] => Ok(self.asset_url(owner, repo, tag, asset)),
            [asset] => match scope.pinned_tag() {
                Some(tag) => Ok(self.asset_url(owner, repo, tag, asset)),
                None => Ok(format!(
                    "{}/{}/{}/releases/latest/download/{}",
                    self.web_url,
                    urlencoding::encode(owner),
                    urlencoding::encode(repo),
                    urlencoding::encode(asset)
                )),
            },
            _ => Err(FilelinkerError::not_found(format!(
                "{} does not name a release asset",
                full
            ))),
        }
    }
}
