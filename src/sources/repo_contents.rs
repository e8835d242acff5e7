//! 仓库内容适配器（GitHub contents API）

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::http::{Headers, HttpClient, UpstreamResponse};
use super::{FileItem, SourceAdapter};
use crate::config::GitHubConfig;
use crate::errors::{FilelinkerError, Result};
use crate::storage::{LinkRecord, SourceConfig, SourceType};
use crate::utils::{encode_path, path};

const SOURCE_TAG: &str = "repo_contents";

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    download_url: Option<String>,
}

/// contents API 对目录返回数组，对文件返回单个对象
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Listing(Vec<ContentEntry>),
    Single(ContentEntry),
}

pub struct RepoContentsAdapter {
    api_url: String,
    raw_url: String,
    token: Option<String>,
    user_agent: String,
    http: Arc<dyn HttpClient>,
}

impl RepoContentsAdapter {
    pub fn new(config: &GitHubConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            raw_url: config.raw_url.trim_end_matches('/').to_string(),
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

    fn contents_url(&self, owner: &str, repo: &str, relative: &str, git_ref: Option<&str>) -> String {
        let mut url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            encode_path(relative)
        );
        if let Some(git_ref) = git_ref {
            url.push_str("?ref=");
            url.push_str(&urlencoding::encode(git_ref));
        }
        url
    }

    async fn fetch(&self, url: &str, what: &str) -> Result<ContentsResponse> {
        let response = self.http.get(url, self.headers()).await?;
        check_status(&response, what)?;
        response.json()
    }
}

fn check_status(response: &UpstreamResponse, what: &str) -> Result<()> {
    match response.status {
        s if (200..300).contains(&s) => Ok(()),
        404 => Err(FilelinkerError::not_found(format!("{} not found", what))),
        s => {
            warn!("Repository contents request for {} returned HTTP {}", what, s);
            Err(FilelinkerError::backend_unavailable(format!(
                "Repository API returned HTTP {} for {}",
                s, what
            )))
        }
    }
}

fn to_item(entry: ContentEntry) -> FileItem {
    if entry.entry_type == "dir" {
        FileItem::directory(entry.name, SOURCE_TAG)
    } else {
        FileItem::file(
            entry.name,
            entry.size,
            entry.download_url.unwrap_or_default(),
            SOURCE_TAG,
        )
    }
}

#[async_trait]
impl SourceAdapter for RepoContentsAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::RepoContents
    }

    async fn list_files(&self, dir: &str, config: &SourceConfig) -> Result<Vec<FileItem>> {
        let (owner, repo) = config.repository()?;
        let relative = path::strip_root(dir);
        let url = self.contents_url(owner, repo, &relative, config.git_ref());

        debug!("Repository contents list {}/{}:/{}", owner, repo, relative);
        let mut items: Vec<FileItem> = match self.fetch(&url, &path::normalize(dir)).await? {
            ContentsResponse::Listing(entries) => entries.into_iter().map(to_item).collect(),
            ContentsResponse::Single(entry) => vec![to_item(entry)],
        };

        items.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(items)
    }

    async fn resolve_download(&self, sub_path: &str, record: &LinkRecord) -> Result<String> {
        let config = &record.source_config;
        let (owner, repo) = config.repository()?;
        let full = path::join(&record.target, sub_path);
        let relative = path::strip_root(&full);

        if let Some(git_ref) = config.git_ref() {
            return Ok(format!(
                "{}/{}/{}/{}/{}",
                self.raw_url,
                urlencoding::encode(owner),
                urlencoding::encode(repo),
                encode_path(git_ref),
                encode_path(&relative)
            ));
        }

        // 未指定 ref 时查询元数据拿 download_url
        let url = self.contents_url(owner, repo, &relative, None);
        match self.fetch(&url, &full).await? {
            ContentsResponse::Single(entry) if entry.entry_type == "file" => entry
                .download_url
                .filter(|u| !u.is_empty())
                .ok_or_else(|| FilelinkerError::not_found(format!("{} has no download URL", full))),
            _ => Err(FilelinkerError::not_found(format!("{} is not a file", full))),
        }
    }
}
