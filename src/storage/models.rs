use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

use crate::errors::FilelinkerError;

/// 链接类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkKind {
    File,
    Folder,
}

/// 上游来源类型
///
/// `None` 表示 `target` 是任意外部 URL，按原样代理。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceType {
    None,
    #[serde(rename = "alist")]
    #[strum(serialize = "alist")]
    AList,
    RepoContents,
    ReleaseAssets,
}

impl SourceType {
    /// Parse a textual tag, failing with `UnsupportedSourceType`
    pub fn parse_tag(tag: &str) -> Result<Self, FilelinkerError> {
        tag.trim()
            .to_ascii_lowercase()
            .parse::<SourceType>()
            .map_err(|_| FilelinkerError::unsupported_source_type(format!("Unknown source type '{}'", tag)))
    }

    /// 原始实现只能创建 文件→直链、文件夹→AList 两种组合
    pub fn default_for(kind: LinkKind) -> Self {
        match kind {
            LinkKind::File => SourceType::None,
            LinkKind::Folder => SourceType::AList,
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// 后端参数（按来源类型取用）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// 分支 / 标签 / 提交
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub flatten_release_folder: bool,
}

impl SourceConfig {
    /// owner/repo pair, or `InvalidConfiguration`
    pub fn repository(&self) -> Result<(&str, &str), FilelinkerError> {
        let owner = self.owner.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let repo = self.repo.as_deref().map(str::trim).filter(|s| !s.is_empty());
        match (owner, repo) {
            (Some(owner), Some(repo)) => Ok((owner, repo)),
            _ => Err(FilelinkerError::invalid_configuration(
                "Source config requires both 'owner' and 'repo'",
            )),
        }
    }

    pub fn git_ref(&self) -> Option<&str> {
        self.git_ref.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// 持久化的链接记录，key 为短码
///
/// JSON 字段名与早期存储格式保持一致（`url`、`type`、毫秒时间戳）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    #[serde(rename = "url")]
    pub target: String,
    /// 旧数据可能缺失，由 LinkStore 根据短码长度补齐
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<LinkKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
    #[serde(default)]
    pub source_config: SourceConfig,
    #[serde(with = "chrono::serde::ts_milliseconds", default = "epoch")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds_option", default)]
    pub expire_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_visits: Option<u32>,
    #[serde(default)]
    pub visits: u64,
    #[serde(default)]
    pub access_code: Option<String>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

impl LinkRecord {
    pub fn new(target: impl Into<String>, kind: LinkKind, source_type: SourceType) -> Self {
        Self {
            target: target.into(),
            kind: Some(kind),
            source_type: Some(source_type),
            source_config: SourceConfig::default(),
            created_at: Utc::now(),
            expire_at: None,
            max_visits: None,
            visits: 0,
            access_code: None,
        }
    }

    /// 早期只存了裸 URL 的记录
    pub fn legacy(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            kind: None,
            source_type: None,
            source_config: SourceConfig::default(),
            created_at: epoch(),
            expire_at: None,
            max_visits: None,
            visits: 0,
            access_code: None,
        }
    }

    pub fn kind(&self) -> LinkKind {
        self.kind.unwrap_or(LinkKind::File)
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
            .unwrap_or_else(|| SourceType::default_for(self.kind()))
    }

    pub fn access_code(&self) -> Option<&str> {
        self.access_code.as_deref().filter(|c| !c.is_empty())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire_at.is_some_and(|expire_at| now > expire_at)
    }

    pub fn is_quota_exhausted(&self) -> bool {
        self.max_visits
            .is_some_and(|max| self.visits >= u64::from(max))
    }

    /// 过期或访问次数用尽
    pub fn is_dead_at(&self, now: DateTime<Utc>) -> bool {
        self.is_expired_at(now) || self.is_quota_exhausted()
    }

    /// Same target, kind and source: minting a code for it again is a no-op
    pub fn same_content(&self, other: &LinkRecord) -> bool {
        self.target == other.target
            && self.kind() == other.kind()
            && self.source_type() == other.source_type()
            && self.source_config == other.source_config
    }

    pub fn to_json(&self) -> Result<String, FilelinkerError> {
        serde_json::to_string(self).map_err(Into::into)
    }
}
