//! Link management service
//!
//! Admin operations shared by the CLI and any other management surface.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::code_generator::{CodeGenerator, MintedCode};
use crate::config::LinksConfig;
use crate::errors::{FilelinkerError, Result};
use crate::storage::{LinkKind, LinkRecord, LinkStore, SourceConfig, SourceType};
use crate::utils::{TimeParser, is_absolute_url};

// ============ Request/Response DTOs ============

/// Request to create a new link
#[derive(Debug, Clone, Default)]
pub struct CreateLinkRequest {
    /// Absolute URL for files, upstream path for folders
    pub target: String,
    /// Inferred from the target when absent
    pub kind: Option<LinkKind>,
    /// Defaults by kind: file → none, folder → alist
    pub source_type: Option<SourceType>,
    pub source_config: SourceConfig,
    /// RFC3339 or relative ("1d", "2h30m")
    pub expire: Option<String>,
    pub max_visits: Option<u32>,
    pub access_code: Option<String>,
}

/// Keep, clear or replace a field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> FieldUpdate<T> {
    /// `Some` sets, `None` keeps
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(FieldUpdate::Keep, FieldUpdate::Set)
    }
}

/// Request to update an existing link
#[derive(Debug, Clone, Default)]
pub struct UpdateLinkRequest {
    pub expire: FieldUpdate<String>,
    pub max_visits: FieldUpdate<u32>,
    pub access_code: FieldUpdate<String>,
}

/// Result of link creation
#[derive(Debug, Clone)]
pub struct LinkCreateResult {
    pub code: String,
    pub record: LinkRecord,
    /// The code already held this content and nothing was written
    pub reused: bool,
}

// ============ LinkService Implementation ============

pub struct LinkService {
    store: Arc<LinkStore>,
    generator: CodeGenerator,
    links: LinksConfig,
}

impl LinkService {
    pub fn new(store: Arc<LinkStore>, generator: CodeGenerator, links: LinksConfig) -> Self {
        Self {
            store,
            generator,
            links,
        }
    }

    fn validate_max_visits(&self, max_visits: u32) -> Result<u32> {
        if max_visits == 0 || max_visits > self.links.max_visits_limit {
            return Err(FilelinkerError::validation(format!(
                "maxVisits must be between 1 and {}",
                self.links.max_visits_limit
            )));
        }
        Ok(max_visits)
    }

    fn parse_expire(&self, input: &str) -> Result<DateTime<Utc>> {
        TimeParser::parse_expire_time(input.trim()).map_err(FilelinkerError::date_parse)
    }

    fn normalize_access_code(code: Option<String>) -> Option<String> {
        code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
    }

    // ============ CRUD Operations ============

    /// Create a new link under a freshly minted code
    pub async fn create(&self, req: CreateLinkRequest) -> Result<LinkCreateResult> {
        let target = req.target.trim().to_string();
        if target.is_empty() {
            return Err(FilelinkerError::validation("Target must not be empty"));
        }

        let kind = req.kind.unwrap_or_else(|| {
            if is_absolute_url(&target) {
                LinkKind::File
            } else {
                LinkKind::Folder
            }
        });
        let source_type = req.source_type.unwrap_or_else(|| SourceType::default_for(kind));

        match source_type {
            SourceType::None if kind == LinkKind::Folder => {
                return Err(FilelinkerError::validation(
                    "A folder link needs a browsable source type",
                ));
            }
            SourceType::None if !is_absolute_url(&target) => {
                return Err(FilelinkerError::validation(format!(
                    "'{}' is not an absolute http(s) URL",
                    target
                )));
            }
            SourceType::RepoContents | SourceType::ReleaseAssets => {
                req.source_config.repository()?;
            }
            _ => {}
        }

        let max_visits = req
            .max_visits
            .map(|m| self.validate_max_visits(m))
            .transpose()?;
        let expire_at = match req.expire.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(expr) => Some(self.parse_expire(expr)?),
            None => None,
        };

        let mut record = LinkRecord::new(target, kind, source_type);
        record.source_config = req.source_config;
        record.expire_at = expire_at;
        record.max_visits = max_visits;
        record.access_code = Self::normalize_access_code(req.access_code);

        let seed = format!("{}{}", record.target, record.created_at.timestamp_millis());
        let code = match self.generator.generate(&seed, &record).await? {
            MintedCode::Existing(code, existing) => {
                info!("LinkService: '{}' already links '{}', keeping it", code, existing.target);
                return Ok(LinkCreateResult {
                    code,
                    record: existing,
                    reused: true,
                });
            }
            MintedCode::Fresh(code) => code,
        };
        self.store.put(&code, &record).await?;

        info!(
            "LinkService: created {} link '{}' -> '{}' ({})",
            kind.as_ref(),
            code,
            record.target,
            source_type
        );
        Ok(LinkCreateResult {
            code,
            record,
            reused: false,
        })
    }

    /// Update expiry, quota or access code of an existing link
    pub async fn update(&self, code: &str, req: UpdateLinkRequest) -> Result<LinkRecord> {
        let mut record = self
            .store
            .get(code)
            .await?
            .ok_or_else(|| FilelinkerError::not_found(format!("Link '{}' not found", code)))?;

        match req.expire {
            FieldUpdate::Keep => {}
            FieldUpdate::Clear => record.expire_at = None,
            FieldUpdate::Set(expr) => record.expire_at = Some(self.parse_expire(&expr)?),
        }
        match req.max_visits {
            FieldUpdate::Keep => {}
            FieldUpdate::Clear => record.max_visits = None,
            FieldUpdate::Set(max) => record.max_visits = Some(self.validate_max_visits(max)?),
        }
        match req.access_code {
            FieldUpdate::Keep => {}
            FieldUpdate::Clear => record.access_code = None,
            FieldUpdate::Set(c) => record.access_code = Self::normalize_access_code(Some(c)),
        }

        self.store.put(code, &record).await?;
        info!("LinkService: updated '{}'", code);
        Ok(record)
    }

    pub async fn delete(&self, code: &str) -> Result<()> {
        if !self.store.exists(code).await? {
            return Err(FilelinkerError::not_found(format!("Link '{}' not found", code)));
        }
        self.store.delete(code).await?;
        info!("LinkService: deleted '{}'", code);
        Ok(())
    }

    pub async fn get(&self, code: &str) -> Result<Option<LinkRecord>> {
        self.store.get(code).await
    }

    /// All links, newest first
    pub async fn list_all(&self) -> Result<Vec<(String, LinkRecord)>> {
        let mut all = self.store.scan_all().await?;
        all.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at).then_with(|| a.0.cmp(&b.0)));
        Ok(all)
    }

    /// Delete every expired or used-up link, returning how many went
    pub async fn clear_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut cleared = 0;
        for (code, record) in self.store.scan_all().await? {
            if record.is_dead_at(now) {
                self.store.delete(&code).await?;
                debug!("Cleared '{}'", code);
                cleared += 1;
            }
        }
        info!("LinkService: cleared {} expired links", cleared);
        Ok(cleared)
    }
}
