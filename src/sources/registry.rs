use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::http::HttpClient;
use super::{
    AListAdapter, DirectAdapter, ReleaseAssetsAdapter, RepoContentsAdapter, SourceAdapter,
};
use crate::config::BackendsConfig;
use crate::errors::{FilelinkerError, Result};
use crate::storage::SourceType;

/// 来源类型 → 适配器
///
/// 构造后不可变；没有配置的后端不会注册。
pub struct BackendRegistry {
    adapters: HashMap<SourceType, Arc<dyn SourceAdapter>>,
}

impl BackendRegistry {
    pub fn new(config: &BackendsConfig, http: Arc<dyn HttpClient>) -> Self {
        let mut adapters: HashMap<SourceType, Arc<dyn SourceAdapter>> = HashMap::new();

        adapters.insert(SourceType::None, Arc::new(DirectAdapter));
        if config.alist.api_url.trim().is_empty() {
            debug!("AList api_url not set, alist links will be unsupported");
        } else {
            adapters.insert(
                SourceType::AList,
                Arc::new(AListAdapter::new(&config.alist, http.clone())),
            );
        }
        adapters.insert(
            SourceType::RepoContents,
            Arc::new(RepoContentsAdapter::new(&config.github, http.clone())),
        );
        adapters.insert(
            SourceType::ReleaseAssets,
            Arc::new(ReleaseAssetsAdapter::new(&config.github, http)),
        );

        info!("Backend registry ready: {} adapters", adapters.len());
        Self { adapters }
    }

    pub fn resolve(&self, source_type: SourceType) -> Result<Arc<dyn SourceAdapter>> {
        self.adapters.get(&source_type).cloned().ok_or_else(|| {
            FilelinkerError::unsupported_source_type(format!(
                "No backend registered for source type '{}'",
                source_type
            ))
        })
    }

    pub fn resolve_tag(&self, tag: &str) -> Result<Arc<dyn SourceAdapter>> {
        self.resolve(SourceType::parse_tag(tag)?)
    }

    pub fn supports(&self, source_type: SourceType) -> bool {
        self.adapters.contains_key(&source_type)
    }
}
