//! Service layer for business logic
//!
//! Shared between the HTTP surface and the CLI.

pub mod code_generator;
mod link_service;
pub mod resolver;

pub use code_generator::{CodeGenerator, MintedCode, derive_code};
pub use link_service::*;
pub use resolver::{Resolution, ResolveRequest, Resolver};

use std::sync::Arc;

use crate::config::StaticConfig;
use crate::errors::Result;
use crate::sources::{BackendRegistry, HttpClient, UreqHttpClient};
use crate::storage::{LinkStore, StorageFactory};

/// 运行时共享的服务集合
pub struct AppServices {
    pub store: Arc<LinkStore>,
    pub registry: Arc<BackendRegistry>,
    pub http: Arc<dyn HttpClient>,
    pub resolver: Arc<Resolver>,
    pub links: Arc<LinkService>,
}

impl AppServices {
    pub async fn build(config: &StaticConfig) -> Result<Self> {
        let store = StorageFactory::create(config).await?;
        let http: Arc<dyn HttpClient> =
            Arc::new(UreqHttpClient::new(config.backends.http_timeout_secs));
        Ok(Self::with_parts(config, store, http))
    }

    /// Wire services around an existing store and upstream client
    pub fn with_parts(
        config: &StaticConfig,
        store: Arc<LinkStore>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        let registry = Arc::new(BackendRegistry::new(&config.backends, http.clone()));
        let resolver = Arc::new(Resolver::new(
            store.clone(),
            registry.clone(),
            http.clone(),
            config.links.clone(),
        ));
        let links = Arc::new(LinkService::new(
            store.clone(),
            CodeGenerator::new(store.clone(), config.codes.clone()),
            config.links.clone(),
        ));

        Self {
            store,
            registry,
            http,
            resolver,
            links,
        }
    }
}
