use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::StaticConfig;
use crate::services::AppServices;
use crate::storage::SourceType;
use strum::IntoEnumIterator;

/// 准备服务器启动的上下文（存储、上游客户端、解析器）
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<AppServices> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let services = AppServices::build(config)
        .await
        .context("Failed to initialize services")?;

    let supported: Vec<String> = SourceType::iter()
        .filter(|t| services.registry.supports(*t))
        .map(|t| t.to_string())
        .collect();
    info!(
        "Store: {}, source types: {}",
        services.store.backend_name(),
        supported.join(", ")
    );

    debug!("Pre-startup finished in {:?}", start_time.elapsed());
    Ok(services)
}
