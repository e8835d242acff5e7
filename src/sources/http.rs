//! 上游 HTTP 客户端
//!
//! 适配器只通过 [`HttpClient`] 访问上游，测试中可以替换成桩实现。
//! 默认实现基于 ureq（同步），在 `spawn_blocking` 中执行。

use std::io::Read;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{trace, warn};
use ureq::Agent;

use crate::errors::{FilelinkerError, Result};

/// 请求头列表，名字为静态字符串
pub type Headers = Vec<(&'static str, String)>;

/// 已读完 body 的上游响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            FilelinkerError::backend_unavailable(format!("Malformed upstream response: {}", e))
        })
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, headers: Headers) -> Result<UpstreamResponse>;

    async fn post_json(
        &self,
        url: &str,
        headers: Headers,
        body: serde_json::Value,
    ) -> Result<UpstreamResponse>;

    /// `Content-Length` from a HEAD request, `None` when the upstream does not say
    async fn content_length(&self, url: &str) -> Result<Option<u64>>;

    /// GET whose body is read incrementally
    async fn open_stream(&self, url: &str, headers: Headers) -> Result<UpstreamStream>;
}

/// 流式下载的上游响应，body 为阻塞读取
pub struct UpstreamStream {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Box<dyn Read + Send>,
}

impl UpstreamStream {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// ureq 实现
#[derive(Clone)]
pub struct UreqHttpClient {
    agent: Agent,
}

impl UreqHttpClient {
    /// `timeout_secs == 0` 表示不设全局超时
    pub fn new(timeout_secs: u64) -> Self {
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));
        let agent = Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }

    fn transport_error(method: &str, url: &str, e: ureq::Error) -> FilelinkerError {
        warn!("Upstream {} {} failed: {}", method, url, e);
        FilelinkerError::backend_unavailable(format!("Upstream request failed: {}", e))
    }

    fn get_sync(agent: Agent, url: String, headers: Headers) -> Result<UpstreamResponse> {
        let mut request = agent.get(&url);
        for (name, value) in &headers {
            request = request.header(*name, value.as_str());
        }
        let response = request
            .call()
            .map_err(|e| Self::transport_error("GET", &url, e))?;
        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| Self::transport_error("GET", &url, e))?;
        trace!("GET {} -> {}", url, status);
        Ok(UpstreamResponse { status, body })
    }

    fn post_sync(
        agent: Agent,
        url: String,
        headers: Headers,
        body: serde_json::Value,
    ) -> Result<UpstreamResponse> {
        let mut request = agent.post(&url);
        for (name, value) in &headers {
            request = request.header(*name, value.as_str());
        }
        let response = request
            .send_json(&body)
            .map_err(|e| Self::transport_error("POST", &url, e))?;
        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| Self::transport_error("POST", &url, e))?;
        trace!("POST {} -> {}", url, status);
        Ok(UpstreamResponse { status, body })
    }

    fn head_sync(agent: Agent, url: String) -> Result<Option<u64>> {
        let response = agent
            .head(&url)
            .call()
            .map_err(|e| Self::transport_error("HEAD", &url, e))?;
        if !response.status().is_success() {
            trace!("HEAD {} -> {}", url, response.status());
            return Ok(None);
        }
        Ok(response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok()))
    }

    fn open_stream_sync(agent: Agent, url: String, headers: Headers) -> Result<UpstreamStream> {
        let mut request = agent.get(&url);
        for (name, value) in &headers {
            request = request.header(*name, value.as_str());
        }
        let response = request
            .call()
            .map_err(|e| Self::transport_error("GET", &url, e))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        trace!("GET {} -> {} (streaming)", url, status);
        let body = Box::new(response.into_body().into_reader());
        Ok(UpstreamStream {
            status,
            headers,
            body,
        })
    }
}

fn join_error(e: tokio::task::JoinError) -> FilelinkerError {
    warn!("Upstream spawn_blocking failed: {}", e);
    FilelinkerError::backend_unavailable(format!("Upstream task failed: {}", e))
}

#[async_trait]
impl HttpClient for UreqHttpClient {
    async fn get(&self, url: &str, headers: Headers) -> Result<UpstreamResponse> {
        let agent = self.agent.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || Self::get_sync(agent, url, headers))
            .await
            .map_err(join_error)?
    }

    async fn post_json(
        &self,
        url: &str,
        headers: Headers,
        body: serde_json::Value,
    ) -> Result<UpstreamResponse> {
        let agent = self.agent.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || Self::post_sync(agent, url, headers, body))
            .await
            .map_err(join_error)?
    }

    async fn content_length(&self, url: &str) -> Result<Option<u64>> {
        let agent = self.agent.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || Self::head_sync(agent, url))
            .await
            .map_err(join_error)?
    }

    async fn open_stream(&self, url: &str, headers: Headers) -> Result<UpstreamStream> {
        let agent = self.agent.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || Self::open_stream_sync(agent, url, headers))
            .await
            .map_err(join_error)?
    }
}
