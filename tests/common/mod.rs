//! Shared helpers for the integration tests
//!
//! `MockHttp` answers by exact URL; anything unregistered is a 404.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use filelinker::config::StaticConfig;
use filelinker::errors::Result;
use filelinker::services::AppServices;
use filelinker::sources::{Headers, HttpClient, UpstreamResponse, UpstreamStream};
use filelinker::storage::{LinkStore, MemoryKvStore};

pub const ALIST_API: &str = "http://alist.test";

#[derive(Debug, Clone)]
pub struct Seen {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

#[derive(Default)]
pub struct MockHttp {
    responses: Mutex<HashMap<String, (u16, String)>>,
    lengths: Mutex<HashMap<String, u64>>,
    pub seen: Mutex<Vec<Seen>>,
}

impl MockHttp {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.responses
            .lock()
            .insert(url.to_string(), (status, body.to_string()));
    }

    pub fn length(&self, url: &str, len: u64) {
        self.lengths.lock().insert(url.to_string(), len);
    }

    pub fn count(&self, method: &str) -> usize {
        self.seen.lock().iter().filter(|s| s.method == method).count()
    }

    fn record(&self, method: &'static str, url: &str, headers: &Headers, body: Option<serde_json::Value>) {
        self.seen.lock().push(Seen {
            method,
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body,
        });
    }

    fn lookup(&self, url: &str) -> (u16, String) {
        self.responses
            .lock()
            .get(url)
            .cloned()
            .unwrap_or((404, String::new()))
    }
}

#[async_trait]
impl HttpClient for MockHttp {
    async fn get(&self, url: &str, headers: Headers) -> Result<UpstreamResponse> {
        self.record("GET", url, &headers, None);
        let (status, body) = self.lookup(url);
        Ok(UpstreamResponse::new(status, body))
    }

    async fn post_json(
        &self,
        url: &str,
        headers: Headers,
        body: serde_json::Value,
    ) -> Result<UpstreamResponse> {
        self.record("POST", url, &headers, Some(body));
        let (status, body) = self.lookup(url);
        Ok(UpstreamResponse::new(status, body))
    }

    async fn content_length(&self, url: &str) -> Result<Option<u64>> {
        self.record("HEAD", url, &Vec::new(), None);
        Ok(self.lengths.lock().get(url).copied())
    }

    async fn open_stream(&self, url: &str, headers: Headers) -> Result<UpstreamStream> {
        self.record("STREAM", url, &headers, None);
        let (status, body) = self.lookup(url);
        Ok(UpstreamStream {
            status,
            headers: vec![(
                "content-length".to_string(),
                body.len().to_string(),
            )],
            body: Box::new(Cursor::new(body.into_bytes())),
        })
    }
}

/// Config pointing AList at [`ALIST_API`], everything else default
pub fn test_config() -> StaticConfig {
    let mut config = StaticConfig::default();
    config.backends.alist.api_url = ALIST_API.to_string();
    config.backends.alist.token = "alist-token".to_string();
    config
}

pub fn memory_store(config: &StaticConfig) -> Arc<LinkStore> {
    Arc::new(LinkStore::new(
        Arc::new(MemoryKvStore::new()),
        config.codes.folder_length,
        config.store.scan_page_size,
    ))
}

/// Services over an in-memory store and the given mock upstream
pub fn services(http: Arc<MockHttp>) -> AppServices {
    let config = test_config();
    let store = memory_store(&config);
    AppServices::with_parts(&config, store, http)
}

/// AList `/api/fs/list` envelope with the given entries
pub fn alist_listing(entries: &[(&str, bool, u64)]) -> String {
    let content: Vec<serde_json::Value> = entries
        .iter()
        .map(|(name, is_dir, size)| {
            serde_json::json!({
                "name": name,
                "is_dir": is_dir,
                "size": size,
                "modified": "2024-03-01T10:00:00Z",
            })
        })
        .collect();
    serde_json::json!({
        "code": 200,
        "message": "success",
        "data": { "content": content, "total": entries.len() },
    })
    .to_string()
}
