use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tracing::{debug, error, trace};

use super::{KvListPage, KvStore};
use crate::config::RedisConfig;
use crate::errors::{FilelinkerError, Result};

/// Redis 存储，所有键加上 `key_prefix`
///
/// `list` 的 cursor 直接对应 `SCAN` 的游标；`COUNT` 只是提示值，
/// 单页可能少于 `limit` 甚至为空，调用方需循环到 cursor 为空。
pub struct RedisKvStore {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisKvStore {
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.clone()).map_err(|e| {
            FilelinkerError::store_operation(format!("Invalid Redis URL '{}': {}", config.url, e))
        })?;

        let store = Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: config.key_prefix.clone(),
        };

        // 启动时测试连接
        let mut conn = store.get_connection().await.map_err(|e| {
            error!(
                "Failed to connect to Redis server: {}. Check Redis server status and URL: {}",
                e, config.url
            );
            FilelinkerError::store_operation(format!("Redis connection failed: {}", e))
        })?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!(
            "Redis connection test successful: {} (prefix '{}')",
            pong, store.key_prefix
        );

        Ok(store)
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> std::result::Result<MultiplexedConnection, redis::RedisError> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self.client.get_multiplexed_async_connection().await?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    async fn connection_or_reset(&self) -> Result<MultiplexedConnection> {
        match self.get_connection().await {
            Ok(conn) => Ok(conn),
            Err(e) => {
                error!("Failed to get Redis connection: {}", e);
                self.reset_connection().await;
                Err(e.into())
            }
        }
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    fn strip_prefix<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(self.key_prefix.as_str()).unwrap_or(key)
    }

    async fn on_error(&self, op: &str, key: &str, e: redis::RedisError) -> FilelinkerError {
        error!("Redis {} failed for '{}': {}", op, key, e);
        // 连接可能已断开，重置连接
        self.reset_connection().await;
        e.into()
    }
}

#[async_trait]
impl KvStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection_or_reset().await?;
        match conn.get::<String, Option<String>>(self.make_key(key)).await {
            Ok(value) => {
                trace!("Redis GET '{}': hit={}", key, value.is_some());
                Ok(value)
            }
            Err(e) => Err(self.on_error("GET", key, e).await),
        }
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let mut conn = self.connection_or_reset().await?;
        match conn.set::<String, String, ()>(self.make_key(key), value).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.on_error("SET", key, e).await),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection_or_reset().await?;
        match conn.del::<String, i32>(self.make_key(key)).await {
            Ok(deleted) => {
                trace!("Redis DEL '{}': {}", key, deleted);
                Ok(())
            }
            Err(e) => Err(self.on_error("DEL", key, e).await),
        }
    }

    async fn list(&self, cursor: Option<&str>, limit: usize) -> Result<KvListPage> {
        let mut conn = self.connection_or_reset().await?;
        let pattern = format!("{}*", self.key_prefix);

        let scanned: redis::RedisResult<(String, Vec<String>)> = redis::cmd("SCAN")
            .arg(cursor.unwrap_or("0"))
            .arg("MATCH")
            .arg(&pattern)
            .arg("COUNT")
            .arg(limit.max(1))
            .query_async(&mut conn)
            .await;

        match scanned {
            Ok((next, keys)) => Ok(KvListPage {
                keys: keys
                    .iter()
                    .map(|k| self.strip_prefix(k).to_string())
                    .collect(),
                cursor: (next != "0").then_some(next),
            }),
            Err(e) => Err(self.on_error("SCAN", &pattern, e).await),
        }
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
