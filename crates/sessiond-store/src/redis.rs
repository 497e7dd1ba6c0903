//! Redis implementation of the storage engine.
//!
//! Document primitives map onto RedisJSON commands (`JSON.SET`,
//! `JSON.GET`, `JSON.DEL`), hash primitives onto `HSET`/`HGETALL`/`HDEL`,
//! and key operations onto `DEL`/`EXPIRE`/`EXISTS`. Connections come from
//! a bounded deadpool: when the pool is exhausted, acquisition blocks the
//! requesting task until a connection frees up or the wait timeout fires.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Connection, Pool, PoolConfig, Runtime};
use redis::cmd;
use tracing::debug;

use crate::engine::StorageEngine;
use crate::error::{Result, StoreError};

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<deadpool_redis::PoolError> for StoreError {
    fn from(e: deadpool_redis::PoolError) -> Self {
        StoreError::Backend(format!("connection pool: {e}"))
    }
}

/// Connection options for [`RedisEngine`].
#[derive(Debug, Clone)]
pub struct RedisEngineOptions {
    /// Full connection URL, e.g. `redis://:secret@localhost:6379/0`.
    pub url: String,

    /// Maximum number of pooled connections.
    pub pool_size: usize,

    /// How long a task waits for a free connection before the operation
    /// fails instead of queuing without bound.
    pub wait_timeout: Duration,
}

impl RedisEngineOptions {
    /// Options with the given URL and the stock pool sizing.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: 3,
            wait_timeout: Duration::from_secs(5),
        }
    }
}

/// [`StorageEngine`] backed by a Redis server with the RedisJSON module.
pub struct RedisEngine {
    pool: Pool,
}

impl RedisEngine {
    /// Build the connection pool. Connections are established lazily on
    /// first acquisition.
    pub fn connect(options: RedisEngineOptions) -> Result<Self> {
        let mut cfg = deadpool_redis::Config::from_url(&options.url);
        let mut pool_cfg = PoolConfig::new(options.pool_size);
        pool_cfg.timeouts.wait = Some(options.wait_timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Backend(format!("failed to build pool: {e}")))?;
        debug!(pool_size = options.pool_size, "redis pool configured");
        Ok(Self { pool })
    }

    async fn conn(&self) -> Result<Connection> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl StorageEngine for RedisEngine {
    async fn doc_set(&self, key: &str, path: &str, json: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        let _: () = cmd("JSON.SET")
            .arg(key)
            .arg(path)
            .arg(json)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn doc_get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn().await?;
        let doc: Option<String> = cmd("JSON.GET")
            .arg(key)
            .arg(".")
            .query_async(&mut conn)
            .await?;
        Ok(doc)
    }

    async fn doc_del(&self, key: &str, path: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        // JSON.DEL returns the number of paths deleted; zero (absent path)
        // is not an error.
        let _: () = cmd("JSON.DEL")
            .arg(key)
            .arg(path)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn hash_set(&self, key: &str, field: &str, payload: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        let _: () = cmd("HSET")
            .arg(key)
            .arg(field)
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut conn = self.conn().await?;
        let fields: HashMap<String, String> =
            cmd("HGETALL").arg(key).query_async(&mut conn).await?;
        Ok(fields)
    }

    async fn hash_del(&self, key: &str, field: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        let _: () = cmd("HDEL")
            .arg(key)
            .arg(field)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn del_key(&self, key: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        let _: () = cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn().await?;
        let _: () = cmd("EXPIRE")
            .arg(key)
            .arg(ttl.as_secs())
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn().await?;
        let exists: bool = cmd("EXISTS").arg(key).query_async(&mut conn).await?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = RedisEngineOptions::new("redis://localhost:6379/0");
        assert_eq!(options.pool_size, 3);
        assert_eq!(options.wait_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_connect_builds_pool_without_network() {
        // Pool construction is lazy; no server is needed here.
        let engine = RedisEngine::connect(RedisEngineOptions::new("redis://localhost:6379/0"));
        assert!(engine.is_ok());
    }
}
