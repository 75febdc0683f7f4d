use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use serde_json::Value;
use tracing::{info, warn};

use crate::cache::{CacheError, ResponseCache};

const KEY_PREFIX: &str = "reviewhub:";

/// Shared cache for multi-instance deployments. Values are stored as JSON
/// strings with a Redis-side expiry.
#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis response cache connected");
        Ok(Self { conn })
    }

    async fn try_get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = redis::cmd("GET")
            .arg(namespaced(key))
            .query_async(&mut conn)
            .await?;
        match raw {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    async fn try_set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(value)?;
        redis::cmd("SET")
            .arg(namespaced(key))
            .arg(payload)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ResponseCache for RedisCache {
    async fn get(&self, key: &str) -> Option<Value> {
        match self.try_get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Redis cache read failed for {key}: {e}");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        if let Err(e) = self.try_set(key, &value, ttl).await {
            warn!("Redis cache write failed for {key}: {e}");
        }
    }
}

fn namespaced(key: &str) -> String {
    format!("{KEY_PREFIX}{key}")
}
