use std::time::Duration;

use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;

use super::retry::read_with_retry;
use super::FeedStore;
use crate::config::StoreConfig;
use crate::feed::FieldMap;
use crate::{Error, Result};

/// Redis-backed store over a shared, auto-reconnecting connection
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Open the connection manager described by `config`
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let client = redis::Client::open(config.redis_url.as_str())
            .map_err(|e| Error::Config(format!("invalid redis_url: {}", e)))?;

        let manager_config = ConnectionManagerConfig::new()
            .set_connection_timeout(Duration::from_secs(config.connection_timeout_secs))
            .set_response_timeout(Duration::from_secs(config.response_timeout_secs));

        tracing::info!("Connecting to store: {}", redacted(&config.redis_url));

        let conn = ConnectionManager::new_with_config(client, manager_config)
            .await
            .map_err(|e| Error::StoreUnavailable(e.to_string()))?;

        Ok(Self { conn })
    }

    fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

#[async_trait::async_trait]
impl FeedStore for RedisStore {
    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        read_with_retry(|| async move {
            let mut conn = self.conn();
            let members: Vec<String> = conn.smembers(key).await?;
            Ok(members)
        })
        .await
    }

    async fn sorted_set_len(&self, key: &str) -> Result<usize> {
        read_with_retry(|| async move {
            let mut conn = self.conn();
            let len: usize = conn.zcard(key).await?;
            Ok(len)
        })
        .await
    }

    async fn sorted_set_rev_range(
        &self,
        key: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<String>> {
        read_with_retry(|| async move {
            let mut conn = self.conn();
            let members: Vec<String> = conn.zrevrange(key, start as isize, stop as isize).await?;
            Ok(members)
        })
        .await
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        read_with_retry(|| async move {
            let mut conn = self.conn();
            let keys: Vec<String> = conn.keys(pattern).await?;
            Ok(keys)
        })
        .await
    }

    async fn hash_get_all(&self, key: &str) -> Result<FieldMap> {
        let mut conn = self.conn();
        let fields: FieldMap = conn.hgetall(key).await?;
        Ok(fields)
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn();
        // Explicit MGET: the typed helper switches to GET for a single key
        let values: Vec<Option<String>> = redis::cmd("MGET").arg(keys).query_async(&mut conn).await?;
        Ok(values)
    }
}

/// Strip credentials from a connection URL before logging it
fn redacted(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
