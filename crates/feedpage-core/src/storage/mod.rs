//! Narrow key/value contract over the backing store.
//!
//! The pipeline only ever talks to `dyn FeedStore`; the Redis client and the
//! in-memory store are interchangeable behind it.

mod memory_store;
mod redis_store;
pub mod retry;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;

use crate::feed::FieldMap;
use crate::Result;

/// Read-only operations the feed pipeline needs from a store
#[async_trait::async_trait]
pub trait FeedStore: Send + Sync {
    /// Round-trip check that the store is reachable
    async fn ping(&self) -> Result<()>;

    /// All members of an unordered set (SMEMBERS)
    async fn set_members(&self, key: &str) -> Result<Vec<String>>;

    /// Cardinality of a sorted set (ZCARD)
    async fn sorted_set_len(&self, key: &str) -> Result<usize>;

    /// Members of a sorted set from highest to lowest score, `start..=stop` (ZREVRANGE)
    async fn sorted_set_rev_range(&self, key: &str, start: usize, stop: usize)
        -> Result<Vec<String>>;

    /// Keys matching a glob pattern (KEYS)
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// Every field of a hash; an absent key yields an empty map (HGETALL)
    async fn hash_get_all(&self, key: &str) -> Result<FieldMap>;

    /// String values for several keys, `None` where absent (MGET)
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>>;
}
