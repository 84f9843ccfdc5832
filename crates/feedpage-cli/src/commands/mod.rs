pub mod check;
pub mod page;
pub mod serve;

use std::sync::Arc;

use anyhow::Result;

use feedpage_core::storage::{FeedStore, RedisStore};
use feedpage_core::AppConfig;

/// Open the Redis connection shared by every request
async fn open_store(config: &AppConfig) -> Result<Arc<dyn FeedStore>> {
    let store = RedisStore::connect(&config.store).await?;
    Ok(Arc::new(store))
}
