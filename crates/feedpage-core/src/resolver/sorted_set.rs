use std::sync::Arc;

use tracing::debug;

use super::{IdResolver, Resolution};
use crate::config::ResolverStrategy;
use crate::pagination::PageWindow;
use crate::storage::FeedStore;
use crate::Result;

/// Ids live in a sorted set scored by publish time, newest first.
///
/// Ordering and windowing both happen in the store; only the page's ids are
/// ever transferred.
pub struct SortedSetResolver {
    store: Arc<dyn FeedStore>,
    key: String,
}

impl SortedSetResolver {
    pub fn new(store: Arc<dyn FeedStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }
}

#[async_trait::async_trait]
impl IdResolver for SortedSetResolver {
    fn strategy(&self) -> ResolverStrategy {
        ResolverStrategy::SortedSet
    }

    async fn resolve(&self, window: PageWindow) -> Result<Resolution> {
        let total_items = self
            .store
            .sorted_set_len(&self.key)
            .await
            .map_err(|e| e.into_resolution(&self.key))?;

        let Some((start, stop)) = window.inclusive_bounds(total_items) else {
            debug!(
                "Window {}..{} past end of '{}' ({} items)",
                window.start, window.end, self.key, total_items
            );
            return Ok(Resolution::Windowed {
                ids: Vec::new(),
                total_items,
            });
        };

        let ids = self
            .store
            .sorted_set_rev_range(&self.key, start, stop)
            .await
            .map_err(|e| e.into_resolution(&self.key))?;

        debug!("Resolved {} ids from '{}' [{}, {}]", ids.len(), self.key, start, stop);
        Ok(Resolution::Windowed { ids, total_items })
    }
}
