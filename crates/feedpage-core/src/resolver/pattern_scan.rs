use std::sync::Arc;

use tracing::debug;

use super::{IdResolver, Resolution};
use crate::assembler::sort_by_published;
use crate::config::ResolverStrategy;
use crate::fetcher::ItemFetcher;
use crate::pagination::{paginate, PageWindow};
use crate::storage::FeedStore;
use crate::Result;

/// Enumerates record keys by pattern and orders them by publish time.
///
/// Every record is read on every request (O(total items)); prefer the
/// sorted-set layout when the store maintains one.
pub struct PatternScanResolver {
    store: Arc<dyn FeedStore>,
    fetcher: ItemFetcher,
    pattern: String,
}

impl PatternScanResolver {
    pub fn new(store: Arc<dyn FeedStore>, fetcher: ItemFetcher, pattern: impl Into<String>) -> Self {
        Self {
            store,
            fetcher,
            pattern: pattern.into(),
        }
    }
}

#[async_trait::async_trait]
impl IdResolver for PatternScanResolver {
    fn strategy(&self) -> ResolverStrategy {
        ResolverStrategy::PatternScan
    }

    async fn resolve(&self, window: PageWindow) -> Result<Resolution> {
        let keys = self
            .store
            .keys(&self.pattern)
            .await
            .map_err(|e| e.into_resolution(&self.pattern))?;

        let mut ids: Vec<String> = keys
            .iter()
            .filter_map(|key| self.fetcher.id_from_key(key))
            .map(str::to_string)
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let total_items = ids.len();
        if total_items == 0 {
            return Ok(Resolution::empty());
        }

        let mut records = self.fetcher.fetch_items(&ids).await;
        sort_by_published(&mut records, |record| record.published());

        debug!(
            "Scanned {} records for '{}', window {}..{}",
            total_items, self.pattern, window.start, window.end
        );
        Ok(Resolution::Prefetched {
            records: paginate(records, window),
            total_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::range_for;
    use crate::storage::MemoryStore;
    use crate::Error;

    fn resolver(store: Arc<MemoryStore>) -> PatternScanResolver {
        let fetcher = ItemFetcher::new(store.clone(), "rss:item:", 8);
        PatternScanResolver::new(store, fetcher, "rss:item:*")
    }

    fn titles(resolution: Resolution) -> Vec<String> {
        match resolution {
            Resolution::Prefetched { records, .. } => records
                .iter()
                .map(|r| r.field("title").unwrap_or("-").to_string())
                .collect(),
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_orders_ascending_with_undated_last() {
        let store = Arc::new(MemoryStore::new());
        store.put_hash("rss:item:1", &[("title", "late"), ("published", "2024-03-01T00:00:00Z")]);
        store.put_hash("rss:item:2", &[("title", "undated")]);
        store.put_hash("rss:item:3", &[("title", "early"), ("published", "2024-01-01T00:00:00Z")]);
        store.put_hash("rss:item:4", &[("title", "garbled"), ("published", "soon")]);
        store.put_hash("rss:item:5", &[("title", "middle"), ("published", "Thu, 01 Feb 2024 00:00:00 +0000")]);
        store.put_string("rss:other", "not an item");

        let resolver = resolver(store);
        assert_eq!(
            titles(resolver.resolve(range_for(1, 10)).await.unwrap()),
            vec!["early", "middle", "late", "undated", "garbled"]
        );
        assert_eq!(
            titles(resolver.resolve(range_for(2, 2)).await.unwrap()),
            vec!["late", "undated"]
        );
    }

    #[tokio::test]
    async fn test_total_counts_every_match() {
        let store = Arc::new(MemoryStore::new());
        for i in 0..7 {
            store.put_hash(&format!("rss:item:{}", i), &[("title", "t")]);
        }

        match resolver(store).resolve(range_for(5, 2)).await.unwrap() {
            Resolution::Prefetched { records, total_items } => {
                assert!(records.is_empty());
                assert_eq!(total_items, 7);
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_matches() {
        let store = Arc::new(MemoryStore::new());
        assert_eq!(
            resolver(store).resolve(range_for(1, 10)).await.unwrap(),
            Resolution::empty()
        );
    }

    #[tokio::test]
    async fn test_scan_failure() {
        let store = Arc::new(MemoryStore::new());
        store.fail_key("rss:item:*");
        assert!(matches!(
            resolver(store).resolve(range_for(1, 10)).await,
            Err(Error::Resolution { .. })
        ));
    }
}
