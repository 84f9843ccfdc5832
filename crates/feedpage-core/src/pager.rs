use std::sync::Arc;

use tracing::debug;

use crate::assembler::{assemble, ItemOrder};
use crate::config::{ResolverStrategy, StoreConfig};
use crate::fetcher::ItemFetcher;
use crate::pagination::{paginate, PageRequest, PageResult};
use crate::resolver::{build_resolver, IdResolver, Resolution};
use crate::storage::FeedStore;
use crate::{Error, Result};

/// Request pipeline: resolve ids, fetch records, assemble the page.
///
/// Holds no per-request state; one instance serves every request.
pub struct FeedPager {
    store: Arc<dyn FeedStore>,
    resolver: Box<dyn IdResolver>,
    fetcher: ItemFetcher,
}

impl FeedPager {
    pub fn new(store: Arc<dyn FeedStore>, resolver: Box<dyn IdResolver>, fetcher: ItemFetcher) -> Self {
        Self {
            store,
            resolver,
            fetcher,
        }
    }

    /// Wire up the pipeline described by `config` around an already open store
    pub fn from_config(config: &StoreConfig, store: Arc<dyn FeedStore>) -> Self {
        let fetcher = ItemFetcher::new(
            Arc::clone(&store),
            config.item_key_prefix.clone(),
            config.fetch_concurrency(),
        );
        let resolver = build_resolver(config, Arc::clone(&store), fetcher.clone());
        Self::new(store, resolver, fetcher)
    }

    pub fn strategy(&self) -> ResolverStrategy {
        self.resolver.strategy()
    }

    /// Check the store connection
    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }

    /// Produce one page of feed items
    pub async fn list_page(&self, request: &PageRequest) -> Result<PageResult> {
        let window = request.window();
        let resolution = self.resolver.resolve(window).await?;

        let result = match resolution {
            Resolution::Windowed { ids, total_items } => {
                let records = self.fetcher.fetch_items(&ids).await;
                assemble(records, request, total_items, ItemOrder::Windowed)
            }
            Resolution::Unordered { ids } => {
                let total_items = ids.len();
                let records = self.fetcher.fetch_items(&ids).await;
                assemble(records, request, total_items, ItemOrder::Unordered)
            }
            Resolution::Prefetched {
                records,
                total_items,
            } => assemble(records, request, total_items, ItemOrder::Windowed),
        };

        debug!(
            "Page {} (size {}): {} items of {}",
            result.page,
            result.page_size,
            result.items.len(),
            result.total_items
        );
        Ok(result)
    }

    /// Read raw string values for `keys` and return one page of those present
    pub async fn values_page(&self, keys: &[String], request: &PageRequest) -> Result<Vec<String>> {
        if keys.is_empty() {
            return Err(Error::Validation("at least one key is required".to_string()));
        }

        let values = self.store.get_many(keys).await?;
        let present: Vec<String> = values.into_iter().flatten().collect();

        debug!("Read {} of {} requested values", present.len(), keys.len());
        Ok(paginate(present, request.window()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn config(strategy: ResolverStrategy) -> StoreConfig {
        StoreConfig {
            strategy,
            ..StoreConfig::default()
        }
    }

    /// 25 items, `00` oldest to `24` newest, indexed every way at once
    fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for i in 0..25u32 {
            let id = format!("{:02}", i);
            let title = format!("Item {}", id);
            let link = format!("https://example.com/{}", id);
            let published = format!("2024-01-{:02}T08:00:00Z", i + 1);
            store.put_hash(
                &format!("rss:item:{}", id),
                &[
                    ("title", title.as_str()),
                    ("link", link.as_str()),
                    ("published", published.as_str()),
                    ("summary", "text"),
                ],
            );
            store.add_scored("rss_feed", &id, 1_704_096_000.0 + f64::from(i) * 86_400.0);
            store.add_to_set("rss_feed_set", &id);
        }
        store
    }

    fn titles(result: &PageResult) -> Vec<String> {
        result.items.iter().map(|i| i.title.clone()).collect()
    }

    #[tokio::test]
    async fn test_sorted_set_second_page() {
        let pager = FeedPager::from_config(&config(ResolverStrategy::SortedSet), seeded_store());
        let result = pager.list_page(&PageRequest::new(2, 10).unwrap()).await.unwrap();

        assert_eq!(result.items.len(), 10);
        assert_eq!(result.total_items, 25);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.items[0].title, "Item 14");
        assert_eq!(result.items[9].title, "Item 05");
    }

    #[tokio::test]
    async fn test_set_strategy_sorts_before_slicing() {
        let mut cfg = config(ResolverStrategy::Set);
        cfg.index_key = "rss_feed_set".to_string();
        let pager = FeedPager::from_config(&cfg, seeded_store());

        let result = pager.list_page(&PageRequest::new(3, 10).unwrap()).await.unwrap();
        assert_eq!(
            titles(&result),
            vec!["Item 20", "Item 21", "Item 22", "Item 23", "Item 24"]
        );
        assert_eq!(result.total_items, 25);
        assert_eq!(result.total_pages, 3);
    }

    #[tokio::test]
    async fn test_pattern_scan_strategy() {
        let pager = FeedPager::from_config(&config(ResolverStrategy::PatternScan), seeded_store());
        let result = pager.list_page(&PageRequest::new(1, 3).unwrap()).await.unwrap();

        assert_eq!(titles(&result), vec!["Item 00", "Item 01", "Item 02"]);
        assert_eq!(result.total_items, 25);
        assert_eq!(result.total_pages, 9);
        assert_eq!(result.items[0].link, "https://example.com/00");
    }

    #[tokio::test]
    async fn test_empty_store_every_strategy() {
        for strategy in [
            ResolverStrategy::Set,
            ResolverStrategy::SortedSet,
            ResolverStrategy::PatternScan,
        ] {
            let pager = FeedPager::from_config(&config(strategy), Arc::new(MemoryStore::new()));
            let result = pager.list_page(&PageRequest::new(3, 10).unwrap()).await.unwrap();
            assert!(result.items.is_empty(), "{}", strategy);
            assert_eq!(result.total_items, 0);
            assert_eq!(result.total_pages, 0);
        }
    }

    #[tokio::test]
    async fn test_dangling_id_yields_default_item() {
        let store = seeded_store();
        store.add_scored("rss_feed", "ghost", 9_999_999_999.0);
        let pager = FeedPager::from_config(&config(ResolverStrategy::SortedSet), store);

        let result = pager.list_page(&PageRequest::new(1, 2).unwrap()).await.unwrap();
        assert_eq!(result.items[0].title, "No title");
        assert_eq!(result.items[0].link, "No link");
        assert_eq!(result.items[1].title, "Item 24");
        assert_eq!(result.total_items, 26);
    }

    #[tokio::test]
    async fn test_repeated_requests_are_identical() {
        let store = seeded_store();
        for (strategy, index_key) in [
            (ResolverStrategy::Set, "rss_feed_set"),
            (ResolverStrategy::SortedSet, "rss_feed"),
            (ResolverStrategy::PatternScan, "rss_feed_set"),
        ] {
            let mut cfg = config(strategy);
            cfg.index_key = index_key.to_string();
            let pager = FeedPager::from_config(&cfg, store.clone());
            let request = PageRequest::new(2, 7).unwrap();

            let first = pager.list_page(&request).await.unwrap();
            let second = pager.list_page(&request).await.unwrap();
            assert_eq!(first, second, "{}", strategy);
            assert_eq!(first.items.len(), 7);
        }
    }

    #[tokio::test]
    async fn test_store_down_fails_request() {
        let store = seeded_store();
        store.set_unavailable(true);
        let pager = FeedPager::from_config(&config(ResolverStrategy::SortedSet), store);

        let err = pager.list_page(&PageRequest::default()).await.unwrap_err();
        assert!(err.is_store_unavailable());
        assert!(pager.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_values_page() {
        let store = Arc::new(MemoryStore::new());
        for (key, value) in [("k1", "one"), ("k2", "two"), ("k4", "four")] {
            store.put_string(key, value);
        }
        let pager = FeedPager::from_config(&StoreConfig::default(), store);
        let keys: Vec<String> = ["k1", "k2", "k3", "k4"].iter().map(|s| s.to_string()).collect();

        let page = pager.values_page(&keys, &PageRequest::new(1, 2).unwrap()).await.unwrap();
        assert_eq!(page, vec!["one", "two"]);

        let page = pager.values_page(&keys, &PageRequest::new(2, 2).unwrap()).await.unwrap();
        assert_eq!(page, vec!["four"]);

        let err = pager.values_page(&[], &PageRequest::default()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
