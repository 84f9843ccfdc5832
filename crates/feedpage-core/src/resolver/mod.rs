//! Identifier resolution strategies.
//!
//! Each strategy answers the same question (which item ids belong on this
//! page, and how many items exist in total) for a different index layout.

mod pattern_scan;
mod set;
mod sorted_set;

pub use pattern_scan::PatternScanResolver;
pub use set::SetResolver;
pub use sorted_set::SortedSetResolver;

use std::sync::Arc;

use crate::config::{ResolverStrategy, StoreConfig};
use crate::feed::FetchedRecord;
use crate::fetcher::ItemFetcher;
use crate::pagination::PageWindow;
use crate::storage::FeedStore;
use crate::Result;

/// What a resolver hands on to the rest of the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Ids already ordered and cut to the page window
    Windowed { ids: Vec<String>, total_items: usize },
    /// Every id, with no meaningful order; ordering and windowing happen
    /// after the records are fetched
    Unordered { ids: Vec<String> },
    /// Records already read, ordered and cut to the page window
    Prefetched {
        records: Vec<FetchedRecord>,
        total_items: usize,
    },
}

impl Resolution {
    pub fn empty() -> Self {
        Resolution::Windowed {
            ids: Vec::new(),
            total_items: 0,
        }
    }
}

/// Resolves the identifiers that belong on a page
#[async_trait::async_trait]
pub trait IdResolver: Send + Sync {
    /// Strategy implemented by this resolver
    fn strategy(&self) -> ResolverStrategy;

    /// Resolve the ids for `window`.
    ///
    /// Fails only when the index itself cannot be read.
    async fn resolve(&self, window: PageWindow) -> Result<Resolution>;
}

/// Build the resolver configured for `config.strategy`
pub fn build_resolver(
    config: &StoreConfig,
    store: Arc<dyn FeedStore>,
    fetcher: ItemFetcher,
) -> Box<dyn IdResolver> {
    match config.strategy {
        ResolverStrategy::Set => Box::new(SetResolver::new(store, config.index_key.clone())),
        ResolverStrategy::SortedSet => {
            Box::new(SortedSetResolver::new(store, config.index_key.clone()))
        }
        ResolverStrategy::PatternScan => Box::new(PatternScanResolver::new(
            store,
            fetcher,
            config.item_key_pattern(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_build_resolver_matches_strategy() {
        for strategy in [
            ResolverStrategy::Set,
            ResolverStrategy::SortedSet,
            ResolverStrategy::PatternScan,
        ] {
            let config = StoreConfig {
                strategy,
                ..StoreConfig::default()
            };
            let store: Arc<dyn FeedStore> = Arc::new(MemoryStore::new());
            let fetcher = ItemFetcher::new(Arc::clone(&store), &config.item_key_prefix, 4);
            assert_eq!(build_resolver(&config, store, fetcher).strategy(), strategy);
        }
    }
}
