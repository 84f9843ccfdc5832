use std::sync::Arc;

use tracing::debug;

use super::{IdResolver, Resolution};
use crate::config::ResolverStrategy;
use crate::pagination::PageWindow;
use crate::storage::FeedStore;
use crate::Result;

/// Ids live in an unordered set.
///
/// The set gives no order, so every id is handed on and the page is cut only
/// after the records are sorted by publish time.
pub struct SetResolver {
    store: Arc<dyn FeedStore>,
    key: String,
}

impl SetResolver {
    pub fn new(store: Arc<dyn FeedStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }
}

#[async_trait::async_trait]
impl IdResolver for SetResolver {
    fn strategy(&self) -> ResolverStrategy {
        ResolverStrategy::Set
    }

    async fn resolve(&self, _window: PageWindow) -> Result<Resolution> {
        let mut ids = self
            .store
            .set_members(&self.key)
            .await
            .map_err(|e| e.into_resolution(&self.key))?;

        // Fixed tie order for records with equal or absent timestamps
        ids.sort_unstable();

        debug!("Resolved {} ids from set '{}'", ids.len(), self.key);
        Ok(Resolution::Unordered { ids })
    }
}
