use std::sync::Arc;

use tokio::task::JoinSet;

use crate::feed::FetchedRecord;
use crate::storage::FeedStore;

/// Concurrent per-identifier record reads.
///
/// Results correlate with the input by position, never by completion order.
/// A failed or absent read degrades to [`FetchedRecord::Missing`] so a single
/// dead identifier cannot fail the batch.
#[derive(Clone)]
pub struct ItemFetcher {
    store: Arc<dyn FeedStore>,
    key_prefix: String,
    concurrency: usize,
}

impl ItemFetcher {
    pub fn new(store: Arc<dyn FeedStore>, key_prefix: impl Into<String>, concurrency: usize) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
            concurrency: concurrency.max(1),
        }
    }

    /// Record key for an item identifier
    pub fn record_key(&self, id: &str) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    /// Identifier for a record key, if it carries the item prefix
    pub fn id_from_key<'k>(&self, key: &'k str) -> Option<&'k str> {
        key.strip_prefix(self.key_prefix.as_str())
    }

    /// Fetch the records for `ids`, in the same order as `ids`.
    ///
    /// Dropping the returned future aborts every read still in flight.
    pub async fn fetch_items(&self, ids: &[String]) -> Vec<FetchedRecord> {
        let mut slots: Vec<Option<FetchedRecord>> = vec![None; ids.len()];
        let mut join_set: JoinSet<(usize, FetchedRecord)> = JoinSet::new();
        let mut pending = ids.iter().enumerate();

        for (index, id) in pending.by_ref().take(self.concurrency) {
            self.spawn_read(&mut join_set, index, id);
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, record)) => slots[index] = Some(record),
                Err(e) => tracing::warn!("Record read task failed: {}", e),
            }

            if let Some((index, id)) = pending.next() {
                self.spawn_read(&mut join_set, index, id);
            }
        }

        // Slots left empty belong to tasks that panicked
        slots
            .into_iter()
            .map(|slot| slot.unwrap_or(FetchedRecord::Missing))
            .collect()
    }

    fn spawn_read(&self, join_set: &mut JoinSet<(usize, FetchedRecord)>, index: usize, id: &str) {
        let store = Arc::clone(&self.store);
        let key = self.record_key(id);

        join_set.spawn(async move {
            let record = match store.hash_get_all(&key).await {
                Ok(fields) => {
                    let record = FetchedRecord::from_fields(fields);
                    if record.is_missing() {
                        tracing::debug!("Record missing: {}", key);
                    }
                    record
                }
                Err(e) => {
                    tracing::warn!("Failed to read record '{}': {}", key, e);
                    FetchedRecord::Missing
                }
            };
            (index, record)
        });
    }
}
