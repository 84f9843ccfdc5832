use chrono::{DateTime, Utc};

use crate::feed::{cmp_published, FeedItem, FetchedRecord};
use crate::pagination::{paginate, PageRequest, PageResult};

/// Whether fetched records already arrive in page order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOrder {
    /// Ordered and windowed upstream
    Windowed,
    /// Full collection in arbitrary order; sort by publish time, then window
    Unordered,
}

/// Stable sort by publish time ascending, undated entries last
pub fn sort_by_published<T, F>(items: &mut [T], published: F)
where
    F: Fn(&T) -> Option<DateTime<Utc>>,
{
    items.sort_by(|a, b| cmp_published(published(a).as_ref(), published(b).as_ref()));
}

/// Turn fetched records into a page of typed items.
///
/// Missing records become items with default fields. For
/// [`ItemOrder::Unordered`] input the full collection is sorted before the
/// page window is applied.
pub fn assemble(
    records: Vec<FetchedRecord>,
    request: &PageRequest,
    total_items: usize,
    order: ItemOrder,
) -> PageResult {
    let mut items: Vec<FeedItem> = records.into_iter().map(FeedItem::from).collect();

    if order == ItemOrder::Unordered {
        sort_by_published(&mut items, |item| item.published);
        items = paginate(items, request.window());
    }

    PageResult::new(items, request, total_items)
}
