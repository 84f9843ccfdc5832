//! Page window arithmetic shared by every resolver strategy.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::feed::FeedItem;
use crate::{Error, Result};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated pagination request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Validate raw page parameters.
    ///
    /// `page` must be at least 1 and `page_size` within `1..=100`.
    pub fn new(page: i64, page_size: i64) -> Result<Self> {
        if page < 1 {
            return Err(Error::Validation(format!(
                "page must be >= 1, got {}",
                page
            )));
        }
        if page > i64::from(u32::MAX) {
            return Err(Error::Validation(format!(
                "page must be <= {}, got {}",
                u32::MAX,
                page
            )));
        }
        if page_size < 1 || page_size > i64::from(MAX_PAGE_SIZE) {
            return Err(Error::Validation(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, page_size
            )));
        }

        Ok(Self {
            page: page as u32,
            page_size: page_size as u32,
        })
    }

    /// Validate optional parameters, applying the defaults (page 1, size 10)
    pub fn from_params(page: Option<i64>, page_size: Option<i64>) -> Result<Self> {
        Self::new(
            page.unwrap_or(i64::from(DEFAULT_PAGE)),
            page_size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE)),
        )
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn window(&self) -> PageWindow {
        range_for(self.page, self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Half-open index range `[start, end)` selected by a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    /// Clamp the window to a collection of `total` elements.
    /// A window starting past the end yields an empty range.
    pub fn clamp(&self, total: usize) -> Range<usize> {
        let end = self.end.min(total);
        let start = self.start.min(end);
        start..end
    }

    /// Inclusive stop index for a store-side range read, or `None` when the
    /// window does not overlap a collection of `total` elements
    pub fn inclusive_bounds(&self, total: usize) -> Option<(usize, usize)> {
        let range = self.clamp(total);
        if range.is_empty() {
            None
        } else {
            Some((range.start, range.end - 1))
        }
    }
}

/// Convert a page number and size into a half-open window.
///
/// `start = (page - 1) * page_size`, `end = start + page_size`.
pub fn range_for(page: u32, page_size: u32) -> PageWindow {
    let page_size = page_size as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(page_size);
    PageWindow {
        start,
        end: start.saturating_add(page_size),
    }
}

/// Take the elements of `items` that fall inside `window`
pub fn paginate<T>(items: Vec<T>, window: PageWindow) -> Vec<T> {
    let range = window.clamp(items.len());
    items
        .into_iter()
        .skip(range.start)
        .take(range.len())
        .collect()
}

/// Ceiling division; zero items means zero pages
pub fn total_pages(total_items: usize, page_size: u32) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size as usize)
}

/// One assembled page of feed items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    #[serde(rename = "data")]
    pub items: Vec<FeedItem>,
    pub page: u32,
    pub page_size: u32,
    pub total_items: usize,
    pub total_pages: usize,
}

impl PageResult {
    pub fn new(items: Vec<FeedItem>, request: &PageRequest, total_items: usize) -> Self {
        Self {
            items,
            page: request.page(),
            page_size: request.page_size(),
            total_items,
            total_pages: total_pages(total_items, request.page_size()),
        }
    }

    pub fn empty(request: &PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }
}
