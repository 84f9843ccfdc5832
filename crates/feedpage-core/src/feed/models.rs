use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw field set of one stored record, as returned by HGETALL
pub type FieldMap = HashMap<String, String>;

pub const DEFAULT_TITLE: &str = "No title";
pub const DEFAULT_LINK: &str = "No link";
pub const DEFAULT_SUMMARY: &str = "No summary";

/// Naive layout accepted after RFC 3339 and RFC 2822, read as UTC
pub const NAIVE_PUBLISHED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of reading a single item record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedRecord {
    Found(FieldMap),
    Missing,
}

impl FetchedRecord {
    /// Wrap a field map, treating an empty one as a missing record
    pub fn from_fields(fields: FieldMap) -> Self {
        if fields.is_empty() {
            FetchedRecord::Missing
        } else {
            FetchedRecord::Found(fields)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FetchedRecord::Missing)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            FetchedRecord::Found(fields) => fields.get(name).map(String::as_str),
            FetchedRecord::Missing => None,
        }
    }

    /// Parsed publish time, if present and well formed
    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.field("published").and_then(parse_published)
    }
}

/// One syndicated entry as returned to API clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub summary: String,
}

impl Default for FeedItem {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            link: DEFAULT_LINK.to_string(),
            published: None,
            summary: DEFAULT_SUMMARY.to_string(),
        }
    }
}

impl FeedItem {
    /// Build an item from raw fields, defaulting whatever is absent
    pub fn from_fields(fields: &FieldMap) -> Self {
        let text = |name: &str, default: &str| {
            fields
                .get(name)
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            title: text("title", DEFAULT_TITLE),
            link: text("link", DEFAULT_LINK),
            published: fields.get("published").and_then(|v| parse_published(v)),
            summary: text("summary", DEFAULT_SUMMARY),
        }
    }
}

impl From<FetchedRecord> for FeedItem {
    fn from(record: FetchedRecord) -> Self {
        match record {
            FetchedRecord::Found(fields) => FeedItem::from_fields(&fields),
            FetchedRecord::Missing => FeedItem::default(),
        }
    }
}

/// Parse a stored publish timestamp.
///
/// Accepts RFC 3339, RFC 2822 (RSS `pubDate`) and `%Y-%m-%d %H:%M:%S` as UTC.
/// Returns `None` for anything else.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, NAIVE_PUBLISHED_FORMAT)
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Ascending by publish time; absent timestamps sort after every present one
pub fn cmp_published(a: Option<&DateTime<Utc>>, b: Option<&DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
