mod models;

pub use models::{
    cmp_published, parse_published, FeedItem, FetchedRecord, FieldMap, DEFAULT_LINK,
    DEFAULT_SUMMARY, DEFAULT_TITLE, NAIVE_PUBLISHED_FORMAT,
};
