pub mod assembler;
pub mod config;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod http;
pub mod pager;
pub mod pagination;
pub mod resolver;
pub mod storage;

pub use config::{AppConfig, ResolverStrategy};
pub use error::{Error, Result};
pub use http::HttpServer;
pub use pager::FeedPager;
pub use pagination::{PageRequest, PageResult};
