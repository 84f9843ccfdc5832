use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379/0")
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Connection establishment timeout in seconds
    #[serde(default = "default_timeout")]
    pub connection_timeout_secs: u64,
    /// Per-command response timeout in seconds
    #[serde(default = "default_timeout")]
    pub response_timeout_secs: u64,
    /// How item identifiers are indexed in the store
    #[serde(default)]
    pub strategy: ResolverStrategy,
    /// Key of the set / sorted set holding item identifiers
    #[serde(default = "default_index_key")]
    pub index_key: String,
    /// Prefix prepended to an identifier to form its record key
    #[serde(default = "default_item_key_prefix")]
    pub item_key_prefix: String,
    /// Maximum concurrent record reads per request
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            connection_timeout_secs: default_timeout(),
            response_timeout_secs: default_timeout(),
            strategy: ResolverStrategy::default(),
            index_key: default_index_key(),
            item_key_prefix: default_item_key_prefix(),
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

impl StoreConfig {
    /// Glob pattern matching every item record key
    pub fn item_key_pattern(&self) -> String {
        format!("{}*", self.item_key_prefix)
    }

    /// Fan-out bound, never below one
    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency.max(1)
    }
}

/// Indexing layout used to find item identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverStrategy {
    /// Unordered set of ids, ordered by publish time after fetching
    Set,
    /// Sorted set scored by publish time, newest first
    #[default]
    SortedSet,
    /// Enumerate record keys by prefix and order by publish time
    PatternScan,
}

impl ResolverStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolverStrategy::Set => "set",
            ResolverStrategy::SortedSet => "sorted_set",
            ResolverStrategy::PatternScan => "pattern_scan",
        }
    }
}

impl fmt::Display for ResolverStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolverStrategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "set" => Ok(ResolverStrategy::Set),
            "sorted_set" | "zset" => Ok(ResolverStrategy::SortedSet),
            "pattern_scan" | "pattern" | "scan" => Ok(ResolverStrategy::PatternScan),
            other => Err(crate::Error::Config(format!(
                "unknown resolver strategy '{}' (expected set, sorted_set or pattern_scan)",
                other
            ))),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_timeout() -> u64 {
    5
}

fn default_index_key() -> String {
    "rss_feed".to_string()
}

fn default_item_key_prefix() -> String {
    "rss:item:".to_string()
}

fn default_fetch_concurrency() -> usize {
    100
}

impl AppConfig {
    /// Load configuration from the default location or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, falling back to defaults if absent.
    /// Environment overrides are applied on top.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Apply `REDIS_URL` and `FEEDPAGE_BIND` from the environment
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("REDIS_URL") {
            if !url.trim().is_empty() {
                self.store.redis_url = url;
            }
        }
        if let Ok(bind) = std::env::var("FEEDPAGE_BIND") {
            if !bind.trim().is_empty() {
                self.server.bind_addr = bind;
            }
        }
    }

    /// Get the configuration file path
    /// Always uses ~/.config/feedpage/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("feedpage")
            .join("config.toml")
    }
}
