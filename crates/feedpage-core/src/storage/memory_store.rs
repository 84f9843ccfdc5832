use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::RwLock;
use std::time::Duration;

use regex::Regex;

use super::FeedStore;
use crate::feed::FieldMap;
use crate::{Error, Result};

#[derive(Default)]
struct Inner {
    sets: HashMap<String, BTreeSet<String>>,
    sorted_sets: HashMap<String, HashMap<String, f64>>,
    hashes: HashMap<String, FieldMap>,
    strings: HashMap<String, String>,
    failing_keys: HashSet<String>,
    delays: HashMap<String, Duration>,
    unavailable: bool,
}

/// In-process store with Redis semantics for the commands the pipeline uses.
///
/// Also supports fault injection: per-key failures, per-key latency, and a
/// whole-store outage switch.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    /// SADD
    pub fn add_to_set(&self, key: &str, member: &str) {
        self.write()
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
    }

    /// ZADD
    pub fn add_scored(&self, key: &str, member: &str, score: f64) {
        self.write()
            .sorted_sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), score);
    }

    /// HSET of every pair
    pub fn put_hash(&self, key: &str, fields: &[(&str, &str)]) {
        let mut inner = self.write();
        let hash = inner.hashes.entry(key.to_string()).or_default();
        for (field, value) in fields {
            hash.insert(field.to_string(), value.to_string());
        }
    }

    /// SET
    pub fn put_string(&self, key: &str, value: &str) {
        self.write()
            .strings
            .insert(key.to_string(), value.to_string());
    }

    /// Make every read touching `key` fail
    pub fn fail_key(&self, key: &str) {
        self.write().failing_keys.insert(key.to_string());
    }

    /// Delay every read touching `key`
    pub fn delay_key(&self, key: &str, delay: Duration) {
        self.write().delays.insert(key.to_string(), delay);
    }

    /// Simulate the whole store going away
    pub fn set_unavailable(&self, unavailable: bool) {
        self.write().unavailable = unavailable;
    }

    /// Check faults for `key`, then sleep for its configured latency
    async fn enter(&self, key: &str) -> Result<()> {
        let delay = {
            let inner = self.read();
            if inner.unavailable {
                return Err(Error::StoreUnavailable("memory store offline".to_string()));
            }
            if inner.failing_keys.contains(key) {
                return Err(Error::Other(format!("injected failure reading '{}'", key)));
            }
            inner.delays.get(key).copied()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl FeedStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        if self.read().unavailable {
            return Err(Error::StoreUnavailable("memory store offline".to_string()));
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        self.enter(key).await?;
        Ok(self
            .read()
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn sorted_set_len(&self, key: &str) -> Result<usize> {
        self.enter(key).await?;
        Ok(self.read().sorted_sets.get(key).map_or(0, HashMap::len))
    }

    async fn sorted_set_rev_range(
        &self,
        key: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<String>> {
        self.enter(key).await?;
        let inner = self.read();
        let Some(zset) = inner.sorted_sets.get(key) else {
            return Ok(Vec::new());
        };

        // Highest score first; equal scores in reverse lexicographic order, as Redis does
        let mut members: Vec<(&String, f64)> = zset.iter().map(|(m, s)| (m, *s)).collect();
        members.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| b.0.cmp(a.0)));

        Ok(members
            .into_iter()
            .skip(start)
            .take((stop + 1).saturating_sub(start))
            .map(|(m, _)| m.clone())
            .collect())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.enter(pattern).await?;
        let matcher = glob_to_regex(pattern)?;
        let inner = self.read();

        let mut keys: Vec<String> = inner
            .sets
            .keys()
            .chain(inner.sorted_sets.keys())
            .chain(inner.hashes.keys())
            .chain(inner.strings.keys())
            .filter(|k| matcher.is_match(k))
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn hash_get_all(&self, key: &str) -> Result<FieldMap> {
        self.enter(key).await?;
        Ok(self.read().hashes.get(key).cloned().unwrap_or_default())
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        for key in keys {
            self.enter(key).await?;
        }
        let inner = self.read();
        Ok(keys.iter().map(|k| inner.strings.get(k).cloned()).collect())
    }
}

/// Translate a Redis glob (`*`, `?`) into an anchored regex
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 2);
    expr.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|e| Error::Other(format!("invalid key pattern '{}': {}", pattern, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rev_range_orders_by_score_desc() {
        let store = MemoryStore::new();
        store.add_scored("z", "a", 1.0);
        store.add_scored("z", "b", 3.0);
        store.add_scored("z", "c", 2.0);

        assert_eq!(store.sorted_set_len("z").await.unwrap(), 3);
        assert_eq!(store.sorted_set_rev_range("z", 0, 1).await.unwrap(), vec!["b", "c"]);
        assert_eq!(store.sorted_set_rev_range("z", 2, 9).await.unwrap(), vec!["a"]);
        assert!(store.sorted_set_rev_range("z", 5, 9).await.unwrap().is_empty());
        assert!(store.sorted_set_rev_range("missing", 0, 9).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_keys_glob() {
        let store = MemoryStore::new();
        store.put_hash("rss:item:1", &[("title", "one")]);
        store.put_hash("rss:item:22", &[("title", "two")]);
        store.put_string("rss.other", "x");

        assert_eq!(
            store.keys("rss:item:*").await.unwrap(),
            vec!["rss:item:1", "rss:item:22"]
        );
        assert_eq!(store.keys("rss:item:?").await.unwrap(), vec!["rss:item:1"]);
        assert_eq!(store.keys("rss.*").await.unwrap(), vec!["rss.other"]);
    }

    #[tokio::test]
    async fn test_absent_hash_is_empty() {
        let store = MemoryStore::new();
        assert!(store.hash_get_all("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_many_keeps_slots() {
        let store = MemoryStore::new();
        store.put_string("a", "1");
        store.put_string("c", "3");

        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(
            store.get_many(&keys).await.unwrap(),
            vec![Some("1".to_string()), None, Some("3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let store = MemoryStore::new();
        store.put_hash("k", &[("title", "t")]);
        store.fail_key("k");
        assert!(store.hash_get_all("k").await.is_err());

        store.set_unavailable(true);
        assert!(store.ping().await.unwrap_err().is_store_unavailable());
        assert!(store.set_members("s").await.unwrap_err().is_store_unavailable());
    }
}
