//! Bounded, TTL-checked page bucket.
//!
//! A bucket is the persisted unit of the loader cache: one per cache key,
//! tagged with the feed signature it was filled under. Entries are kept in
//! insertion order and evicted first-in first-out once the bucket exceeds
//! its limit. Staleness is checked lazily on read.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CACHE_LIMIT, DEFAULT_CACHE_TTL_MS};

/// TTL and capacity applied to a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl: Duration,
    pub limit: usize,
}

impl CachePolicy {
    pub fn new(ttl: Duration, limit: usize) -> Self {
        Self { ttl, limit: limit.max(1) }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_CACHE_TTL_MS), DEFAULT_CACHE_LIMIT)
    }
}

/// A cached value and the time it was fetched (unix milliseconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<V> {
    pub value: V,
    #[serde(rename = "fetchedAt")]
    pub fetched_at: i64,
}

impl<V> Entry<V> {
    /// Whether the entry is older than `ttl` at `now`.
    pub fn is_stale(&self, now: i64, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now.saturating_sub(self.fetched_at) > ttl_ms
    }
}

/// Outcome of a bucket read.
#[derive(Debug, PartialEq)]
pub enum Lookup<'a, V> {
    Hit(&'a Entry<V>),
    /// The entry existed but was stale and has been removed.
    Expired,
    Miss,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket<V> {
    pub signature: String,
    /// Unix milliseconds of the last mutation.
    pub updated_at: i64,
    /// URLs oldest to newest.
    pub order: Vec<String>,
    pub pages: HashMap<String, Entry<V>>,
}

impl<V> Bucket<V> {
    pub fn new(signature: impl Into<String>, now: i64) -> Self {
        Self { signature: signature.into(), updated_at: now, order: Vec::new(), pages: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.pages.contains_key(url)
    }

    /// Read an entry, dropping it if stale.
    ///
    /// A hit does not change the entry's position in `order`.
    pub fn get(&mut self, url: &str, now: i64, ttl: Duration) -> Lookup<'_, V> {
        let stale = match self.pages.get(url) {
            None => return Lookup::Miss,
            Some(entry) => entry.is_stale(now, ttl),
        };

        if stale {
            self.remove(url, now);
            return Lookup::Expired;
        }

        match self.pages.get(url) {
            Some(entry) => Lookup::Hit(entry),
            None => Lookup::Miss,
        }
    }

    /// Write an entry at the back of `order`, then evict from the front
    /// until the bucket is within `limit`.
    ///
    /// Returns the evicted URLs, oldest first.
    pub fn insert(&mut self, url: impl Into<String>, value: V, now: i64, limit: usize) -> Vec<String> {
        let url = url.into();
        self.order.retain(|u| u != &url);
        self.order.push(url.clone());
        self.pages.insert(url, Entry { value, fetched_at: now });
        self.updated_at = now;

        let mut evicted = Vec::new();
        while self.order.len() > limit.max(1) {
            let oldest = self.order.remove(0);
            self.pages.remove(&oldest);
            evicted.push(oldest);
        }
        evicted
    }

    /// Remove an entry. Returns whether anything was removed.
    pub fn remove(&mut self, url: &str, now: i64) -> bool {
        let before = self.order.len();
        self.order.retain(|u| u != url);
        let removed = self.pages.remove(url).is_some() || before != self.order.len();
        if removed {
            self.updated_at = now;
        }
        removed
    }

    /// Re-establish the `order`/`pages` invariants after decoding a bucket
    /// written by someone else: duplicates and orphans are dropped and the
    /// oldest entries trimmed to `limit`.
    pub fn repair(&mut self, limit: usize) {
        let mut seen = std::collections::HashSet::new();
        self.order.retain(|u| seen.insert(u.clone()));
        self.order.retain(|u| self.pages.contains_key(u));
        let keep: std::collections::HashSet<&String> = self.order.iter().collect();
        self.pages.retain(|k, _| keep.contains(k));

        while self.order.len() > limit.max(1) {
            let oldest = self.order.remove(0);
            self.pages.remove(&oldest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(1000);

    fn urls(bucket: &Bucket<String>) -> Vec<&str> {
        bucket.order.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_insert_and_hit() {
        let mut bucket = Bucket::new("sig", 0);
        bucket.insert("/p/2", "two".to_string(), 100, 6);

        match bucket.get("/p/2", 200, TTL) {
            Lookup::Hit(entry) => assert_eq!(entry.value, "two"),
            other => panic!("expected hit, got {other:?}"),
        }
        assert_eq!(bucket.get("/p/3", 200, TTL), Lookup::Miss);
    }

    #[test]
    fn test_bounded_size_evicts_oldest_first() {
        let mut bucket = Bucket::new("sig", 0);
        let limit = 3;
        let mut evicted = Vec::new();
        for (i, url) in ["/a", "/b", "/c", "/d", "/e"].iter().enumerate() {
            evicted.extend(bucket.insert(*url, url.to_string(), i as i64, limit));
        }

        assert_eq!(bucket.len(), limit);
        assert_eq!(urls(&bucket), vec!["/c", "/d", "/e"]);
        assert_eq!(evicted, vec!["/a".to_string(), "/b".to_string()]);
        assert_eq!(bucket.pages.len(), limit);
    }

    #[test]
    fn test_reinsert_moves_to_back_without_duplicates() {
        let mut bucket = Bucket::new("sig", 0);
        bucket.insert("/a", "a1".to_string(), 1, 3);
        bucket.insert("/b", "b".to_string(), 2, 3);
        bucket.insert("/a", "a2".to_string(), 3, 3);

        assert_eq!(urls(&bucket), vec!["/b", "/a"]);
        assert_eq!(bucket.pages["/a"].value, "a2");

        bucket.insert("/c", "c".to_string(), 4, 2);
        assert_eq!(urls(&bucket), vec!["/a", "/c"]);
    }

    #[test]
    fn test_hit_does_not_bump_recency() {
        let mut bucket = Bucket::new("sig", 0);
        bucket.insert("/a", "a".to_string(), 1, 2);
        bucket.insert("/b", "b".to_string(), 2, 2);
        assert!(matches!(bucket.get("/a", 3, TTL), Lookup::Hit(_)));

        bucket.insert("/c", "c".to_string(), 4, 2);
        assert_eq!(urls(&bucket), vec!["/b", "/c"]);
    }

    #[test]
    fn test_ttl_expiry_removes_on_read() {
        let mut bucket = Bucket::new("sig", 0);
        let now = 10_000;
        bucket.insert("/a", "a".to_string(), now - 1001, 6);
        bucket.insert("/b", "b".to_string(), now - 1000, 6);

        assert_eq!(bucket.get("/a", now, TTL), Lookup::Expired);
        assert!(!bucket.contains("/a"));
        assert_eq!(urls(&bucket), vec!["/b"]);

        // exactly ttl old is still fresh
        assert!(matches!(bucket.get("/b", now, TTL), Lookup::Hit(_)));
    }

    #[test]
    fn test_remove() {
        let mut bucket = Bucket::new("sig", 0);
        bucket.insert("/a", "a".to_string(), 1, 6);
        assert!(bucket.remove("/a", 5));
        assert!(!bucket.remove("/a", 6));
        assert!(bucket.is_empty());
        assert_eq!(bucket.updated_at, 5);
    }

    #[test]
    fn test_repair_drops_orphans_and_duplicates() {
        let mut bucket: Bucket<String> = Bucket::new("sig", 0);
        bucket.order = vec!["/a".into(), "/a".into(), "/ghost".into(), "/b".into(), "/c".into()];
        for url in ["/a", "/b", "/c", "/stray"] {
            bucket.pages.insert(url.into(), Entry { value: url.into(), fetched_at: 0 });
        }

        bucket.repair(2);

        assert_eq!(urls(&bucket), vec!["/b", "/c"]);
        let mut keys: Vec<_> = bucket.pages.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["/b".to_string(), "/c".to_string()]);
    }

    #[test]
    fn test_serialized_layout() {
        let mut bucket = Bucket::new("abc", 0);
        bucket.insert("/a", "a".to_string(), 7, 6);
        let json = serde_json::to_value(&bucket).unwrap();
        assert_eq!(json["signature"], "abc");
        assert_eq!(json["order"][0], "/a");
        assert_eq!(json["pages"]["/a"]["fetchedAt"], 7);
        assert_eq!(json["updated_at"], 7);
    }
}
