//! The loader's durable cache tier.
//!
//! Wraps one [`Bucket`] of feed pages, written through to a
//! [`BucketStore`] after every mutation. When no store is given, or the
//! store fails its probe, the tier is disabled and every read misses.

use std::sync::Arc;

use feedline_core::cache::{Bucket, BucketStore, CachePolicy, Lookup, read_bucket, storage_key, write_bucket};
use feedline_core::FeedEnvelope;

/// Current time in unix milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub struct PersistedCache {
    store: Option<Arc<dyn BucketStore>>,
    cache_key: String,
    policy: CachePolicy,
    bucket: Bucket<FeedEnvelope>,
}

impl PersistedCache {
    /// Open the bucket for `cache_key`, discarding it if it was filled
    /// under a different signature.
    pub async fn open(
        store: Option<Arc<dyn BucketStore>>, cache_key: &str, signature: &str, policy: CachePolicy,
    ) -> Self {
        let now = now_ms();
        let mut cache = Self {
            store: None,
            cache_key: cache_key.to_string(),
            policy,
            bucket: Bucket::new(signature, now),
        };

        let Some(store) = store else {
            return cache;
        };
        if cache_key.is_empty() {
            tracing::debug!("sentinel has no cache key; persistence disabled");
            return cache;
        }
        if let Err(e) = store.probe().await {
            tracing::debug!(error = %e, "bucket storage unavailable; using memory only");
            return cache;
        }

        match read_bucket::<FeedEnvelope>(store.as_ref(), cache_key).await {
            Ok(Some(mut stored)) if stored.signature == signature => {
                stored.repair(policy.limit);
                tracing::debug!(cache_key, pages = stored.len(), "loaded persisted bucket");
                cache.bucket = stored;
            }
            Ok(Some(stored)) => {
                tracing::debug!(
                    cache_key,
                    stored = %stored.signature,
                    current = signature,
                    "feed signature changed; discarding bucket"
                );
                if let Err(e) = store.remove(&storage_key(cache_key)).await {
                    tracing::warn!(cache_key, error = %e, "failed to remove stale bucket");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(cache_key, error = %e, "failed to read bucket"),
        }

        cache.store = Some(store);
        cache
    }

    /// Whether entries are written to durable storage.
    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    pub fn bucket(&self) -> &Bucket<FeedEnvelope> {
        &self.bucket
    }

    /// A fresh entry for `url`. Stale entries are dropped and persisted.
    pub async fn get(&mut self, url: &str) -> Option<FeedEnvelope> {
        if !self.is_persistent() {
            return None;
        }

        let (page, expired) = match self.bucket.get(url, now_ms(), self.policy.ttl) {
            Lookup::Hit(entry) => (Some(entry.value.clone()), false),
            Lookup::Expired => (None, true),
            Lookup::Miss => (None, false),
        };

        if expired {
            tracing::debug!(url, "persisted page expired");
            self.persist().await;
        }
        page
    }

    /// Write `page` for `url`, evicting the oldest entries past the limit.
    pub async fn store(&mut self, url: &str, page: FeedEnvelope) {
        if !self.is_persistent() {
            return;
        }

        let evicted = self.bucket.insert(url, page, now_ms(), self.policy.limit);
        if !evicted.is_empty() {
            tracing::debug!(?evicted, "evicted persisted pages");
        }
        self.persist().await;
    }

    /// Remove `url` from the bucket.
    pub async fn drop_entry(&mut self, url: &str) {
        if !self.is_persistent() {
            return;
        }

        if self.bucket.remove(url, now_ms()) {
            self.persist().await;
        }
    }

    async fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = write_bucket(store.as_ref(), &self.cache_key, &self.bucket).await {
            tracing::warn!(cache_key = %self.cache_key, error = %e, "failed to persist bucket");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedline_core::cache::{Entry, MemoryStore};
    use std::time::Duration;

    fn policy() -> CachePolicy {
        CachePolicy::new(Duration::from_millis(1000), 2)
    }

    fn page(n: u32) -> FeedEnvelope {
        FeedEnvelope::page(vec![format!("<article>{n}</article>")], n, 9, Some(format!("/feed?page_next={}", n + 1)))
    }

    fn shared(store: &Arc<MemoryStore>) -> Option<Arc<dyn BucketStore>> {
        Some(store.clone() as Arc<dyn BucketStore>)
    }

    async fn stored(store: &MemoryStore, key: &str) -> Option<Bucket<FeedEnvelope>> {
        read_bucket(store, key).await.unwrap()
    }

    #[tokio::test]
    async fn test_store_then_get() {
        let store = Arc::new(MemoryStore::new());
        let mut cache = PersistedCache::open(shared(&store), "category-4", "sig", policy()).await;
        assert!(cache.is_persistent());

        cache.store("/p/2", page(2)).await;
        assert_eq!(cache.get("/p/2").await, Some(page(2)));
        assert_eq!(stored(&store, "category-4").await.unwrap().order, vec!["/p/2".to_string()]);
    }

    #[tokio::test]
    async fn test_eviction_is_persisted() {
        let store = Arc::new(MemoryStore::new());
        let mut cache = PersistedCache::open(shared(&store), "category-4", "sig", policy()).await;
        for n in 2..=4 {
            cache.store(&format!("/p/{n}"), page(n)).await;
        }

        let bucket = stored(&store, "category-4").await.unwrap();
        assert_eq!(bucket.order, vec!["/p/3".to_string(), "/p/4".to_string()]);
        assert!(!bucket.pages.contains_key("/p/2"));
    }

    #[tokio::test]
    async fn test_reopen_same_signature_keeps_pages() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut cache = PersistedCache::open(shared(&store), "category-4", "sig", policy()).await;
            cache.store("/p/2", page(2)).await;
        }
        let mut cache = PersistedCache::open(shared(&store), "category-4", "sig", policy()).await;
        assert_eq!(cache.get("/p/2").await, Some(page(2)));
    }

    #[tokio::test]
    async fn test_signature_mismatch_discards_bucket() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut cache = PersistedCache::open(shared(&store), "category-4", "s1", policy()).await;
            cache.store("/p/2", page(2)).await;
            cache.store("/p/3", page(3)).await;
        }

        let mut cache = PersistedCache::open(shared(&store), "category-4", "s2", policy()).await;
        assert!(cache.bucket().is_empty());
        assert_eq!(cache.get("/p/2").await, None);
        assert_eq!(cache.get("/p/3").await, None);
        assert!(stored(&store, "category-4").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_removed_on_read() {
        let store = Arc::new(MemoryStore::new());
        let mut bucket = Bucket::new("sig", now_ms());
        bucket.order.push("/p/2".into());
        bucket.pages.insert("/p/2".into(), Entry { value: page(2), fetched_at: now_ms() - 1001 });
        write_bucket(store.as_ref(), "category-4", &bucket).await.unwrap();

        let mut cache = PersistedCache::open(shared(&store), "category-4", "sig", policy()).await;
        assert_eq!(cache.get("/p/2").await, None);
        assert!(stored(&store, "category-4").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drop_entry() {
        let store = Arc::new(MemoryStore::new());
        let mut cache = PersistedCache::open(shared(&store), "category-4", "sig", policy()).await;
        cache.store("/p/2", page(2)).await;
        cache.drop_entry("/p/2").await;
        assert!(stored(&store, "category-4").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_failures_after_open_are_swallowed() {
        let store = Arc::new(MemoryStore::new());
        let mut cache = PersistedCache::open(shared(&store), "category-4", "sig", policy()).await;

        store.set_read_only(true);
        cache.store("/p/2", page(2)).await;
        assert_eq!(cache.get("/p/2").await, Some(page(2)));
        assert!(store.is_empty().await);

        store.set_read_only(false);
        cache.store("/p/3", page(3)).await;
        let bucket = stored(&store, "category-4").await.unwrap();
        assert_eq!(bucket.order, vec!["/p/2".to_string(), "/p/3".to_string()]);
    }

    #[tokio::test]
    async fn test_unavailable_store_is_memory_only() {
        let store = Arc::new(MemoryStore::read_only());
        let mut cache = PersistedCache::open(shared(&store), "category-4", "sig", policy()).await;
        assert!(!cache.is_persistent());

        cache.store("/p/2", page(2)).await;
        assert_eq!(cache.get("/p/2").await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_no_store_or_key() {
        let cache = PersistedCache::open(None, "category-4", "sig", policy()).await;
        assert!(!cache.is_persistent());

        let store = Arc::new(MemoryStore::new());
        let cache = PersistedCache::open(Some(store as Arc<dyn BucketStore>), "", "sig", policy()).await;
        assert!(!cache.is_persistent());
    }
}
