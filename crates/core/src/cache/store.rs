//! Durable bucket storage.
//!
//! Storage is a flat string key/value space, one key per cache key,
//! namespaced with a format prefix so a layout change never reads an older
//! shape. Values are the JSON-serialised [`Bucket`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use super::bucket::Bucket;
use crate::Error;

/// Namespace prefix of every stored bucket. Bump when the layout changes.
pub const STORAGE_PREFIX: &str = "feedline:v1:";

const PROBE_KEY: &str = "feedline:probe";

/// Storage key for a cache key.
pub fn storage_key(cache_key: &str) -> String {
    format!("{STORAGE_PREFIX}{cache_key}")
}

/// String key/value storage that outlives a loader.
#[async_trait]
pub trait BucketStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, Error>;

    async fn write(&self, key: &str, value: &str) -> Result<(), Error>;

    async fn remove(&self, key: &str) -> Result<(), Error>;

    /// Check the store accepts writes by writing and removing a probe key.
    async fn probe(&self) -> Result<(), Error> {
        self.write(PROBE_KEY, "1").await?;
        self.remove(PROBE_KEY).await
    }
}

/// Read and decode the bucket stored under `cache_key`.
///
/// A value that no longer decodes is treated as absent.
pub async fn read_bucket<V: DeserializeOwned>(
    store: &dyn BucketStore, cache_key: &str,
) -> Result<Option<Bucket<V>>, Error> {
    let Some(raw) = store.read(&storage_key(cache_key)).await? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(bucket) => Ok(Some(bucket)),
        Err(e) => {
            tracing::debug!(cache_key, error = %e, "discarding undecodable bucket");
            Ok(None)
        }
    }
}

/// Serialise the whole bucket back under `cache_key`.
pub async fn write_bucket<V: Serialize + Sync>(
    store: &dyn BucketStore, cache_key: &str, bucket: &Bucket<V>,
) -> Result<(), Error> {
    let raw = serde_json::to_string(bucket)?;
    store.write(&storage_key(cache_key), &raw).await
}

/// Process-local store, used for tests and as a stand-in when no database
/// is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    read_only: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write, like a browser in privacy mode.
    pub fn read_only() -> Self {
        Self { entries: RwLock::default(), read_only: AtomicBool::new(true) }
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl BucketStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), Error> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(Error::StorageUnavailable("store is read-only".into()));
        }
        self.entries.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Error> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(Error::StorageUnavailable("store is read-only".into()));
        }
        self.entries.write().await.remove(key);
        Ok(())
    }
}
