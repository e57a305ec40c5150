//! Request coalescing.
//!
//! One shared future per key: the first caller starts the work, every
//! concurrent or later caller awaits the same future and observes the same
//! value or the same error.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

pub type SharedResult<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

/// Memoizes in-flight and settled results by key for the owner's lifetime.
pub struct Coalescer<K, V, E> {
    entries: Mutex<HashMap<K, SharedResult<V, E>>>,
}

impl<K, V, E> Default for Coalescer<K, V, E> {
    fn default() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }
}

impl<K, V, E> Coalescer<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the memoized future for `key`, or store the one produced by
    /// `start` before anyone awaits it.
    pub async fn get_or_start<F, Fut>(&self, key: K, start: F) -> SharedResult<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let mut entries = self.entries.lock().await;
        if let Some(existing) = entries.get(&key) {
            return existing.clone();
        }

        let shared = start().boxed().shared();
        entries.insert(key, shared.clone());
        shared
    }

    /// Resolve `key` through the memo, forgetting it again on failure so a
    /// later call can retry.
    pub async fn run<F, Fut>(&self, key: K, start: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let shared = self.get_or_start(key.clone(), start).await;
        let result = shared.clone().await;
        if result.is_err() {
            self.forget_if_same(&key, &shared).await;
        }
        result
    }

    pub async fn contains(&self, key: &K) -> bool {
        self.entries.lock().await.contains_key(key)
    }

    pub async fn forget(&self, key: &K) {
        self.entries.lock().await.remove(key);
    }

    /// Remove `key` only if it still maps to `shared`.
    async fn forget_if_same(&self, key: &K, shared: &SharedResult<V, E>) {
        let mut entries = self.entries.lock().await;
        if entries.get(key).is_some_and(|current| current.ptr_eq(shared)) {
            entries.remove(key);
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
