//! The incremental feed loader.
//!
//! Appends the pages behind the host page's sentinel one at a time, in the
//! order the server declares through each page's `next` link. Pages are
//! resolved through two tiers: an in-memory [`Coalescer`] that keeps one
//! shared future per URL, and a [`PersistedCache`] bucket that survives the
//! loader. After each applied page the following one is prefetched into both
//! tiers without being applied.

mod state;

use std::sync::Arc;

use feedline_core::cache::{BucketStore, CachePolicy};
use feedline_core::FeedEnvelope;
use reqwest::Url;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

pub use self::state::{LABEL_LOAD_MORE, LABEL_LOADING, LABEL_TRY_AGAIN, LoaderState, RetryControl};
use self::state::LiveView;
use crate::cache::{Coalescer, PersistedCache};
use crate::fetch::{FetchError, PageSource, resolve};
use crate::host::{HostPage, Sentinel};

/// Everything the loader reads from the host page once, at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    /// The page the sentinel lives on.
    pub page_url: Url,
    pub next_url: Option<Url>,
    pub signature: String,
    pub cache_key: String,
    pub policy: CachePolicy,
    pub nonce: Option<String>,
}

impl LoaderConfig {
    /// Build from sentinel metadata, resolving `data-next` against `page_url`.
    pub fn from_sentinel(page_url: Url, sentinel: &Sentinel) -> Self {
        let next_url = sentinel.next.as_deref().and_then(|href| match resolve(&page_url, href) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(href, error = %e, "ignoring unusable sentinel next url");
                None
            }
        });

        Self {
            page_url,
            next_url,
            signature: sentinel.signature.clone(),
            cache_key: sentinel.cache_key.clone(),
            policy: CachePolicy::new(sentinel.cache_ttl, sentinel.cache_limit),
            nonce: sentinel.nonce.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Whether the host reports sentinel intersections. Without it the
    /// loader is permanently manual.
    pub observer_supported: bool,
    /// Resolve the next page right after applying one.
    pub prefetch: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self { observer_supported: true, prefetch: true }
    }
}

struct Inner {
    source: Arc<dyn PageSource>,
    nonce: Option<String>,
    options: LoaderOptions,
    memo: Coalescer<String, Arc<FeedEnvelope>, FetchError>,
    cache: Mutex<PersistedCache>,
    view: Mutex<LiveView>,
    prefetch: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    /// Persisted tier first, then the network. Successful fetches are
    /// written through; failures purge the URL.
    async fn load(&self, url: Url) -> Result<Arc<FeedEnvelope>, FetchError> {
        let key = url.as_str();

        if let Some(page) = self.cache.lock().await.get(key).await {
            tracing::debug!(url = key, "persisted cache hit");
            return Ok(Arc::new(page));
        }

        let fetched = self.source.fetch_page(&url, self.nonce.as_deref()).await.and_then(|page| match page.error {
            Some(error) => Err(FetchError::Rejected(error)),
            None => Ok(page),
        });

        match fetched {
            Ok(page) => {
                self.cache.lock().await.store(key, page.clone()).await;
                Ok(Arc::new(page))
            }
            Err(e) => {
                self.cache.lock().await.drop_entry(key).await;
                Err(e)
            }
        }
    }
}

/// Handle to a running loader. Clones share the same feed.
#[derive(Clone)]
pub struct FeedLoader {
    inner: Arc<Inner>,
}

impl FeedLoader {
    /// Create a loader over a host page's initial cards.
    ///
    /// `store` is the durable tier; `None` (or a store failing its probe)
    /// keeps the loader memory-only.
    pub async fn new(
        config: LoaderConfig, initial_cards: Vec<String>, source: Arc<dyn PageSource>,
        store: Option<Arc<dyn BucketStore>>, options: LoaderOptions,
    ) -> Self {
        let cache = PersistedCache::open(store, &config.cache_key, &config.signature, config.policy).await;
        let view = LiveView::new(initial_cards, config.next_url, !options.observer_supported);

        tracing::info!(
            page = %config.page_url,
            cache_key = %config.cache_key,
            signature = %config.signature,
            persistent = cache.is_persistent(),
            state = %view.state,
            "feed loader ready"
        );

        Self {
            inner: Arc::new(Inner {
                source,
                nonce: config.nonce,
                options,
                memo: Coalescer::new(),
                cache: Mutex::new(cache),
                view: Mutex::new(view),
                prefetch: Mutex::new(None),
            }),
        }
    }

    /// Create a loader from host page markup. A page without a sentinel
    /// yields a loader that is already complete.
    pub async fn from_host_page(
        page_url: Url, html: &str, source: Arc<dyn PageSource>, store: Option<Arc<dyn BucketStore>>,
        options: LoaderOptions,
    ) -> Self {
        let page = HostPage::parse(html);
        if !page.has_feed_root {
            tracing::warn!(page = %page_url, "host page has no feed root");
        }

        let config = match &page.sentinel {
            Some(sentinel) => LoaderConfig::from_sentinel(page_url, sentinel),
            None => LoaderConfig {
                page_url,
                next_url: None,
                signature: String::new(),
                cache_key: String::new(),
                policy: CachePolicy::default(),
                nonce: None,
            },
        };

        Self::new(config, page.cards, source, store, options).await
    }

    /// Resolve `url` through both cache tiers, fetching at most once per
    /// loader unless a previous attempt failed.
    pub async fn resolve(&self, url: &Url) -> Result<Arc<FeedEnvelope>, FetchError> {
        let inner = Arc::clone(&self.inner);
        let target = url.clone();
        self.inner.memo.run(url.as_str().to_string(), move || async move { inner.load(target).await }).await
    }

    /// The sentinel scrolled into view.
    ///
    /// Ignored in manual mode and while an error awaits a retry.
    pub async fn on_intersect(&self) -> LoaderState {
        {
            let view = self.inner.view.lock().await;
            if view.manual || view.state != LoaderState::Idle {
                return view.state;
            }
        }
        self.advance(false).await
    }

    /// The retry control was activated.
    pub async fn retry(&self) -> LoaderState {
        {
            let view = self.inner.view.lock().await;
            let honoured = match view.state {
                LoaderState::Error => true,
                LoaderState::Idle => view.manual,
                LoaderState::Loading | LoaderState::Complete => false,
            };
            if !honoured {
                return view.state;
            }
        }
        self.advance(true).await
    }

    pub async fn state(&self) -> LoaderState {
        self.inner.view.lock().await.state
    }

    /// Every card in the live feed, initial cards first.
    pub async fn cards(&self) -> Vec<String> {
        self.inner.view.lock().await.cards.clone()
    }

    /// Where the sentinel points; `None` once complete.
    pub async fn next_url(&self) -> Option<Url> {
        self.inner.view.lock().await.next.clone()
    }

    pub async fn retry_control(&self) -> RetryControl {
        self.inner.view.lock().await.retry_control()
    }

    /// Whether pages are written to durable storage.
    pub async fn is_persistent(&self) -> bool {
        self.inner.cache.lock().await.is_persistent()
    }

    /// Wait for the most recently started prefetch, if any.
    pub async fn wait_prefetch(&self) {
        let handle = self.inner.prefetch.lock().await.take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "prefetch task failed");
        }
    }

    async fn advance(&self, manual_retry: bool) -> LoaderState {
        let next = {
            let mut view = self.inner.view.lock().await;
            if matches!(view.state, LoaderState::Loading | LoaderState::Complete) {
                return view.state;
            }
            let Some(next) = view.next.clone() else {
                view.complete();
                return view.state;
            };
            if manual_retry && view.state == LoaderState::Error {
                view.recovering = true;
            }
            view.state = LoaderState::Loading;
            next
        };

        tracing::info!(url = %next, "loading next page");

        match self.resolve(&next).await {
            Ok(page) => {
                tokio::task::yield_now().await;
                self.apply(&next, &page).await
            }
            Err(e) => {
                tracing::warn!(url = %next, error = %e, "feed page failed; waiting for retry");
                let mut view = self.inner.view.lock().await;
                view.state = LoaderState::Error;
                view.state
            }
        }
    }

    async fn apply(&self, fetched: &Url, page: &FeedEnvelope) -> LoaderState {
        let continuation = page.next.as_deref().and_then(|href| match resolve(fetched, href) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(href, error = %e, "unusable continuation; treating feed as complete");
                None
            }
        });

        let prefetch = {
            let mut view = self.inner.view.lock().await;
            if page.cards.is_empty() && !page.content.is_empty() {
                view.cards.push(page.content.clone());
            } else {
                view.cards.extend(page.cards.iter().cloned());
            }

            match continuation {
                None => {
                    view.complete();
                    tracing::info!(paged = page.paged, cards = view.cards.len(), "feed complete");
                    None
                }
                Some(next) => {
                    view.next = Some(next.clone());
                    view.state = LoaderState::Idle;
                    view.recovering = false;
                    tracing::info!(paged = page.paged, page_max = page.page_max, next = %next, "applied feed page");
                    Some(next)
                }
            }
        };

        let state = self.state().await;
        if let Some(next) = prefetch
            && self.inner.options.prefetch
        {
            self.spawn_prefetch(next).await;
        }
        state
    }

    async fn spawn_prefetch(&self, url: Url) {
        let loader = self.clone();
        let handle = tokio::spawn(async move {
            match loader.resolve(&url).await {
                Ok(_) => tracing::debug!(url = %url, "prefetched feed page"),
                Err(e) => tracing::debug!(url = %url, error = %e, "prefetch failed"),
            }
        });

        if let Some(previous) = self.inner.prefetch.lock().await.replace(handle)
            && !previous.is_finished()
        {
            tracing::debug!("previous prefetch still running");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use feedline_core::cache::{Bucket, MemoryStore, read_bucket};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    const BASE: &str = "https://blog.test/category/news/";

    fn url(n: u32) -> Url {
        Url::parse(&format!("https://blog.test/feed?page_next={n}")).unwrap()
    }

    fn card(n: u32) -> String {
        format!(r#"<article class="feed-card" data-post-id="{n}">post {n}</article>"#)
    }

    fn page(n: u32, last: u32) -> FeedEnvelope {
        let next = (n < last).then(|| format!("/feed?page_next={}", n + 1));
        FeedEnvelope::page(vec![card(n)], n, last, next)
    }

    /// Serves pages 2..=last and records every request.
    struct ScriptedSource {
        pages: HashMap<String, FeedEnvelope>,
        fail_once: StdMutex<HashSet<String>>,
        calls: StdMutex<Vec<String>>,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new(last: u32) -> Arc<Self> {
            Self::with(last, &[], Duration::ZERO)
        }

        fn with(last: u32, fail_once: &[u32], delay: Duration) -> Arc<Self> {
            let pages = (2..=last).map(|n| (url(n).to_string(), page(n, last))).collect();
            let fail_once = fail_once.iter().map(|n| url(*n).to_string()).collect();
            Arc::new(Self { pages, fail_once: StdMutex::new(fail_once), calls: StdMutex::new(Vec::new()), delay })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, n: u32) -> usize {
            let target = url(n).to_string();
            self.calls().iter().filter(|c| **c == target).count()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn fetch_page(&self, url: &Url, nonce: Option<&str>) -> Result<FeedEnvelope, FetchError> {
            assert_eq!(nonce, Some("n0nce"));
            self.calls.lock().unwrap().push(url.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail_once.lock().unwrap().remove(url.as_str()) {
                return Err(FetchError::HttpError { status: 503 });
            }
            self.pages.get(url.as_str()).cloned().ok_or(FetchError::HttpError { status: 404 })
        }
    }

    fn config(signature: &str, policy: CachePolicy) -> LoaderConfig {
        LoaderConfig {
            page_url: Url::parse(BASE).unwrap(),
            next_url: Some(url(2)),
            signature: signature.into(),
            cache_key: "category-4".into(),
            policy,
            nonce: Some("n0nce".into()),
        }
    }

    fn policy() -> CachePolicy {
        CachePolicy::new(Duration::from_secs(60), 6)
    }

    fn no_prefetch() -> LoaderOptions {
        LoaderOptions { prefetch: false, ..Default::default() }
    }

    async fn loader(source: Arc<ScriptedSource>, store: Option<Arc<MemoryStore>>, options: LoaderOptions) -> FeedLoader {
        let store = store.map(|s| s as Arc<dyn BucketStore>);
        FeedLoader::new(config("sig", policy()), vec![card(1)], source, store, options).await
    }

    #[tokio::test]
    async fn test_pages_applied_in_server_order() {
        let source = ScriptedSource::new(4);
        let loader = loader(source.clone(), None, LoaderOptions::default()).await;

        assert_eq!(loader.on_intersect().await, LoaderState::Idle);
        loader.wait_prefetch().await;
        assert_eq!(source.calls(), vec![url(2).to_string(), url(3).to_string()]);
        assert_eq!(loader.cards().await, vec![card(1), card(2)]);
        assert_eq!(loader.next_url().await, Some(url(3)));

        // page 3 was prefetched but only appears once triggered
        assert_eq!(loader.on_intersect().await, LoaderState::Idle);
        loader.wait_prefetch().await;
        assert_eq!(loader.cards().await, vec![card(1), card(2), card(3)]);
        assert_eq!(source.count(3), 1);

        assert_eq!(loader.on_intersect().await, LoaderState::Complete);
        assert_eq!(loader.cards().await, vec![card(1), card(2), card(3), card(4)]);
        assert_eq!(source.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_is_terminal() {
        let source = ScriptedSource::new(2);
        let loader = loader(source.clone(), None, LoaderOptions::default()).await;

        assert_eq!(loader.on_intersect().await, LoaderState::Complete);
        assert_eq!(loader.next_url().await, None);
        assert!(!loader.retry_control().await.visible);

        assert_eq!(loader.on_intersect().await, LoaderState::Complete);
        assert_eq!(loader.retry().await, LoaderState::Complete);
        assert_eq!(source.calls().len(), 1);
        assert_eq!(loader.cards().await.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_fetch() {
        let source = ScriptedSource::with(4, &[], Duration::from_millis(20));
        let loader = loader(source.clone(), None, no_prefetch()).await;

        let u3 = url(3);
        let (a, b) = tokio::join!(loader.resolve(&u3), loader.resolve(&u3));
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(source.count(3), 1);

        let again = loader.resolve(&url(3)).await.unwrap();
        assert_eq!(*again, page(3, 4));
        assert_eq!(source.count(3), 1);
    }

    #[tokio::test]
    async fn test_failure_enters_error_until_retry() {
        let source = ScriptedSource::with(4, &[2], Duration::ZERO);
        let loader = loader(source.clone(), None, no_prefetch()).await;

        assert_eq!(loader.on_intersect().await, LoaderState::Error);
        assert_eq!(loader.retry_control().await, RetryControl { visible: true, enabled: true, label: LABEL_TRY_AGAIN });
        assert_eq!(loader.cards().await, vec![card(1)]);

        // no automatic retry from intersections
        assert_eq!(loader.on_intersect().await, LoaderState::Error);
        assert_eq!(source.count(2), 1);

        assert_eq!(loader.retry().await, LoaderState::Idle);
        assert_eq!(source.count(2), 2);
        assert_eq!(loader.cards().await, vec![card(1), card(2)]);
        assert!(!loader.retry_control().await.visible);
    }

    #[tokio::test]
    async fn test_failed_prefetch_is_retried_by_trigger() {
        let source = ScriptedSource::with(4, &[3], Duration::ZERO);
        let loader = loader(source.clone(), None, LoaderOptions::default()).await;

        loader.on_intersect().await;
        loader.wait_prefetch().await;
        assert_eq!(loader.state().await, LoaderState::Idle);
        assert_eq!(source.count(3), 1);

        assert_eq!(loader.on_intersect().await, LoaderState::Idle);
        assert_eq!(source.count(3), 2);
        assert_eq!(loader.cards().await.last(), Some(&card(3)));
    }

    #[tokio::test]
    async fn test_manual_mode() {
        let source = ScriptedSource::new(3);
        let options = LoaderOptions { observer_supported: false, prefetch: false };
        let loader = loader(source.clone(), None, options).await;

        assert_eq!(loader.retry_control().await, RetryControl { visible: true, enabled: true, label: LABEL_LOAD_MORE });
        assert_eq!(loader.on_intersect().await, LoaderState::Idle);
        assert!(source.calls().is_empty());

        assert_eq!(loader.retry().await, LoaderState::Idle);
        assert_eq!(loader.cards().await, vec![card(1), card(2)]);
        assert_eq!(loader.retry().await, LoaderState::Complete);
        assert!(!loader.retry_control().await.visible);
    }

    #[tokio::test]
    async fn test_rejected_envelope_is_failure() {
        struct Rejecting;

        #[async_trait]
        impl PageSource for Rejecting {
            async fn fetch_page(&self, _url: &Url, _nonce: Option<&str>) -> Result<FeedEnvelope, FetchError> {
                Ok(FeedEnvelope::rejected(2, "invalid nonce"))
            }
        }

        let store = Arc::new(MemoryStore::new());
        let loader = FeedLoader::new(
            config("sig", policy()),
            vec![card(1)],
            Arc::new(Rejecting),
            Some(store.clone() as Arc<dyn BucketStore>),
            no_prefetch(),
        )
        .await;

        assert_eq!(loader.on_intersect().await, LoaderState::Error);
        assert_eq!(loader.next_url().await, Some(url(2)));
        let bucket: Option<Bucket<FeedEnvelope>> = read_bucket(store.as_ref(), "category-4").await.unwrap();
        assert!(bucket.is_none_or(|b| !b.contains(url(2).as_str())));
    }

    #[tokio::test]
    async fn test_persisted_pages_skip_network() {
        let store = Arc::new(MemoryStore::new());
        let first = ScriptedSource::new(4);
        let loader_a = loader(first.clone(), Some(store.clone()), no_prefetch()).await;
        assert!(loader_a.is_persistent().await);
        loader_a.on_intersect().await;
        assert_eq!(first.count(2), 1);

        let second = ScriptedSource::new(4);
        let loader_b = loader(second.clone(), Some(store.clone()), no_prefetch()).await;
        assert_eq!(loader_b.on_intersect().await, LoaderState::Idle);
        assert!(second.calls().is_empty());
        assert_eq!(loader_b.cards().await, vec![card(1), card(2)]);
    }

    #[tokio::test]
    async fn test_signature_change_invalidates_bucket() {
        let store = Arc::new(MemoryStore::new());
        let first = ScriptedSource::new(4);
        let dyn_store = store.clone() as Arc<dyn BucketStore>;
        let loader_a = FeedLoader::new(config("s1", policy()), vec![], first, Some(dyn_store.clone()), no_prefetch()).await;
        loader_a.on_intersect().await;
        loader_a.on_intersect().await;

        let second = ScriptedSource::new(4);
        let loader_b = FeedLoader::new(config("s2", policy()), vec![], second.clone(), Some(dyn_store), no_prefetch()).await;
        loader_b.on_intersect().await;
        loader_b.on_intersect().await;
        assert_eq!(second.calls(), vec![url(2).to_string(), url(3).to_string()]);

        let bucket: Bucket<FeedEnvelope> = read_bucket(store.as_ref(), "category-4").await.unwrap().unwrap();
        assert_eq!(bucket.signature, "s2");
    }

    #[tokio::test]
    async fn test_bounded_bucket_and_ttl_refetch() {
        let store = Arc::new(MemoryStore::new());
        let short = CachePolicy::new(Duration::from_millis(1000), 2);
        let dyn_store = store.clone() as Arc<dyn BucketStore>;

        let first = ScriptedSource::new(9);
        let loader_a = FeedLoader::new(config("sig", short), vec![], first, Some(dyn_store.clone()), no_prefetch()).await;
        for n in 2..=4 {
            loader_a.resolve(&url(n)).await.unwrap();
        }
        let bucket: Bucket<FeedEnvelope> = read_bucket(store.as_ref(), "category-4").await.unwrap().unwrap();
        assert_eq!(bucket.order, vec![url(3).to_string(), url(4).to_string()]);

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let second = ScriptedSource::new(9);
        let loader_b = FeedLoader::new(config("sig", short), vec![], second.clone(), Some(dyn_store), no_prefetch()).await;
        loader_b.resolve(&url(3)).await.unwrap();
        assert_eq!(second.count(3), 1);
    }

    #[tokio::test]
    async fn test_storage_unavailable_falls_back_to_memory() {
        let store = Arc::new(MemoryStore::read_only());
        let source = ScriptedSource::new(4);
        let loader = loader(source.clone(), Some(store.clone()), LoaderOptions::default()).await;
        assert!(!loader.is_persistent().await);

        assert_eq!(loader.on_intersect().await, LoaderState::Idle);
        loader.wait_prefetch().await;
        assert_eq!(loader.on_intersect().await, LoaderState::Idle);
        assert_eq!(source.count(3), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_unusable_continuation_completes() {
        struct OddNext;

        #[async_trait]
        impl PageSource for OddNext {
            async fn fetch_page(&self, _url: &Url, _nonce: Option<&str>) -> Result<FeedEnvelope, FetchError> {
                Ok(FeedEnvelope::page(vec![card(2)], 2, 3, Some("mailto:nobody@blog.test".into())))
            }
        }

        let loader = FeedLoader::new(config("sig", policy()), vec![], Arc::new(OddNext), None, no_prefetch()).await;
        assert_eq!(loader.on_intersect().await, LoaderState::Complete);
        assert_eq!(loader.cards().await, vec![card(2)]);
    }

    #[tokio::test]
    async fn test_from_host_page() {
        let html = r#"
            <html><body><main class="archive-root">
              <div class="feed-root">
                <article class="feed-card" data-post-id="1">post 1</article>
              </div>
              <div class="feed-sentinel" data-next="/feed?page_next=2" data-feed-signature="sig"
                   data-cache-key="category-4" data-cache-ttl="1000" data-cache-limit="2" data-nonce="n0nce">
                <button class="feed-retry">Load more</button>
              </div>
            </main></body></html>
        "#;

        let source = ScriptedSource::new(2);
        let loader =
            FeedLoader::from_host_page(Url::parse(BASE).unwrap(), html, source.clone(), None, no_prefetch()).await;
        assert_eq!(loader.next_url().await, Some(url(2)));
        assert_eq!(loader.cards().await.len(), 1);

        assert_eq!(loader.on_intersect().await, LoaderState::Complete);
        assert_eq!(loader.cards().await.len(), 2);
    }

    #[tokio::test]
    async fn test_host_page_without_sentinel_is_complete() {
        let html = r#"<html><body><div class="feed-root"><article>only</article></div></body></html>"#;
        let source = ScriptedSource::new(2);
        let loader =
            FeedLoader::from_host_page(Url::parse(BASE).unwrap(), html, source.clone(), None, no_prefetch()).await;

        assert_eq!(loader.state().await, LoaderState::Complete);
        assert_eq!(loader.on_intersect().await, LoaderState::Complete);
        assert!(source.calls().is_empty());
    }

    #[test]
    fn test_config_from_sentinel() {
        let sentinel = Sentinel {
            next: Some("page/2/".into()),
            signature: "sig".into(),
            cache_key: "category-4".into(),
            cache_ttl: Duration::from_millis(1000),
            cache_limit: 2,
            nonce: None,
            has_retry_control: false,
        };
        let config = LoaderConfig::from_sentinel(Url::parse(BASE).unwrap(), &sentinel);
        assert_eq!(config.next_url.unwrap().as_str(), "https://blog.test/category/news/page/2/");
        assert_eq!(config.policy, CachePolicy::new(Duration::from_millis(1000), 2));
    }
}
