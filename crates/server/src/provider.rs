//! The feed page provider.
//!
//! Turns a normalized [`FeedQuery`] into a page envelope: one rendered card
//! per matching post, newest first, plus the continuation link when more
//! pages exist.

use std::sync::Arc;

use feedline_core::cache::feed_signature;
use feedline_core::feed::render_card;
use feedline_core::{Error, FeedEnvelope, FeedQuery, PostStore, Term};

/// Path of the feed endpoint, used to build continuation links.
pub const FEED_PATH: &str = "/feed";

pub struct FeedProvider {
    store: Arc<dyn PostStore>,
}

/// Number of pages for `total` posts, at least one.
pub fn page_max(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    let pages = total.div_ceil(per_page).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

impl FeedProvider {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn PostStore> {
        &self.store
    }

    pub async fn page(&self, query: &FeedQuery) -> Result<FeedEnvelope, Error> {
        let filter = match query.filter() {
            Some(filter) if self.store.taxonomy_exists(&filter.taxonomy).await? => Some(filter),
            Some(filter) => {
                tracing::debug!(taxonomy = %filter.taxonomy, "unknown taxonomy; dropping term filter");
                None
            }
            None => None,
        };

        let result = self.store.query_posts(filter.as_ref(), query.page, query.per_page).await?;
        let page_max = page_max(result.total, query.per_page);
        let cards: Vec<String> = result.posts.iter().map(render_card).collect();
        let next = (query.page < page_max)
            .then(|| format!("{FEED_PATH}?{}", query.with_page(query.page + 1).to_query_string()));

        tracing::debug!(
            taxonomy = %query.taxonomy,
            page = query.page,
            page_max,
            cards = cards.len(),
            "served feed page"
        );

        Ok(FeedEnvelope::page(cards, query.page, page_max, next))
    }

    /// Signature of the term's current feed state.
    pub async fn signature(&self, term: &Term) -> Result<String, Error> {
        let newest = self.store.newest_in_term(term.id).await?;
        Ok(feed_signature(term.id, newest.as_ref().map(|s| (s.post_id, s.modified_at.as_str()))))
    }
}
