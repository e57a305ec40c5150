//! Post and term models, and the store interface queried by the feed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Status of a post visible to feeds and signatures.
pub const STATUS_PUBLISH: &str = "publish";

/// A stored post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    pub permalink: String,
    pub author: String,
    /// RFC 3339 publication time; feeds order by this, newest first.
    pub published_at: String,
    /// RFC 3339 modification time; part of the term signature.
    pub modified_at: String,
    pub status: String,
}

/// A taxonomy term (a category, a tag, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: i64,
    pub taxonomy: String,
    pub slug: String,
    pub name: String,
}

/// Restricts a query to posts assigned to any of `term_ids` in `taxonomy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermFilter {
    pub taxonomy: String,
    pub term_ids: Vec<i64>,
}

/// One page of posts plus the total number of matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total: u64,
}

/// Identity of the newest published post in a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostStamp {
    pub post_id: i64,
    pub modified_at: String,
}

/// Read access to posts and terms.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Whether `taxonomy` is registered.
    async fn taxonomy_exists(&self, taxonomy: &str) -> Result<bool, Error>;

    /// Published posts matching `filter`, newest first, 1-based `page`.
    async fn query_posts(&self, filter: Option<&TermFilter>, page: u32, per_page: u32) -> Result<PostPage, Error>;

    /// Newest published post assigned to `term_id`.
    async fn newest_in_term(&self, term_id: i64) -> Result<Option<PostStamp>, Error>;

    /// Look a term up by taxonomy and slug.
    async fn term_by_slug(&self, taxonomy: &str, slug: &str) -> Result<Option<Term>, Error>;
}
