//! Feed request parameters and their normalisation.
//!
//! Requests arrive either query-encoded or as a JSON object with the same
//! field names. Numbers may be strings, `category` may be a scalar, a
//! comma-separated list, or an array.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::post::TermFilter;

/// Taxonomy used when a request does not name one.
pub const DEFAULT_TAXONOMY: &str = "category";

/// Action identifier the feed endpoint answers to.
pub const FEED_ACTION: &str = "feed_next_page";

/// Largest page size a request may ask for.
pub const MAX_POSTS_PER_PAGE: u32 = 100;

/// An integer that may arrive as a JSON number or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum IntParam {
    Int(i64),
    Text(String),
}

impl IntParam {
    /// The integer value, or `None` when the text does not parse.
    pub fn value(&self) -> Option<i64> {
        match self {
            IntParam::Int(n) => Some(*n),
            IntParam::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Term ids as a scalar, a comma-separated string, or an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CategoryParam {
    One(i64),
    Many(Vec<IntParam>),
    Text(String),
}

impl CategoryParam {
    /// Positive term ids in order of appearance, without duplicates.
    pub fn term_ids(&self) -> Vec<i64> {
        let raw: Vec<i64> = match self {
            CategoryParam::One(n) => vec![*n],
            CategoryParam::Many(items) => items.iter().filter_map(IntParam::value).collect(),
            CategoryParam::Text(s) => s.split(',').filter_map(|part| part.trim().parse().ok()).collect(),
        };

        let mut ids = Vec::with_capacity(raw.len());
        for id in raw {
            if id > 0 && !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

/// Raw feed request, as sent by the loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FeedParams {
    #[serde(default)]
    pub action: Option<String>,

    /// Anti-forgery token.
    #[serde(default, rename = "_nonce", alias = "nonce")]
    pub nonce: Option<String>,

    /// Requested page, 1-based.
    #[serde(default, alias = "paged")]
    pub page_next: Option<IntParam>,

    #[serde(default)]
    pub posts_per_page: Option<IntParam>,

    /// Taxonomy of the `category` ids.
    #[serde(default)]
    pub entry_tax: Option<String>,

    #[serde(default)]
    pub category: Option<CategoryParam>,
}

/// A feed request after defaults have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub taxonomy: String,
    pub term_ids: Vec<i64>,
    pub page: u32,
    pub per_page: u32,
}

impl FeedParams {
    /// Apply defaults: non-positive or missing page ⇒ 1, non-positive or
    /// missing size ⇒ `default_per_page`, missing taxonomy ⇒ `category`.
    /// The size is capped at [`MAX_POSTS_PER_PAGE`].
    pub fn normalize(&self, default_per_page: u32) -> FeedQuery {
        let page = positive_u32(self.page_next.as_ref()).unwrap_or(1);
        let per_page = positive_u32(self.posts_per_page.as_ref())
            .unwrap_or(default_per_page.max(1))
            .min(MAX_POSTS_PER_PAGE);
        let taxonomy = self
            .entry_tax
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TAXONOMY)
            .to_string();
        let term_ids = self.category.as_ref().map(CategoryParam::term_ids).unwrap_or_default();

        FeedQuery { taxonomy, term_ids, page, per_page }
    }
}

fn positive_u32(param: Option<&IntParam>) -> Option<u32> {
    param
        .and_then(IntParam::value)
        .filter(|n| *n > 0)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
}

impl FeedQuery {
    /// The term filter, or `None` when no ids were given.
    pub fn filter(&self) -> Option<TermFilter> {
        if self.term_ids.is_empty() {
            return None;
        }
        Some(TermFilter { taxonomy: self.taxonomy.clone(), term_ids: self.term_ids.clone() })
    }

    /// The same query pointed at another page.
    pub fn with_page(&self, page: u32) -> Self {
        Self { page, ..self.clone() }
    }

    /// Query string addressing this page on the feed endpoint.
    ///
    /// The anti-forgery token is not part of it; continuation URLs are
    /// token-free so they can be cached across token rotations.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("action", FEED_ACTION);
        serializer.append_pair("entry_tax", &self.taxonomy);
        if !self.term_ids.is_empty() {
            let ids: Vec<String> = self.term_ids.iter().map(i64::to_string).collect();
            serializer.append_pair("category", &ids.join(","));
        }
        serializer.append_pair("posts_per_page", &self.per_page.to_string());
        serializer.append_pair("page_next", &self.page.to_string());
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let query = FeedParams::default().normalize(10);
        assert_eq!(query, FeedQuery { taxonomy: "category".into(), term_ids: vec![], page: 1, per_page: 10 });
        assert!(query.filter().is_none());
    }

    #[test]
    fn test_non_positive_values_fall_back() {
        let params = FeedParams {
            page_next: Some(IntParam::Int(0)),
            posts_per_page: Some(IntParam::Text("-4".into())),
            ..Default::default()
        };
        let query = params.normalize(8);
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 8);
    }

    #[test]
    fn test_oversized_values_clamped() {
        let params = FeedParams {
            page_next: Some(IntParam::Int(99_999_999_999)),
            posts_per_page: Some(IntParam::Text("99999999999".into())),
            ..Default::default()
        };
        let query = params.normalize(10);
        assert_eq!(query.page, u32::MAX);
        assert_eq!(query.per_page, MAX_POSTS_PER_PAGE);
    }

    #[test]
    fn test_json_payload_with_array_category() {
        let params: FeedParams = serde_json::from_str(
            r#"{"action":"feed_next_page","nonce":"abc","paged":3,"posts_per_page":"5","entry_tax":"post_tag","category":[4,"7",4]}"#,
        )
        .unwrap();
        assert_eq!(params.nonce.as_deref(), Some("abc"));

        let query = params.normalize(10);
        assert_eq!(query.page, 3);
        assert_eq!(query.per_page, 5);
        assert_eq!(query.taxonomy, "post_tag");
        assert_eq!(query.term_ids, vec![4, 7]);
    }

    #[test]
    fn test_scalar_and_text_category() {
        let scalar: FeedParams = serde_json::from_str(r#"{"category":9}"#).unwrap();
        assert_eq!(scalar.normalize(10).term_ids, vec![9]);

        let text: FeedParams = serde_json::from_str(r#"{"category":"3, 5,,x,-1"}"#).unwrap();
        assert_eq!(text.normalize(10).term_ids, vec![3, 5]);
    }

    #[test]
    fn test_garbage_page_defaults() {
        let params: FeedParams = serde_json::from_str(r#"{"page_next":"two"}"#).unwrap();
        assert_eq!(params.normalize(10).page, 1);
    }

    #[test]
    fn test_query_string_round_trip_shape() {
        let query = FeedQuery { taxonomy: "category".into(), term_ids: vec![3, 5], page: 2, per_page: 10 };
        assert_eq!(
            query.to_query_string(),
            "action=feed_next_page&entry_tax=category&category=3%2C5&posts_per_page=10&page_next=2"
        );
        assert_eq!(query.with_page(3).page, 3);
    }
}
