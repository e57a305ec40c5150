//! The feed endpoint's response payload.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Response of the feed endpoint. Always delivered with HTTP 200.
///
/// `content` is the concatenation of `cards`; `next` is the URL of the
/// following page and is absent on the last one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FeedEnvelope {
    pub content: String,
    pub paged: u32,
    pub page_max: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub cards: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl FeedEnvelope {
    /// A page built from rendered cards.
    pub fn page(cards: Vec<String>, paged: u32, page_max: u32, next: Option<String>) -> Self {
        Self { content: cards.concat(), paged, page_max, error: None, cards, next }
    }

    /// The rejected-request shape: empty fragment plus an error flag.
    pub fn rejected(paged: u32, error: impl Into<String>) -> Self {
        Self { content: String::new(), paged, page_max: 0, error: Some(error.into()), cards: Vec::new(), next: None }
    }

    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}
