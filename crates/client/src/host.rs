//! Host page parsing.
//!
//! The archive page renders its first page of cards synchronously inside a
//! feed root and carries a sentinel element whose `data-*` attributes tell
//! the loader where to continue and how to cache.

use std::time::Duration;

use feedline_core::config::{DEFAULT_CACHE_LIMIT, DEFAULT_CACHE_TTL_MS};
use scraper::{ElementRef, Html, Selector};

/// Container whose children are the feed's cards.
pub const FEED_ROOT_SELECTOR: &str = ".feed-root, [data-feed-root]";

/// Elements a sentinel must live under to be recognised.
pub const ARCHIVE_ROOT_SELECTOR: &str = ".archive-root, main, body";

/// The pagination sentinel.
pub const SENTINEL_SELECTOR: &str = ".feed-sentinel, [data-feed-sentinel]";

/// Manual retry control inside the sentinel.
pub const RETRY_SELECTOR: &str = ".feed-retry, [data-feed-retry]";

const CARD_TITLE_SELECTOR: &str = "h1, h2, h3, h4";

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("invalid selector")
}

/// Metadata read from the sentinel's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentinel {
    /// `data-next`; `None` when absent or empty.
    pub next: Option<String>,
    /// `data-feed-signature`
    pub signature: String,
    /// `data-cache-key`
    pub cache_key: String,
    /// `data-cache-ttl`, milliseconds, default 6h.
    pub cache_ttl: Duration,
    /// `data-cache-limit`, default 6.
    pub cache_limit: usize,
    /// `data-nonce`
    pub nonce: Option<String>,
    pub has_retry_control: bool,
}

impl Sentinel {
    fn from_element(element: ElementRef<'_>) -> Self {
        let el = element.value();
        let text = |name: &str| el.attr(name).map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);

        let cache_ttl = text("data-cache-ttl")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_CACHE_TTL_MS);
        let cache_limit = text("data-cache-limit")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_CACHE_LIMIT);

        Self {
            next: text("data-next"),
            signature: text("data-feed-signature").unwrap_or_default(),
            cache_key: text("data-cache-key").unwrap_or_default(),
            cache_ttl: Duration::from_millis(cache_ttl),
            cache_limit,
            nonce: text("data-nonce"),
            has_retry_control: element.select(&selector(RETRY_SELECTOR)).next().is_some(),
        }
    }
}

/// The parts of a host page the loader needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostPage {
    /// Outer HTML of each card already on the page.
    pub cards: Vec<String>,
    pub sentinel: Option<Sentinel>,
    /// Whether a feed root container was found at all.
    pub has_feed_root: bool,
}

impl HostPage {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let sentinel_sel = selector(SENTINEL_SELECTOR);

        let root = document.select(&selector(FEED_ROOT_SELECTOR)).next();
        let cards = root
            .map(|root| {
                root.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|child| !sentinel_sel.matches(child))
                    .map(|child| child.html())
                    .collect()
            })
            .unwrap_or_default();

        let sentinel = document
            .select(&selector(ARCHIVE_ROOT_SELECTOR))
            .find_map(|archive| archive.select(&sentinel_sel).next())
            .map(Sentinel::from_element);

        Self { cards, sentinel, has_feed_root: root.is_some() }
    }
}

/// Text of a card's title: its first heading, trimmed.
pub fn card_title(card: &str) -> Option<String> {
    let fragment = Html::parse_fragment(card);
    let title = fragment.select(&selector(CARD_TITLE_SELECTOR)).next()?;
    let text = title.text().collect::<String>();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}
