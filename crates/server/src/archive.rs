//! Archive host page markup.
//!
//! Page 1 is rendered synchronously; the sentinel after the feed root
//! carries everything the loader needs to continue.

use feedline_core::Term;
use feedline_core::feed::escape_html;

pub struct ArchivePage<'a> {
    pub term: &'a Term,
    pub cards: &'a [String],
    pub next: Option<&'a str>,
    pub signature: &'a str,
    pub cache_key: &'a str,
    pub cache_ttl_ms: u64,
    pub cache_limit: usize,
    pub nonce: &'a str,
}

pub fn render(page: &ArchivePage<'_>) -> String {
    let next_attr = page
        .next
        .map(|next| format!(r#" data-next="{}""#, escape_html(next)))
        .unwrap_or_default();

    format!(
        concat!(
            "<!doctype html>\n",
            r#"<html lang="en"><head><meta charset="utf-8"><title>{name}</title></head>"#,
            r#"<body><main class="archive-root">"#,
            r#"<h1 class="archive-title">{name}</h1>"#,
            r#"<div class="feed-root">{cards}</div>"#,
            r#"<div class="feed-sentinel"{next_attr} data-feed-signature="{signature}" data-cache-key="{cache_key}" "#,
            r#"data-cache-ttl="{ttl}" data-cache-limit="{limit}" data-nonce="{nonce}">"#,
            r#"<button class="feed-retry" type="button" hidden>Load more</button>"#,
            "</div></main></body></html>\n"
        ),
        name = escape_html(&page.term.name),
        cards = page.cards.concat(),
        next_attr = next_attr,
        signature = escape_html(page.signature),
        cache_key = escape_html(page.cache_key),
        ttl = page.cache_ttl_ms,
        limit = page.cache_limit,
        nonce = escape_html(page.nonce),
    )
}
