//! Post card rendering.

use chrono::DateTime;

use super::post::Post;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render one self-contained card for a post.
pub fn render_card(post: &Post) -> String {
    let date = DateTime::parse_from_rfc3339(&post.published_at)
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| post.published_at.clone());

    format!(
        concat!(
            r#"<article class="feed-card" data-post-id="{id}">"#,
            r#"<h3 class="feed-card__title"><a href="{permalink}">{title}</a></h3>"#,
            r#"<p class="feed-card__meta"><span class="feed-card__author">{author}</span> "#,
            r#"<time datetime="{datetime}">{date}</time></p>"#,
            r#"<p class="feed-card__excerpt">{excerpt}</p>"#,
            "</article>"
        ),
        id = post.id,
        permalink = escape_html(&post.permalink),
        title = escape_html(&post.title),
        author = escape_html(&post.author),
        datetime = escape_html(&post.published_at),
        date = escape_html(&date),
        excerpt = escape_html(&post.excerpt),
    )
}
