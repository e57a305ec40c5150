//! Feed wire types and the post model behind them.

pub mod envelope;
pub mod post;
pub mod query;
pub mod render;

pub use envelope::FeedEnvelope;
pub use post::{Post, PostPage, PostStamp, PostStore, STATUS_PUBLISH, Term, TermFilter};
pub use query::{CategoryParam, DEFAULT_TAXONOMY, FEED_ACTION, FeedParams, FeedQuery, IntParam, MAX_POSTS_PER_PAGE};
pub use render::{escape_html, render_card};
