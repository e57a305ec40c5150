//! The loader's two cache tiers.
//!
//! - [`Coalescer`]: in-memory, one shared future per URL, lives as long as
//!   the loader
//! - [`PersistedCache`]: durable bucket keyed by the sentinel's cache key,
//!   guarded by the feed signature

pub mod memo;
pub mod persisted;

pub use memo::{Coalescer, SharedResult};
pub use persisted::{PersistedCache, now_ms};
