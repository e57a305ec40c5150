//! Client side of feedline.
//!
//! This crate provides the incremental feed loader: the HTTP page source,
//! host page sentinel parsing, request coalescing, the persisted cache tier
//! and the load/retry state machine.

pub mod cache;
pub mod fetch;
pub mod host;
pub mod loader;

pub use cache::{Coalescer, PersistedCache};
pub use fetch::{FetchClient, FetchConfig, FetchError, NONCE_HEADER, PageSource, decode_envelope};
pub use host::{HostPage, Sentinel, card_title};
pub use loader::{FeedLoader, LoaderConfig, LoaderOptions, LoaderState, RetryControl};
