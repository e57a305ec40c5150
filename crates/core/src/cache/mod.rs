//! Loader cache primitives.
//!
//! - Feed signatures and cache keys derived from term state
//! - A generic bucket with FIFO capacity and lazy TTL expiry
//! - A storage abstraction the bucket is serialised into

pub mod bucket;
pub mod hash;
pub mod store;

pub use bucket::{Bucket, CachePolicy, Entry, Lookup};
pub use hash::{cache_key, feed_signature};
pub use store::{BucketStore, MemoryStore, STORAGE_PREFIX, read_bucket, storage_key, write_bucket};
