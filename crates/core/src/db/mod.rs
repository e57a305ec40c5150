//! SQLite database: posts and terms for the feed provider, persisted
//! buckets for the loader.
//!
//! Access is async via tokio-rusqlite, with WAL mode and versioned
//! migrations.

pub mod buckets;
pub mod connection;
pub mod migrations;
pub mod posts;

pub use connection::Db;
pub use posts::NewPost;
