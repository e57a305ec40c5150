//! Core types and shared functionality for feedline.
//!
//! This crate provides:
//! - Feed wire types (request parameters, response envelope) and card rendering
//! - Signature and cache-key derivation, and the generic page bucket
//! - SQLite database with post storage and bucket persistence
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;

pub use cache::{Bucket, BucketStore, CachePolicy, MemoryStore};
pub use config::AppConfig;
pub use db::Db;
pub use error::Error;
pub use feed::{FeedEnvelope, FeedParams, FeedQuery, Post, PostStore, Term};
