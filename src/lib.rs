//! File Cache - A lightweight filesystem-backed key-value cache
//!
//! Each entry is a single file: the content is the cached payload and the
//! modification timestamp encodes the absolute expiry instant. Writes are
//! published by atomic rename, expired entries are deleted lazily on
//! access, and every write runs a crude threshold-triggered pruning pass.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::CacheStore;
pub use config::Config;
pub use error::{CacheError, Result};
