//! Error types for the file cache
//!
//! Provides unified error handling using thiserror.
//!
//! Only the `Bootstrap` class ever reaches the owning application (from
//! [`CacheStore::open`](crate::cache::CacheStore::open)); every other
//! variant is collapsed to a negative sentinel (`None` / `false`) at the
//! public operation boundary.

use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the file cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key has no entry on disk
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key had an entry, but its expiry instant has passed
    #[error("Key expired: {0}")]
    Expired(String),

    /// Key is not a valid filesystem name for this cache
    #[error("Invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// Underlying filesystem failure (write, rename, stamp, remove)
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Cache directory could not be created or accessed at startup
    #[error("Failed to bootstrap cache directory {path:?}")]
    Bootstrap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the file cache.
pub type Result<T> = std::result::Result<T, CacheError>;
