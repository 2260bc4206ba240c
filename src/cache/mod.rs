//! Cache Module
//!
//! Provides filesystem-backed caching with mtime-encoded expiry and
//! threshold-triggered pruning.

mod entry;
mod path;
mod prune;
mod stats;
mod store;
mod writer;


// Re-export public types
pub use entry::EntryMeta;
pub use path::KeyPathMapper;
pub use prune::Pruner;
pub use stats::CacheStats;
pub use store::{CacheStore, NO_EXPIRY_SECS};
pub use writer::AtomicWriter;

// == Public Constants ==
/// Reserved suffix carried by transient write artifacts.
///
/// A file with this suffix is an in-flight write staged for rename; keys
/// must never end with it.
pub const TRANSACTION_SUFFIX: &str = "__cache_tmp";

/// Maximum allowed key length in bytes (common filesystem NAME_MAX)
pub const MAX_KEY_LENGTH: usize = 255;
