//! Pruner Module
//!
//! Best-effort size bounding, run at the start of every write.
//!
//! The policy is deliberately crude: one pass over the directory listing,
//! evicting entries that are already expired plus every third entry by
//! listing position. Listing position is whatever order the filesystem
//! yields; it tracks neither insertion nor access recency, so this is not
//! LRU and must not drift toward it.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::cache::entry::{now_secs, EntryMeta};
use crate::cache::KeyPathMapper;

// == Pruner ==
/// Threshold-triggered eviction pass over the cache directory.
#[derive(Debug, Clone)]
pub struct Pruner {
    mapper: KeyPathMapper,
    /// Entry count above which a write triggers eviction
    threshold: usize,
}

impl Pruner {
    // == Constructor ==
    pub fn new(mapper: KeyPathMapper, threshold: usize) -> Self {
        Self { mapper, threshold }
    }

    // == Prune ==
    /// Runs one eviction pass if the directory holds more entries than the
    /// threshold. Returns the number of entries removed.
    ///
    /// Eviction is best-effort throughout: a failed listing aborts the
    /// pass silently, and an individual removal failure is logged and
    /// skipped so the scan continues. The caller's write proceeds either
    /// way.
    pub fn prune(&self) -> usize {
        let entries = match self.mapper.list_entries() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(%err, "pruning skipped: directory listing failed");
                return 0;
            }
        };

        if entries.len() <= self.threshold {
            return 0;
        }

        let now = now_secs();
        let mut removed = 0;
        for (idx, path) in entries.iter().enumerate() {
            if self.should_evict(idx, path, now) && self.remove(path) {
                removed += 1;
            }
        }

        debug!(removed, scanned = entries.len(), "pruning pass complete");
        removed
    }

    /// An entry is evicted when its stored expiry has passed or it sits
    /// at every third listing position, regardless of usage.
    fn should_evict(&self, idx: usize, path: &Path, now: u64) -> bool {
        let expired = EntryMeta::load(path)
            .map(|meta| meta.is_expired(now))
            .unwrap_or(false);
        expired || idx % 3 == 0
    }

    fn remove(&self, path: &Path) -> bool {
        match fs::remove_file(path) {
            Ok(()) => true,
            Err(err) => {
                // Tolerated: the entry may have been removed or replaced
                // between the listing and this attempt.
                debug!(path = %path.display(), %err, "eviction failed, continuing scan");
                false
            }
        }
    }
}
