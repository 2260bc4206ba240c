//! Cache Entry Module
//!
//! Encodes and decodes the expiry instant of an entry through its file
//! modification timestamp.
//!
//! The mtime of an entry file is not a true modification time: it holds
//! the absolute instant (seconds since epoch) after which the entry is
//! invalid. Nothing else in the cache relies on real "last written"
//! semantics, which is what makes the repurposing safe.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::error::{CacheError, Result};

// == Entry Meta ==
/// Decoded on-disk metadata of a single cache entry.
#[derive(Debug, Clone)]
pub struct EntryMeta {
    /// Absolute expiry instant, seconds since epoch
    pub expires_at: u64,
}

impl EntryMeta {
    // == Load ==
    /// Reads an entry's metadata from disk.
    ///
    /// Fails with the underlying I/O error when the file cannot be
    /// stat'd, including plain absence.
    pub fn load(path: &Path) -> io::Result<Self> {
        let mtime = fs::metadata(path)?.modified()?;
        // A pre-epoch mtime decodes to instant 0, i.e. expired long ago.
        let expires_at = mtime
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Ok(Self { expires_at })
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is valid while `expires_at >= now`,
    /// so it only counts as expired strictly after its expiry instant.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at < now
    }
}

// == Validation ==
/// Validates the entry behind `path`, deleting it lazily when expired.
///
/// Returns the path when the entry exists and is still valid. An expired
/// entry is removed as a side effect of being found expired; a removal
/// failure leaves it to the next access or prune.
pub fn validate(path: &Path, key: &str) -> Result<PathBuf> {
    let meta = match EntryMeta::load(path) {
        Ok(meta) => meta,
        Err(_) => return Err(CacheError::NotFound(key.to_string())),
    };

    if meta.is_expired(now_secs()) {
        if let Err(err) = fs::remove_file(path) {
            debug!(key, %err, "failed to remove expired entry");
        }
        return Err(CacheError::Expired(key.to_string()));
    }

    Ok(path.to_path_buf())
}

// == Stamp ==
/// Writes the expiry instant into the file's modification timestamp.
///
/// An instant outside the platform's `SystemTime` range is an error,
/// not a panic; it collapses at the public boundary like any other
/// filesystem failure.
pub fn stamp(file: &fs::File, expires_at: u64) -> io::Result<()> {
    let mtime = UNIX_EPOCH
        .checked_add(Duration::from_secs(expires_at))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("expiry instant {expires_at} is not representable"),
            )
        })?;
    file.set_modified(mtime)
}

// == Utility Functions ==
/// Returns the current Unix timestamp in seconds.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}
