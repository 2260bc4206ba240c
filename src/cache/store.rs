//! Cache Store Module
//!
//! Public facade composing the path mapper, atomic writer, expiry
//! validation and pruner into the get/has/put/put_file/delete/clear
//! surface.
//!
//! Every public operation collapses its failure modes to a negative
//! sentinel (`None` or `false`): a caller cannot tell "never written"
//! from "expired" from "disk error on this call". The internal `try_*`
//! operations keep the full [`CacheError`] taxonomy so the distinction
//! stays explicit in the type system and in the debug logs.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cache::entry::{self, now_secs};
use crate::cache::{AtomicWriter, CacheStats, KeyPathMapper, Pruner};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Expiry instant stamped on entries that never expire (an explicit
/// timeout of zero). Far enough out to outlive any deployment, small
/// enough for every mainstream filesystem's timestamp range.
pub const NO_EXPIRY_SECS: u64 = u32::MAX as u64;

// == Cache Store ==
/// Filesystem-backed cache store with mtime-encoded expiry and
/// threshold-triggered pruning.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-to-path resolution and directory listing
    mapper: KeyPathMapper,
    /// Atomic publication of payloads
    writer: AtomicWriter,
    /// Best-effort size bounding, run before every write
    pruner: Pruner,
    /// Performance statistics
    stats: CacheStats,
    /// Default timeout in seconds for writes without an explicit timeout
    default_timeout: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Opens a cache store over the configured directory, creating the
    /// directory if it does not exist.
    ///
    /// This is the only fallible path exposed to the owning application:
    /// an already existing directory is fine, any other creation error is
    /// reported as [`CacheError::Bootstrap`].
    pub fn open(config: &Config) -> Result<Self> {
        fs::create_dir_all(&config.directory).map_err(|source| CacheError::Bootstrap {
            path: config.directory.clone(),
            source,
        })?;

        let mapper = KeyPathMapper::new(config.directory.clone());
        let writer = AtomicWriter::new(config.directory.clone(), config.file_mode);
        let pruner = Pruner::new(mapper.clone(), config.threshold);

        Ok(Self {
            mapper,
            writer,
            pruner,
            stats: CacheStats::new(),
            default_timeout: config.default_timeout,
        })
    }

    /// Returns the cache directory.
    pub fn directory(&self) -> &Path {
        self.mapper.directory()
    }

    // == Get ==
    /// Returns the path of the valid entry under `key`, or `None`.
    ///
    /// Finding the entry expired deletes it as a side effect.
    pub fn get(&mut self, key: &str) -> Option<PathBuf> {
        match self.try_get(key) {
            Ok(path) => {
                self.stats.record_hit();
                Some(path)
            }
            Err(err) => {
                self.record_negative(&err);
                debug!(key, %err, "get miss");
                None
            }
        }
    }

    // == Has ==
    /// Checks whether a valid entry exists under `key`.
    ///
    /// Same validation as [`get`](Self::get), including the lazy deletion
    /// of an expired entry; only the boolean outcome is reported.
    pub fn has(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    // == Put ==
    /// Writes `data` under `key`, returning the entry path, or `None` on
    /// any failure.
    ///
    /// A pruning pass runs first; its outcome never affects the write.
    /// `timeout` is the entry lifetime in seconds, `None` uses the
    /// configured default, and an explicit `0` means the entry never
    /// expires.
    pub fn put(&mut self, key: &str, data: &[u8], timeout: Option<u64>) -> Option<PathBuf> {
        match self.try_put(key, data, timeout) {
            Ok(path) => Some(path),
            Err(err) => {
                debug!(key, %err, "put failed");
                None
            }
        }
    }

    // == Put File ==
    /// Copies the file at `source` into the cache under its own base
    /// filename, returning the entry path, or `None` on any failure.
    pub fn put_file(&mut self, source: &Path, timeout: Option<u64>) -> Option<PathBuf> {
        match self.try_put_file(source, timeout) {
            Ok(path) => Some(path),
            Err(err) => {
                debug!(source = %source.display(), %err, "put_file failed");
                None
            }
        }
    }

    // == Delete ==
    /// Removes the entry under `key`. Returns `false` when it does not
    /// exist or cannot be removed.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.try_delete(key) {
            Ok(()) => true,
            Err(err) => {
                debug!(key, %err, "delete failed");
                false
            }
        }
    }

    // == Clear ==
    /// Removes every entry. Aborts at the first removal failure and
    /// returns `false`, leaving the directory partially cleared.
    pub fn clear(&mut self) -> bool {
        match self.try_clear() {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, "clear aborted");
                false
            }
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entry_count());
        stats
    }

    // == Length ==
    /// Returns the current number of files in the cache directory.
    pub fn entry_count(&self) -> usize {
        self.mapper.list_entries().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true if the cache directory holds no files.
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    // == Tagged Operations ==

    fn try_get(&mut self, key: &str) -> Result<PathBuf> {
        let path = self.mapper.entry_path(key)?;
        entry::validate(&path, key)
    }

    fn try_put(&mut self, key: &str, data: &[u8], timeout: Option<u64>) -> Result<PathBuf> {
        // The prune pass runs unconditionally, before the write can fail
        // for any reason of its own.
        self.run_pruner();
        let dest = self.mapper.entry_path(key)?;
        let expires_at = self.resolve_expiry(timeout);
        self.writer.write_bytes(&dest, data, expires_at)
    }

    fn try_put_file(&mut self, source: &Path, timeout: Option<u64>) -> Result<PathBuf> {
        self.run_pruner();

        // The key is implicitly the source file's base name.
        let key = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| CacheError::InvalidKey {
                key: source.display().to_string(),
                reason: "source path has no usable file name",
            })?;

        let dest = self.mapper.entry_path(key)?;
        let expires_at = self.resolve_expiry(timeout);
        self.writer.copy_from(source, &dest, expires_at)
    }

    fn try_delete(&mut self, key: &str) -> Result<()> {
        let path = self.mapper.entry_path(key)?;
        fs::remove_file(path)?;
        Ok(())
    }

    fn try_clear(&mut self) -> Result<()> {
        for path in self.mapper.list_entries()? {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    // == Internals ==

    /// Resolves the absolute expiry instant for a write.
    ///
    /// An explicit timeout of zero means "never expire"; see the
    /// far-future [`NO_EXPIRY_SECS`] stamp. Any instant that would land
    /// beyond it is capped there, so an absurdly large timeout degrades
    /// to "never expire" instead of overflowing.
    fn resolve_expiry(&self, timeout: Option<u64>) -> u64 {
        let instant = match timeout {
            None => now_secs().saturating_add(self.default_timeout),
            Some(0) => NO_EXPIRY_SECS,
            Some(secs) => now_secs().saturating_add(secs),
        };
        instant.min(NO_EXPIRY_SECS)
    }

    fn run_pruner(&mut self) {
        let removed = self.pruner.prune();
        self.stats.record_evictions(removed as u64);
    }

    fn record_negative(&mut self, err: &CacheError) {
        self.stats.record_miss();
        // A lazily deleted expired entry counts as an eviction too.
        if matches!(err, CacheError::Expired(_)) {
            self.stats.record_evictions(1);
        }
    }
}
