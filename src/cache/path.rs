//! Key Path Mapper Module
//!
//! Maps logical cache keys to file paths inside the cache directory and
//! produces the directory listing the pruner and `clear` operate on.
//!
//! The namespace contract: the directory belongs exclusively to the cache,
//! so every file found in it is either an entry (named by its key) or a
//! transient write artifact. Listing makes no attempt to distinguish them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cache::{MAX_KEY_LENGTH, TRANSACTION_SUFFIX};
use crate::error::{CacheError, Result};

// == Key Path Mapper ==
/// Resolves keys to entry paths and enumerates the cache directory.
#[derive(Debug, Clone)]
pub struct KeyPathMapper {
    /// Exclusively owned cache directory
    directory: PathBuf,
}

impl KeyPathMapper {
    // == Constructor ==
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    /// Returns the cache directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    // == Entry Path ==
    /// Resolves a key to its entry path, validating the key first.
    ///
    /// A valid key is a plain filesystem name: non-empty, at most
    /// [`MAX_KEY_LENGTH`] bytes, free of path separators and NUL, not a
    /// dot-directory, and not ending with the reserved transient suffix.
    pub fn entry_path(&self, key: &str) -> Result<PathBuf> {
        Self::validate_key(key)?;
        Ok(self.directory.join(key))
    }

    // == Key Validation ==
    fn validate_key(key: &str) -> Result<()> {
        let reject = |reason| {
            Err(CacheError::InvalidKey {
                key: key.to_string(),
                reason,
            })
        };

        if key.is_empty() {
            return reject("empty");
        }
        if key.len() > MAX_KEY_LENGTH {
            return reject("exceeds maximum length");
        }
        if key == "." || key == ".." {
            return reject("dot directory");
        }
        if key.contains(['/', '\\', '\0']) {
            return reject("contains path separator or NUL");
        }
        if key.ends_with(TRANSACTION_SUFFIX) {
            return reject("reserved transient suffix");
        }
        Ok(())
    }

    // == Directory Listing ==
    /// Returns the fully qualified path of every file in the cache
    /// directory, in whatever order the filesystem yields.
    ///
    /// The order is deliberately not sorted: the pruner's positional
    /// heuristic is defined over raw listing order.
    pub fn list_entries(&self) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for dirent in fs::read_dir(&self.directory)? {
            entries.push(dirent?.path());
        }
        Ok(entries)
    }
}
