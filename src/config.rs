//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.
//!
//! The configuration is built once and handed to the cache at construction;
//! it is immutable afterwards. There is no ambient or global registry.

use std::env;
use std::path::PathBuf;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the cache entries.
    ///
    /// Must be used for nothing else: every file in it is treated as cache
    /// state by the pruning and listing logic.
    pub directory: PathBuf,
    /// Maximum number of entries before a write triggers pruning
    pub threshold: usize,
    /// Default timeout in seconds for entries written without an explicit timeout
    pub default_timeout: u64,
    /// Permission bits applied to every written entry
    pub file_mode: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FILECACHE_DIR` - Cache directory (default: `<tmp>/filecache.cache_dir`)
    /// - `FILECACHE_THRESHOLD` - Max entries before pruning (default: 500)
    /// - `FILECACHE_TIMEOUT` - Default timeout in seconds (default: 3000)
    /// - `FILECACHE_MODE` - Entry permission bits as an octal string (default: 600)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            directory: env::var("FILECACHE_DIR")
                .ok()
                .map(PathBuf::from)
                .unwrap_or(defaults.directory),
            threshold: env::var("FILECACHE_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.threshold),
            default_timeout: env::var("FILECACHE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_timeout),
            file_mode: env::var("FILECACHE_MODE")
                .ok()
                .and_then(|v| u32::from_str_radix(&v, 8).ok())
                .unwrap_or(defaults.file_mode),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: env::temp_dir().join("filecache.cache_dir"),
            threshold: 500,
            default_timeout: 3000,
            file_mode: 0o600,
        }
    }
}
