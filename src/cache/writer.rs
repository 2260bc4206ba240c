//! Atomic Writer Module
//!
//! Publishes cache entries through a temp-file-and-rename protocol so that
//! concurrent readers never observe a partially written payload.
//!
//! The transient file is created inside the cache directory itself, which
//! guarantees the final rename stays on one filesystem and is therefore
//! atomic. Until the rename completes, the new content is invisible under
//! the destination key; after it, readers see the new payload in full.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::cache::entry;
use crate::cache::TRANSACTION_SUFFIX;
use crate::error::Result;

// == Atomic Writer ==
/// Writes payloads into the cache directory atomically, then stamps the
/// expiry instant and permission bits.
#[derive(Debug, Clone)]
pub struct AtomicWriter {
    /// Cache directory; also hosts the transient files
    directory: PathBuf,
    /// Permission bits applied to every published entry
    file_mode: u32,
}

impl AtomicWriter {
    // == Constructor ==
    pub fn new(directory: PathBuf, file_mode: u32) -> Self {
        Self {
            directory,
            file_mode,
        }
    }

    // == Write Bytes ==
    /// Stages `data` in a transient file and publishes it under `dest`.
    ///
    /// Returns the destination path once the entry is durably readable.
    pub fn write_bytes(&self, dest: &Path, data: &[u8], expires_at: u64) -> Result<PathBuf> {
        let mut tmp = self.transient_file()?;
        tmp.write_all(data)?;
        self.publish(tmp, dest, expires_at)
    }

    // == Copy From ==
    /// Stages a byte-for-byte copy of `source` and publishes it under `dest`.
    pub fn copy_from(&self, source: &Path, dest: &Path, expires_at: u64) -> Result<PathBuf> {
        let mut tmp = self.transient_file()?;
        let mut reader = fs::File::open(source)?;
        io::copy(&mut reader, tmp.as_file_mut())?;
        self.publish(tmp, dest, expires_at)
    }

    // == Internals ==
    /// Creates the uniquely named transient file carrying the reserved suffix.
    fn transient_file(&self) -> io::Result<NamedTempFile> {
        tempfile::Builder::new()
            .suffix(TRANSACTION_SUFFIX)
            .tempfile_in(&self.directory)
    }

    /// Renames the staged file over the destination, then stamps expiry
    /// and permissions.
    ///
    /// The rename is the single visibility point. A failure after it but
    /// before the stamp or chmod completes leaves the entry readable under
    /// its key with stale metadata; this window is accepted and not
    /// retried.
    fn publish(&self, tmp: NamedTempFile, dest: &Path, expires_at: u64) -> Result<PathBuf> {
        debug!(dest = %dest.display(), expires_at, "publishing entry");
        let file = tmp.persist(dest).map_err(|e| e.error)?;

        entry::stamp(&file, expires_at)?;
        self.apply_mode(&file)?;

        Ok(dest.to_path_buf())
    }

    #[cfg(unix)]
    fn apply_mode(&self, file: &fs::File) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(self.file_mode))
    }

    #[cfg(not(unix))]
    fn apply_mode(&self, _file: &fs::File) -> io::Result<()> {
        // Permission bits are a Unix concept; published entries keep the
        // platform default elsewhere.
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::{now_secs, EntryMeta};

    fn writer_in(dir: &Path) -> AtomicWriter {
        AtomicWriter::new(dir.to_path_buf(), 0o600)
    }

    #[test]
    fn test_write_bytes_publishes_payload() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer_in(dir.path());
        let dest = dir.path().join("entry.dat");

        let path = writer
            .write_bytes(&dest, b"hello cache", now_secs() + 60)
            .unwrap();

        assert_eq!(path, dest);
        assert_eq!(fs::read(&dest).unwrap(), b"hello cache");
    }

    #[test]
    fn test_write_bytes_stamps_expiry() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer_in(dir.path());
        let dest = dir.path().join("entry.dat");
        let expires_at = now_secs() + 120;

        writer.write_bytes(&dest, b"data", expires_at).unwrap();

        let meta = EntryMeta::load(&dest).unwrap();
        assert_eq!(meta.expires_at, expires_at);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_bytes_applies_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let writer = writer_in(dir.path());
        let dest = dir.path().join("entry.dat");

        writer.write_bytes(&dest, b"data", now_secs() + 60).unwrap();

        let mode = fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer_in(dir.path());
        let dest = dir.path().join("entry.dat");

        writer.write_bytes(&dest, b"old", now_secs() + 60).unwrap();
        writer.write_bytes(&dest, b"new", now_secs() + 60).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn test_no_transient_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer_in(dir.path());
        let dest = dir.path().join("entry.dat");

        writer.write_bytes(&dest, b"data", now_secs() + 60).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .filter(|name| name.ends_with(TRANSACTION_SUFFIX))
            .collect();
        assert!(leftovers.is_empty(), "leftover transients: {leftovers:?}");
    }

    #[test]
    fn test_copy_from_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("source.dat");
        fs::write(&source, b"copied bytes").unwrap();

        let writer = writer_in(dir.path());
        let dest = dir.path().join("source.dat");
        let path = writer.copy_from(&source, &dest, now_secs() + 60).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"copied bytes");
        // Source file is untouched
        assert_eq!(fs::read(&source).unwrap(), b"copied bytes");
    }

    #[test]
    fn test_copy_from_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer_in(dir.path());
        let dest = dir.path().join("entry.dat");

        let result = writer.copy_from(Path::new("/nonexistent/source"), &dest, now_secs() + 60);
        assert!(result.is_err());
        assert!(!dest.exists());
    }
}
