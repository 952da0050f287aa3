//! On-disk cache.
//!
//! Layout under the cache root:
//!
//! ```text
//! {root}/
//! +-- VERSION             # cache format/version string
//! +-- {bucket}/
//!     +-- {key}           # etag line, then the stored bytes
//! ```
//!
//! The root is wiped whenever the `VERSION` file is missing or differs from
//! the version the cache is opened with, so entries written by an older
//! renderer are never served.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::{Cache, CacheBucket};

const VERSION_FILE: &str = "VERSION";

/// [`Cache`] storing each bucket as a directory under `root`.
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Open the cache at `root`, resetting it if it was written with another
    /// `version`. Failures are logged; the cache then simply misses.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        if let Err(e) = ensure_version(&root, version) {
            tracing::warn!(root = %root.display(), "failed to initialize cache: {e}");
        }
        Self { root }
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(name),
        })
    }
}

struct FileCacheBucket {
    dir: PathBuf,
}

impl FileCacheBucket {
    fn read_entry(&self, key: &str, etag: &str) -> io::Result<Option<Vec<u8>>> {
        let mut reader = BufReader::new(File::open(self.dir.join(key))?);

        let mut stored_etag = String::new();
        reader.read_line(&mut stored_etag)?;
        let stored_etag = stored_etag.strip_suffix('\n').unwrap_or(&stored_etag);
        if !etag.is_empty() && stored_etag != etag {
            return Ok(None);
        }

        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Some(data))
    }

    fn write_entry(&self, key: &str, etag: &str, value: &[u8]) -> io::Result<()> {
        let path = self.dir.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut contents = Vec::with_capacity(etag.len() + 1 + value.len());
        contents.extend_from_slice(etag.as_bytes());
        contents.push(b'\n');
        contents.extend_from_slice(value);
        fs::write(path, contents)
    }
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        match self.read_entry(key, etag) {
            Ok(entry) => entry,
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, "failed to read cache entry: {e}");
                None
            }
        }
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        // Etags are single-line; anything else could not be read back.
        if etag.contains('\n') {
            tracing::warn!(key, "refusing to cache entry with multi-line etag");
            return;
        }
        if let Err(e) = self.write_entry(key, etag, value) {
            tracing::warn!(key, "failed to write cache entry: {e}");
        }
    }
}

fn ensure_version(root: &Path, version: &str) -> io::Result<()> {
    let version_file = root.join(VERSION_FILE);
    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!(version, "cache version matches");
            return Ok(());
        }
        Ok(stored) => {
            tracing::info!(%stored, version, "cache version changed, clearing cache");
        }
        Err(_) => tracing::info!(version, "initializing cache"),
    }

    if root.exists() {
        fs::remove_dir_all(root)?;
    }
    fs::create_dir_all(root)?;
    fs::write(version_file, version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open(tmp: &TempDir, version: &str) -> FileCache {
        FileCache::new(tmp.path().join("cache"), version)
    }

    #[test]
    fn test_set_then_get() {
        let tmp = TempDir::new().unwrap();
        let bucket = open(&tmp, "1").bucket("rendering");

        bucket.set("abc", "etag", b"**bold**");
        assert_eq!(bucket.get("abc", "etag"), Some(b"**bold**".to_vec()));
    }

    #[test]
    fn test_etag_mismatch_misses() {
        let tmp = TempDir::new().unwrap();
        let bucket = open(&tmp, "1").bucket("rendering");

        bucket.set("abc", "old", b"data");
        assert_eq!(bucket.get("abc", "new"), None);
        assert_eq!(bucket.get("abc", ""), Some(b"data".to_vec()));
    }

    #[test]
    fn test_missing_entry_misses() {
        let tmp = TempDir::new().unwrap();
        let bucket = open(&tmp, "1").bucket("rendering");
        assert_eq!(bucket.get("nothing", "etag"), None);
    }

    #[test]
    fn test_value_with_newlines_round_trips() {
        let tmp = TempDir::new().unwrap();
        let bucket = open(&tmp, "1").bucket("rendering");

        bucket.set("abc", "etag", b"line one\n\nline two\n");
        assert_eq!(
            bucket.get("abc", "etag"),
            Some(b"line one\n\nline two\n".to_vec())
        );
    }

    #[test]
    fn test_multi_line_etag_is_not_stored() {
        let tmp = TempDir::new().unwrap();
        let bucket = open(&tmp, "1").bucket("rendering");

        bucket.set("abc", "a\nb", b"data");
        assert_eq!(bucket.get("abc", ""), None);
    }

    #[test]
    fn test_buckets_are_isolated() {
        let tmp = TempDir::new().unwrap();
        let cache = open(&tmp, "1");
        cache.bucket("one").set("k", "e", b"1");
        cache.bucket("two").set("k", "e", b"2");

        assert_eq!(cache.bucket("one").get("k", "e"), Some(b"1".to_vec()));
        assert_eq!(cache.bucket("two").get("k", "e"), Some(b"2".to_vec()));
    }

    #[test]
    fn test_same_version_keeps_entries() {
        let tmp = TempDir::new().unwrap();
        open(&tmp, "1").bucket("rendering").set("k", "e", b"kept");

        let bucket = open(&tmp, "1").bucket("rendering");
        assert_eq!(bucket.get("k", "e"), Some(b"kept".to_vec()));
    }

    #[test]
    fn test_new_version_clears_entries() {
        let tmp = TempDir::new().unwrap();
        open(&tmp, "1").bucket("rendering").set("k", "e", b"stale");

        let bucket = open(&tmp, "2").bucket("rendering");
        assert_eq!(bucket.get("k", "e"), None);
        let version = fs::read_to_string(tmp.path().join("cache/VERSION")).unwrap();
        assert_eq!(version, "2");
    }

    #[test]
    fn test_unversioned_directory_is_cleared() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");
        fs::create_dir_all(root.join("rendering")).unwrap();
        fs::write(root.join("rendering/k"), b"e\nleftover").unwrap();

        let bucket = FileCache::new(root.clone(), "1").bucket("rendering");
        assert_eq!(bucket.get("k", "e"), None);
        assert!(root.join(VERSION_FILE).exists());
    }
}
