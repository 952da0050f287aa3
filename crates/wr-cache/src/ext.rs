//! Typed access to [`CacheBucket`] values.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheBucket;

/// JSON and string helpers over the byte-level [`CacheBucket`] API.
///
/// Implemented for every bucket, so [`CacheBucket`] itself stays object-safe.
pub trait CacheBucketExt: CacheBucket {
    /// Deserialize a cached JSON value. Undecodable entries count as misses.
    fn get_json<T: DeserializeOwned>(&self, key: &str, etag: &str) -> Option<T> {
        let bytes = self.get(key, etag)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key, "discarding undecodable cache entry: {e}");
                None
            }
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, etag: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, etag, &bytes),
            Err(e) => tracing::warn!(key, "failed to encode cache entry: {e}"),
        }
    }

    fn get_string(&self, key: &str, etag: &str) -> Option<String> {
        String::from_utf8(self.get(key, etag)?).ok()
    }

    fn set_string(&self, key: &str, etag: &str, value: &str) {
        self.set(key, etag, value.as_bytes());
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cache, FileCache};
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        text: String,
    }

    #[test]
    fn test_json_round_trip() {
        let tmp = TempDir::new().unwrap();
        let bucket = FileCache::new(tmp.path().to_path_buf(), "1").bucket("b");
        let entry = Entry {
            text: "= Title =".to_owned(),
        };

        bucket.set_json("k", "e", &entry);
        assert_eq!(bucket.get_json::<Entry>("k", "e"), Some(entry));
    }

    #[test]
    fn test_invalid_json_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let bucket = FileCache::new(tmp.path().to_path_buf(), "1").bucket("b");

        bucket.set_string("k", "e", "not json");
        assert_eq!(bucket.get_json::<Entry>("k", "e"), None);
        assert_eq!(bucket.get_string("k", "e").as_deref(), Some("not json"));
    }
}
