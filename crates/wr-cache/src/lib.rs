//! Caching for rendered XWiki syntax.
//!
//! Two layers:
//!
//! - [`Cache`] / [`CacheBucket`]: byte storage keyed by name and validated by
//!   an etag. [`NullCache`] never stores anything; [`FileCache`] keeps entries
//!   on disk.
//! - [`RenderingCache`]: rendered output keyed by the document, action,
//!   locale and request parameters, invalidated when the source changes, with
//!   per-extension state snapshots restored on hit.
//!
//! Cache failures never abort rendering: they are logged and treated as misses.
//!
//! # Example
//!
//! ```
//! use wr_cache::{NullCache, RenderRequest, RenderingCache};
//!
//! let cache = RenderingCache::new(&NullCache, Vec::new());
//! let request = RenderRequest::new("Main.WebHome");
//!
//! cache.set_rendered_content(&request, "source", "**rendered**", &[]);
//! assert_eq!(cache.get_rendered_content(&request, "source", &mut []), None);
//! ```

mod ext;
mod file;
mod rendering;

pub use ext::CacheBucketExt;
pub use file::FileCache;
pub use rendering::{
    DEFAULT_ACTION, REFRESH_PARAMETER, RenderRequest, RenderingCache, RenderingCacheAware,
};

/// Named partition of a [`Cache`].
///
/// Values are stored under a key together with an etag chosen by the caller
/// (a source hash, a version string). A lookup hits only when the stored etag
/// equals the requested one; an empty requested etag accepts any entry.
pub trait CacheBucket: Send + Sync {
    /// Stored bytes for `key`, if present and stored under `etag`.
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>>;

    /// Store `value` under `key`, replacing any previous entry.
    fn set(&self, key: &str, etag: &str, value: &[u8]);
}

/// Source of isolated [`CacheBucket`]s.
pub trait Cache: Send + Sync {
    /// Open the bucket called `name`.
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// Bucket that drops every write and misses every read.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str, _etag: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _etag: &str, _value: &[u8]) {}
}

/// Cache used when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}
