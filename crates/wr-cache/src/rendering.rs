//! Cache of rendered documents.
//!
//! An entry is keyed by everything that selects a rendering of a document:
//! its name, the action, the locale and the request parameters. The entry's
//! etag is a hash of the source, so editing the document invalidates it.
//!
//! Components that keep state alongside the rendered text (collected
//! headings, required resources) implement [`RenderingCacheAware`]. Their
//! snapshots are stored with the text and handed back on a hit, so a cached
//! render leaves them in the same state as a fresh one.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ext::CacheBucketExt;
use crate::{Cache, CacheBucket};

/// Action used when a request names none.
pub const DEFAULT_ACTION: &str = "view";

/// Request parameter forcing a fresh render (`refresh=1`). Never part of the key.
pub const REFRESH_PARAMETER: &str = "refresh";

const BUCKET: &str = "rendering";

/// What is being rendered, and for whom.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderRequest {
    /// Full document name (`wiki:Space.Page`).
    pub document: String,
    /// Action the document is rendered for; [`DEFAULT_ACTION`] when `None`.
    pub action: Option<String>,
    pub locale: String,
    pub parameters: BTreeMap<String, String>,
}

impl RenderRequest {
    #[must_use]
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or(DEFAULT_ACTION)
    }

    /// Whether the request asks to bypass cached content.
    pub fn is_refresh(&self) -> bool {
        self.parameters.get(REFRESH_PARAMETER).map(String::as_str) == Some("1")
    }

    /// Hex SHA-256 of the document, action, locale and sorted parameters.
    fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [self.document.as_str(), self.action(), self.locale.as_str()] {
            hasher.update(part.as_bytes());
            hasher.update(b"\0");
        }
        // BTreeMap iterates in key order.
        for (key, value) in &self.parameters {
            if key == REFRESH_PARAMETER {
                continue;
            }
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b"\0");
        }
        hex::encode(hasher.finalize())
    }
}

/// Component whose state must survive a cache hit.
pub trait RenderingCacheAware {
    /// Stable name the snapshot is stored under.
    fn name(&self) -> &str;

    /// State produced by the render that is about to be cached.
    fn snapshot(&self) -> serde_json::Value;

    /// Reinstate a snapshot taken by [`snapshot`](Self::snapshot).
    fn restore(&mut self, snapshot: serde_json::Value);
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedItem {
    rendered: String,
    #[serde(default)]
    extensions: BTreeMap<String, serde_json::Value>,
}

/// Rendered-content cache over a [`Cache`] bucket.
pub struct RenderingCache {
    bucket: Box<dyn CacheBucket>,
    documents: Vec<Regex>,
}

impl RenderingCache {
    /// Cache documents matching any of `documents`; every document when empty.
    pub fn new(cache: &dyn Cache, documents: Vec<Regex>) -> Self {
        Self {
            bucket: cache.bucket(BUCKET),
            documents,
        }
    }

    pub fn is_cacheable(&self, document: &str) -> bool {
        self.documents.is_empty() || self.documents.iter().any(|re| re.is_match(document))
    }

    /// Cached rendering of `source` for `request`, restoring each extension's
    /// snapshot on a hit.
    pub fn get_rendered_content(
        &self,
        request: &RenderRequest,
        source: &str,
        extensions: &mut [&mut dyn RenderingCacheAware],
    ) -> Option<String> {
        if !self.is_cacheable(&request.document) {
            return None;
        }
        if request.is_refresh() {
            tracing::debug!(document = %request.document, "refresh requested, skipping cache");
            return None;
        }

        let key = request.cache_key();
        let Some(mut item) = self.bucket.get_json::<CachedItem>(&key, &source_etag(source)) else {
            tracing::debug!(document = %request.document, "rendering cache miss");
            return None;
        };
        tracing::debug!(document = %request.document, "rendering cache hit");

        for extension in extensions.iter_mut() {
            match item.extensions.remove(extension.name()) {
                Some(snapshot) => extension.restore(snapshot),
                None => tracing::debug!(extension = extension.name(), "no cached snapshot"),
            }
        }
        for name in item.extensions.keys() {
            tracing::debug!(extension = %name, "skipping snapshot of unknown extension");
        }

        Some(item.rendered)
    }

    /// Store the rendering of `source` for `request`, with every extension's
    /// current snapshot.
    pub fn set_rendered_content(
        &self,
        request: &RenderRequest,
        source: &str,
        rendered: &str,
        extensions: &[&dyn RenderingCacheAware],
    ) {
        if !self.is_cacheable(&request.document) {
            return;
        }

        let item = CachedItem {
            rendered: rendered.to_owned(),
            extensions: extensions
                .iter()
                .map(|extension| (extension.name().to_owned(), extension.snapshot()))
                .collect(),
        };
        self.bucket
            .set_json(&request.cache_key(), &source_etag(source), &item);
    }
}

fn source_etag(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileCache, NullCache};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    struct Headings {
        titles: Vec<String>,
    }

    impl RenderingCacheAware for Headings {
        fn name(&self) -> &str {
            "headings"
        }

        fn snapshot(&self) -> serde_json::Value {
            json!(self.titles)
        }

        fn restore(&mut self, snapshot: serde_json::Value) {
            self.titles = serde_json::from_value(snapshot).unwrap_or_default();
        }
    }

    fn file_cache(tmp: &TempDir) -> FileCache {
        FileCache::new(tmp.path().join("cache"), "1")
    }

    #[test]
    fn test_hit_after_store() {
        let tmp = TempDir::new().unwrap();
        let cache = RenderingCache::new(&file_cache(&tmp), Vec::new());
        let request = RenderRequest::new("Main.WebHome");

        cache.set_rendered_content(&request, "source", "= Title =", &[]);
        assert_eq!(
            cache.get_rendered_content(&request, "source", &mut []),
            Some("= Title =".to_owned())
        );
    }

    #[test]
    fn test_changed_source_misses() {
        let tmp = TempDir::new().unwrap();
        let cache = RenderingCache::new(&file_cache(&tmp), Vec::new());
        let request = RenderRequest::new("Main.WebHome");

        cache.set_rendered_content(&request, "v1", "one", &[]);
        assert_eq!(cache.get_rendered_content(&request, "v2", &mut []), None);
    }

    #[test]
    fn test_key_covers_action_locale_and_parameters() {
        let tmp = TempDir::new().unwrap();
        let cache = RenderingCache::new(&file_cache(&tmp), Vec::new());
        let base = RenderRequest::new("Main.WebHome");
        cache.set_rendered_content(&base, "s", "base", &[]);

        for other in [
            base.clone().with_action("edit"),
            base.clone().with_locale("fr"),
            base.clone().with_parameter("xpage", "plain"),
            RenderRequest::new("Main.Other"),
        ] {
            assert_eq!(cache.get_rendered_content(&other, "s", &mut []), None);
        }
    }

    #[test]
    fn test_explicit_default_action_shares_entry() {
        let tmp = TempDir::new().unwrap();
        let cache = RenderingCache::new(&file_cache(&tmp), Vec::new());
        cache.set_rendered_content(&RenderRequest::new("A.B"), "s", "text", &[]);

        let request = RenderRequest::new("A.B").with_action(DEFAULT_ACTION);
        assert_eq!(
            cache.get_rendered_content(&request, "s", &mut []),
            Some("text".to_owned())
        );
    }

    #[test]
    fn test_parameter_order_does_not_matter() {
        let a = RenderRequest::new("A.B")
            .with_parameter("x", "1")
            .with_parameter("y", "2");
        let b = RenderRequest::new("A.B")
            .with_parameter("y", "2")
            .with_parameter("x", "1");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_refresh_bypasses_lookup_but_not_key() {
        let tmp = TempDir::new().unwrap();
        let cache = RenderingCache::new(&file_cache(&tmp), Vec::new());
        let plain = RenderRequest::new("A.B");
        let refresh = plain.clone().with_parameter(REFRESH_PARAMETER, "1");
        assert_eq!(plain.cache_key(), refresh.cache_key());

        cache.set_rendered_content(&plain, "s", "old", &[]);
        assert_eq!(cache.get_rendered_content(&refresh, "s", &mut []), None);

        cache.set_rendered_content(&refresh, "s", "new", &[]);
        assert_eq!(
            cache.get_rendered_content(&plain, "s", &mut []),
            Some("new".to_owned())
        );
    }

    #[test]
    fn test_only_matching_documents_are_cached() {
        let tmp = TempDir::new().unwrap();
        let patterns = vec![Regex::new(r"^Main\.").unwrap()];
        let cache = RenderingCache::new(&file_cache(&tmp), patterns);
        assert!(cache.is_cacheable("Main.WebHome"));
        assert!(!cache.is_cacheable("Sandbox.Test"));

        let request = RenderRequest::new("Sandbox.Test");
        cache.set_rendered_content(&request, "s", "text", &[]);
        assert_eq!(cache.get_rendered_content(&request, "s", &mut []), None);
    }

    #[test]
    fn test_extension_snapshots_restored_on_hit() {
        let tmp = TempDir::new().unwrap();
        let cache = RenderingCache::new(&file_cache(&tmp), Vec::new());
        let request = RenderRequest::new("A.B");

        let rendered = Headings {
            titles: vec!["Intro".to_owned(), "Usage".to_owned()],
        };
        cache.set_rendered_content(&request, "s", "text", &[&rendered]);

        let mut fresh = Headings { titles: Vec::new() };
        let hit = cache.get_rendered_content(&request, "s", &mut [&mut fresh]);
        assert_eq!(hit.as_deref(), Some("text"));
        assert_eq!(fresh.titles, vec!["Intro".to_owned(), "Usage".to_owned()]);
    }

    #[test]
    fn test_null_cache_always_misses() {
        let cache = RenderingCache::new(&NullCache, Vec::new());
        let request = RenderRequest::new("A.B");
        cache.set_rendered_content(&request, "s", "text", &[]);
        assert_eq!(cache.get_rendered_content(&request, "s", &mut []), None);
    }

    #[test]
    fn test_request_defaults() {
        let request = RenderRequest::new("A.B");
        assert_eq!(request.action(), "view");
        assert!(!request.is_refresh());
        assert!(!request.clone().with_parameter("refresh", "0").is_refresh());
    }
}
