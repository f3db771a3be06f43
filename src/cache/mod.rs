//! Page cache
//!
//! An injectable store of fetched page bodies keyed by URL. Entries are
//! immutable for the lifetime of the cache: once a page has been fetched in a
//! run it is never refetched or replaced, so there is no expiry.

use std::collections::HashMap;
use std::sync::RwLock;

/// Storage for fetched page bodies
pub trait PageCache: Send + Sync {
    /// Returns the cached body for `url`, if any
    fn get(&self, url: &str) -> Option<String>;

    /// Stores `body` for `url`; an existing entry is kept
    fn put(&self, url: &str, body: String);

    /// Number of cached pages
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory cache shared by all workers of a run
#[derive(Debug, Default)]
pub struct MemoryPageCache {
    pages: RwLock<HashMap<String, String>>,
}

impl MemoryPageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates a cache, e.g. from saved pages for offline runs
    pub fn with_pages<I, K, V>(pages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pages = pages
            .into_iter()
            .map(|(url, body)| (url.into(), body.into()))
            .collect();
        Self {
            pages: RwLock::new(pages),
        }
    }
}

impl PageCache for MemoryPageCache {
    fn get(&self, url: &str) -> Option<String> {
        let pages = self.pages.read().unwrap_or_else(|e| e.into_inner());
        pages.get(url).cloned()
    }

    fn put(&self, url: &str, body: String) {
        let mut pages = self.pages.write().unwrap_or_else(|e| e.into_inner());
        pages.entry(url.to_string()).or_insert(body);
    }

    fn len(&self) -> usize {
        self.pages.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}
