//! In-memory URL cache implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::domain::ports::{CacheStats, UrlCachePort};

/// Session-scoped, append-only cache of built CDN URLs.
///
/// There is no eviction: the key space is bounded by the distinct images
/// and parameter variants requested during one run.
#[derive(Debug, Default)]
pub struct MemoryUrlCache {
    entries: RwLock<HashMap<String, String>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryUrlCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UrlCachePort for MemoryUrlCache {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read();
        if let Some(url) = entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "URL cache hit");
            Some(url.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "URL cache miss");
            None
        }
    }

    fn insert(&self, key: String, url: String) {
        let mut entries = self.entries.write();
        // Values are deterministic per key, so the first write is as good as any.
        entries.entry(key).or_insert_with_key(|key| {
            debug!(key = %key, "Storing URL in cache");
            url
        });
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[allow(clippy::cast_precision_loss)]
    fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache = MemoryUrlCache::new();
        cache.insert("logo|logo.png|".into(), "https://cdn/logo.png".into());

        assert_eq!(
            cache.get("logo|logo.png|"),
            Some("https://cdn/logo.png".to_string())
        );
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_first_write_is_kept() {
        let cache = MemoryUrlCache::new();
        cache.insert("k".into(), "first".into());
        cache.insert("k".into(), "second".into());

        assert_eq!(cache.get("k"), Some("first".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stats() {
        let cache = MemoryUrlCache::new();
        assert!(cache.is_empty());
        cache.insert("k".into(), "v".into());

        let _ = cache.get("k");
        let _ = cache.get("other");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert!((stats.hit_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(
            stats.to_string(),
            "URL cache: 1 entries, 50.0% hit rate (1 hits, 1 misses)"
        );
    }
}
