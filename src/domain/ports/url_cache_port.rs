//! Port definition for the built-URL cache.

/// Statistics about cache performance.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached URLs.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "URL cache: {} entries, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

/// Append-only map from canonical request key to built URL.
/// Implementations must be thread-safe.
pub trait UrlCachePort: Send + Sync {
    /// Looks up a previously built URL.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores a URL. An existing entry for the same key is kept.
    fn insert(&self, key: String, url: String);

    /// Returns the current number of cached URLs.
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns hit/miss statistics.
    fn stats(&self) -> CacheStats;
}
