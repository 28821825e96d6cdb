//! In-memory LRU image cache bounded by decoded pixel bytes.

use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::entities::{CachedImage, image_weight};

/// Default budget: 32 KiB x 1024 bytes of decoded pixel data.
pub const DEFAULT_CACHE_BUDGET: usize = 32 * 1024 * 1024;

struct Inner {
    entries: LruCache<String, CachedImage>,
    bytes_used: usize,
}

/// LRU cache of decoded images keyed by URL.
///
/// Bounded by the total weight of the cached pixel buffers rather than by
/// entry count. `get` promotes recency, `put` evicts least recently used
/// entries until the cache is back under budget.
pub struct ImageCache {
    inner: Mutex<Inner>,
    budget: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ImageCache {
    /// Creates a cache holding at most `budget` bytes of pixel data.
    #[must_use]
    pub fn new(budget: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::unbounded(),
                bytes_used: 0,
            }),
            budget,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Creates a cache with the default budget.
    #[must_use]
    pub fn with_default_budget() -> Self {
        Self::new(DEFAULT_CACHE_BUDGET)
    }

    /// Returns the configured budget in bytes.
    #[must_use]
    pub const fn budget(&self) -> usize {
        self.budget
    }

    /// Looks up an image, marking it most recently used.
    pub fn get(&self, url: &str) -> Option<CachedImage> {
        let mut inner = self.inner.lock();
        if let Some(img) = inner.entries.get(url) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(url, "Memory cache hit");
            Some(img.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(url, "Memory cache miss");
            None
        }
    }

    /// Looks up an image without touching recency or statistics.
    pub fn peek(&self, url: &str) -> Option<CachedImage> {
        self.inner.lock().entries.peek(url).cloned()
    }

    /// Stores an image, evicting least recently used entries as needed.
    ///
    /// An image heavier than the whole budget is not stored.
    pub fn put(&self, url: impl Into<String>, image: CachedImage) {
        let url = url.into();
        let weight = image_weight(&image);
        if weight > self.budget {
            debug!(url = %url, weight, budget = self.budget, "Image exceeds cache budget, not cached");
            return;
        }

        let mut inner = self.inner.lock();
        if let Some(old) = inner.entries.put(url.clone(), image) {
            inner.bytes_used = inner.bytes_used.saturating_sub(image_weight(&old));
        }
        inner.bytes_used += weight;
        debug!(url = %url, weight, "Storing image in memory cache");

        while inner.bytes_used > self.budget {
            let Some((evicted_url, evicted)) = inner.entries.pop_lru() else {
                break;
            };
            inner.bytes_used = inner.bytes_used.saturating_sub(image_weight(&evicted));
            self.evictions.fetch_add(1, Ordering::Relaxed);
            trace!(url = %evicted_url, "Evicted image from memory cache");
        }
    }

    /// Removes every entry.
    pub fn evict_all(&self) {
        let mut inner = self.inner.lock();
        let count = inner.entries.len();
        inner.entries.clear();
        inner.bytes_used = 0;
        debug!(count, "Cleared memory image cache");
    }

    /// Number of cached images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total weight of cached images.
    #[must_use]
    pub fn bytes_used(&self) -> usize {
        self.inner.lock().bytes_used
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let inner = self.inner.lock();
        CacheStats {
            hits,
            misses,
            evictions: self.evictions.load(Ordering::Relaxed),
            hit_rate,
            size: inner.entries.len(),
            bytes_used: inner.bytes_used,
        }
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::with_default_budget()
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries evicted to stay under budget.
    pub evictions: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
    /// Current weight of cached images in bytes.
    pub bytes_used: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {} bytes, {:.1}% hit rate ({} hits, {} misses, {} evicted)",
            self.size, self.bytes_used, self.hit_rate, self.hits, self.misses, self.evictions
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use test_case::test_case;

    use super::*;

    // 10x10 RGB = 300 bytes.
    fn img() -> CachedImage {
        Arc::new(image::DynamicImage::new_rgb8(10, 10))
    }

    #[test]
    fn test_cache_put_and_get() {
        let cache = ImageCache::new(1024);
        cache.put("a", img());

        let retrieved = cache.get("a");
        assert!(retrieved.is_some());
        assert_eq!(retrieved.map(|i| i.width()), Some(10));
        assert_eq!(cache.bytes_used(), 300);
    }

    #[test]
    fn test_cache_miss() {
        let cache = ImageCache::new(1024);
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_eviction_by_weight() {
        let cache = ImageCache::new(700);
        cache.put("a", img());
        cache.put("b", img());
        cache.put("c", img());

        // "a" should be evicted (LRU)
        assert!(cache.peek("a").is_none());
        assert!(cache.peek("b").is_some());
        assert!(cache.peek("c").is_some());
        assert_eq!(cache.bytes_used(), 600);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_get_promotes_recency() {
        let cache = ImageCache::new(700);
        cache.put("a", img());
        cache.put("b", img());

        let _ = cache.get("a");
        cache.put("c", img());

        assert!(cache.peek("a").is_some());
        assert!(cache.peek("b").is_none());
    }

    #[test]
    fn test_peek_does_not_promote() {
        let cache = ImageCache::new(700);
        cache.put("a", img());
        cache.put("b", img());

        let _ = cache.peek("a");
        cache.put("c", img());

        assert!(cache.peek("a").is_none());
    }

    #[test]
    fn test_large_put_evicts_several() {
        let cache = ImageCache::new(1000);
        cache.put("a", img());
        cache.put("b", img());
        cache.put("c", img());
        // 20x10 RGB = 600 bytes
        cache.put("big", Arc::new(image::DynamicImage::new_rgb8(20, 10)));

        assert_eq!(cache.len(), 2);
        assert!(cache.peek("c").is_some());
        assert!(cache.peek("big").is_some());
        assert_eq!(cache.bytes_used(), 900);
    }

    #[test_case(299, false ; "over_budget_not_stored")]
    #[test_case(300, true ; "exactly_budget_stored")]
    fn test_oversized_image(budget: usize, stored: bool) {
        let cache = ImageCache::new(budget);
        cache.put("a", img());
        assert_eq!(cache.peek("a").is_some(), stored);
    }

    #[test]
    fn test_replace_keeps_weight_consistent() {
        let cache = ImageCache::new(1024);
        cache.put("a", img());
        cache.put("a", Arc::new(image::DynamicImage::new_rgb8(5, 10)));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.bytes_used(), 150);
    }

    #[test]
    fn test_evict_all() {
        let cache = ImageCache::new(1024);
        cache.put("a", img());
        cache.put("b", img());
        cache.evict_all();
        assert!(cache.is_empty());
        assert_eq!(cache.bytes_used(), 0);
    }

    #[test]
    fn test_cache_stats() {
        let cache = ImageCache::new(1024);
        cache.put("a", img());

        // Hit
        let _ = cache.get("a");
        // Miss
        let _ = cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert!(stats.to_string().contains("50.0% hit rate"));
    }
}
