//! In-memory LRU cache of decoded bitmaps, bounded by allocation size.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::entities::{Bitmap, MemoryKey};

/// Default memory budget for decoded bitmaps (32 MB).
pub const DEFAULT_MAX_MEMORY_BYTES: usize = 32 * 1024 * 1024;

struct MemoryState {
    entries: LruCache<MemoryKey, Arc<Bitmap>>,
    total: usize,
}

/// In-memory LRU cache for decoded bitmaps.
///
/// Capacity is measured in decoded bytes, not entries, so it tracks actual
/// memory pressure. Eviction never touches the disk tier.
pub struct MemoryImageCache {
    state: Mutex<MemoryState>,
    max_bytes: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryImageCache {
    /// Creates a new cache with the specified byte budget.
    #[must_use]
    pub fn new(max_bytes: usize) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                entries: LruCache::unbounded(),
                total: 0,
            }),
            max_bytes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Looks up a bitmap and marks it most recently used.
    pub fn get(&self, key: &MemoryKey) -> Option<Arc<Bitmap>> {
        let mut state = self.state.lock();
        if let Some(bitmap) = state.entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache hit");
            Some(bitmap.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache miss");
            None
        }
    }

    /// Peeks at a bitmap without promoting it in the LRU.
    pub fn peek(&self, key: &MemoryKey) -> Option<Arc<Bitmap>> {
        self.state.lock().entries.peek(key).cloned()
    }

    /// Stores a bitmap, evicting least recently used entries past the budget.
    ///
    /// A bitmap larger than the whole budget is not retained.
    pub fn put(&self, key: MemoryKey, bitmap: Arc<Bitmap>) {
        let size = bitmap.byte_size();
        if size > self.max_bytes {
            debug!(key = %key, size = size, "Bitmap exceeds memory budget, not caching");
            return;
        }

        let mut state = self.state.lock();
        debug!(key = %key, size = size, "Storing bitmap in memory cache");
        if let Some((_, old)) = state.entries.push(key, bitmap) {
            state.total -= old.byte_size();
        }
        state.total += size;

        while state.total > self.max_bytes {
            let Some((evicted, old)) = state.entries.pop_lru() else {
                break;
            };
            state.total -= old.byte_size();
            debug!(key = %evicted, size = old.byte_size(), "Evicted bitmap from memory cache");
        }
    }

    /// Removes a bitmap from the cache.
    pub fn evict(&self, key: &MemoryKey) {
        let mut state = self.state.lock();
        if let Some(old) = state.entries.pop(key) {
            state.total -= old.byte_size();
            debug!(key = %key, "Evicted bitmap from memory cache");
        }
    }

    /// Clears all bitmaps.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.total = 0;
        debug!("Cleared memory image cache");
    }

    /// Returns the number of cached bitmaps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns true if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the decoded bytes currently held.
    #[must_use]
    pub fn current_size(&self) -> usize {
        self.state.lock().total
    }

    /// Returns the configured byte budget.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_bytes
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
        let (size, bytes) = {
            let state = self.state.lock();
            (state.entries.len(), state.total)
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size,
            bytes,
        }
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MEMORY_BYTES)
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached bitmaps.
    pub size: usize,
    /// Decoded bytes currently held.
    pub bytes: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} bitmaps ({} bytes), {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.bytes, self.hit_rate, self.hits, self.misses
        )
    }
}
