//! Disk-based cover cache for raw fetched bytes.
//!
//! Entries live in one directory as `<sha256 hex>.img`. A byte-weighted LRU
//! index mirrors the directory so eviction never has to rescan it.

use std::fs;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use bytes::Bytes;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::domain::entities::DiskKey;
use crate::domain::errors::{CacheResult, ImageError};
use crate::domain::ports::TransportPort;

/// Maximum disk cache size in bytes (100 MB default).
pub const DEFAULT_MAX_CACHE_SIZE: u64 = 100 * 1024 * 1024;

const ENTRY_EXTENSION: &str = "img";
const TEMP_PREFIX: &str = ".pending-";

/// Disk-based cache that persists raw image bytes keyed by URI digest.
///
/// Cloning is cheap and yields a handle to the same store.
#[derive(Clone)]
pub struct DiskImageCache {
    store: Arc<DiskStore>,
}

impl std::fmt::Debug for DiskImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskImageCache")
            .field("cache_dir", &self.store.cache_dir)
            .field("max_size", &self.store.max_size)
            .finish_non_exhaustive()
    }
}

impl DiskImageCache {
    /// Opens (or creates) a cache in the specified directory.
    ///
    /// Leftovers from interrupted commits are removed and the LRU index is
    /// rebuilt from the surviving entries, oldest modification first.
    ///
    /// # Errors
    /// Returns [`ImageError::Config`] if the directory cannot be created or scanned.
    pub async fn new(cache_dir: PathBuf, max_size: u64) -> CacheResult<Self> {
        let store = tokio::task::spawn_blocking(move || DiskStore::open(cache_dir, max_size))
            .await
            .map_err(|e| ImageError::config(format!("Cache open task failed: {e}")))??;

        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// Returns the cached bytes for `uri`, fetching and committing them on a miss.
    ///
    /// # Errors
    /// Returns [`ImageError::Fetch`] if the transport fails and
    /// [`ImageError::Io`] if the entry cannot be written or read back.
    pub async fn get_or_fetch(&self, uri: &str, transport: &dyn TransportPort) -> CacheResult<Bytes> {
        self.get_or_fetch_unless(uri, transport, || false).await
    }

    /// Like [`get_or_fetch`](Self::get_or_fetch), but skips the commit and
    /// returns [`ImageError::Cancelled`] when `abandoned` reports that nobody
    /// is waiting for the result any more.
    ///
    /// # Errors
    /// See [`get_or_fetch`](Self::get_or_fetch).
    pub async fn get_or_fetch_unless<F>(
        &self,
        uri: &str,
        transport: &dyn TransportPort,
        abandoned: F,
    ) -> CacheResult<Bytes>
    where
        F: Fn() -> bool + Send,
    {
        let key = DiskKey::from_uri(uri);
        if let Some(bytes) = self.get_bytes(&key).await? {
            return Ok(bytes);
        }

        debug!(key = %key, uri = %uri, "Fetching resource for disk cache");
        let fetched = transport.fetch(uri).await?;

        if abandoned() {
            debug!(key = %key, "Request abandoned before commit");
            return Err(ImageError::Cancelled);
        }

        self.put_bytes(&key, fetched).await
    }

    /// Gets raw bytes from the disk cache, promoting the entry on a hit.
    ///
    /// # Errors
    /// Returns [`ImageError::Io`] if an indexed entry exists but cannot be
    /// read; the entry is evicted first.
    pub async fn get_bytes(&self, key: &DiskKey) -> CacheResult<Option<Bytes>> {
        let store = self.store.clone();
        let key = key.clone();
        run_blocking(move || store.read(&key)).await
    }

    /// Commits bytes under `key`, replacing any previous entry, and returns
    /// the bytes as read back from the committed file.
    ///
    /// Entries larger than the whole budget are handed back without being stored.
    ///
    /// # Errors
    /// Returns [`ImageError::Io`] if the entry cannot be written or read back.
    pub async fn put_bytes(&self, key: &DiskKey, bytes: Bytes) -> CacheResult<Bytes> {
        let store = self.store.clone();
        let key = key.clone();
        run_blocking(move || store.commit(&key, bytes)).await
    }

    /// Removes an entry from the disk cache.
    pub async fn evict(&self, key: &DiskKey) {
        let store = self.store.clone();
        let key = key.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || store.remove(&key)).await {
            warn!(error = %e, "Disk eviction task failed");
        }
    }

    /// Clears the entire disk cache.
    ///
    /// # Errors
    /// Returns [`ImageError::Io`] if the cache directory cannot be read.
    pub async fn clear(&self) -> CacheResult<()> {
        let store = self.store.clone();
        run_blocking(move || store.clear()).await
    }

    /// Checks if an entry is cached.
    #[must_use]
    pub fn contains(&self, key: &DiskKey) -> bool {
        self.store.index.lock().entries.contains(key)
    }

    /// Returns the current cache size in bytes.
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.store.index.lock().total
    }

    /// Returns the configured byte budget.
    #[must_use]
    pub fn max_size(&self) -> u64 {
        self.store.max_size
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.index.lock().entries.len()
    }

    /// Returns true if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.store.cache_dir
    }
}

async fn run_blocking<T, F>(f: F) -> CacheResult<T>
where
    F: FnOnce() -> CacheResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ImageError::io(format!("Disk task failed: {e}")))?
}

/// Recency-ordered sizes of the committed entries.
struct DiskIndex {
    entries: LruCache<DiskKey, u64>,
    total: u64,
}

impl DiskIndex {
    fn insert(&mut self, key: DiskKey, size: u64) {
        if let Some((_, old)) = self.entries.push(key, size) {
            self.total -= old;
        }
        self.total += size;
    }

    fn remove(&mut self, key: &DiskKey) -> Option<u64> {
        let size = self.entries.pop(key)?;
        self.total -= size;
        Some(size)
    }
}

/// Bounded LRU byte store. All methods block on filesystem I/O.
///
/// The index lock is held across renames and evictions so that a commit
/// and a concurrent eviction of the same key cannot interleave. Reads happen
/// outside the lock; entries are replaced by atomic rename, so a reader sees
/// either the old or the new file, never a torn one.
struct DiskStore {
    cache_dir: PathBuf,
    max_size: u64,
    index: Mutex<DiskIndex>,
}

impl DiskStore {
    fn open(cache_dir: PathBuf, max_size: u64) -> CacheResult<Self> {
        fs::create_dir_all(&cache_dir)
            .map_err(|e| ImageError::config(format!("Failed to create cache dir: {e}")))?;

        let entries = fs::read_dir(&cache_dir)
            .map_err(|e| ImageError::config(format!("Failed to read cache dir: {e}")))?;

        let mut found: Vec<(DiskKey, SystemTime, u64)> = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if name.starts_with(TEMP_PREFIX) {
                if let Err(e) = fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "Failed to remove stale temp file");
                }
                continue;
            }

            if path.extension().is_none_or(|ext| ext != ENTRY_EXTENSION) {
                continue;
            }

            let Some(key) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(DiskKey::parse)
            else {
                continue;
            };

            if let Ok(meta) = entry.metadata() {
                let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                found.push((key, modified, meta.len()));
            }
        }

        found.sort_by_key(|(_, modified, _)| *modified);

        let mut index = DiskIndex {
            entries: LruCache::unbounded(),
            total: 0,
        };
        for (key, _, size) in found {
            index.insert(key, size);
        }

        debug!(
            dir = %cache_dir.display(),
            entries = index.entries.len(),
            size = index.total,
            max_size = max_size,
            "Opened disk cache"
        );

        let store = Self {
            cache_dir,
            max_size,
            index: Mutex::new(index),
        };
        store.evict_to_budget(&mut store.index.lock());
        Ok(store)
    }

    fn entry_path(&self, key: &DiskKey) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{ENTRY_EXTENSION}", key.as_str()))
    }

    fn read(&self, key: &DiskKey) -> CacheResult<Option<Bytes>> {
        if self.index.lock().entries.get(key).is_none() {
            trace!(key = %key, "Disk cache miss");
            return Ok(None);
        }

        let path = self.entry_path(key);
        match fs::read(&path) {
            Ok(bytes) => {
                trace!(key = %key, size = bytes.len(), "Disk cache hit");
                touch(&path);
                Ok(Some(Bytes::from(bytes)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // A commit may have restored the file since the failed read.
                let mut index = self.index.lock();
                if !path.exists() && index.remove(key).is_some() {
                    debug!(key = %key, "Disk cache entry vanished, dropped from index");
                }
                Ok(None)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read cached entry, evicting");
                self.remove(key);
                Err(ImageError::io(format!("Failed to read cache entry: {e}")))
            }
        }
    }

    fn commit(&self, key: &DiskKey, bytes: Bytes) -> CacheResult<Bytes> {
        let size = bytes.len() as u64;
        if size > self.max_size {
            debug!(key = %key, size = size, max_size = self.max_size, "Entry exceeds disk budget, not caching");
            return Ok(bytes);
        }

        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.cache_dir)
            .map_err(|e| ImageError::io(format!("Failed to create cache file: {e}")))?;

        temp.write_all(&bytes)
            .map_err(|e| ImageError::io(format!("Failed to write cache file: {e}")))?;

        temp.flush()
            .map_err(|e| ImageError::io(format!("Failed to flush cache file: {e}")))?;

        let path = self.entry_path(key);
        let mut file = {
            let mut index = self.index.lock();
            let file = temp
                .persist(&path)
                .map_err(|e| ImageError::io(format!("Failed to commit cache file: {}", e.error)))?;
            index.insert(key.clone(), size);
            self.evict_to_budget(&mut index);
            file
        };

        debug!(key = %key, path = %path.display(), size = size, "Stored entry in disk cache");

        // Read back through the committed handle; a later eviction unlinks the
        // path but cannot invalidate the open file.
        let mut stored = Vec::with_capacity(bytes.len());
        let read_back = file
            .seek(SeekFrom::Start(0))
            .and_then(|_| file.read_to_end(&mut stored));

        match read_back {
            Ok(n) if n == bytes.len() => Ok(Bytes::from(stored)),
            Ok(n) => {
                warn!(key = %key, expected = bytes.len(), actual = n, "Committed entry is truncated");
                self.remove(key);
                Err(ImageError::io("Committed cache entry is truncated"))
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read back committed entry");
                self.remove(key);
                Err(ImageError::io(format!("Failed to read back cache entry: {e}")))
            }
        }
    }

    fn remove(&self, key: &DiskKey) {
        let mut index = self.index.lock();
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => debug!(key = %key, "Evicted from disk cache"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(key = %key, error = %e, "Failed to evict from disk cache"),
        }
        index.remove(key);
    }

    fn clear(&self) -> CacheResult<()> {
        let mut index = self.index.lock();
        let entries = fs::read_dir(&self.cache_dir)
            .map_err(|e| ImageError::io(format!("Failed to read cache dir: {e}")))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION)
                && let Err(e) = fs::remove_file(&path)
            {
                warn!(path = %path.display(), error = %e, "Failed to remove cache file");
            }
        }

        index.entries.clear();
        index.total = 0;
        debug!("Cleared disk cache");
        Ok(())
    }

    /// Drops least recently used entries until the total fits the budget.
    fn evict_to_budget(&self, index: &mut DiskIndex) {
        while index.total > self.max_size {
            let Some((key, size)) = index.entries.pop_lru() else {
                break;
            };
            index.total -= size;

            let path = self.entry_path(&key);
            match fs::remove_file(&path) {
                Ok(()) => debug!(key = %key, size = size, "Evicted least recently used entry"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove evicted file"),
            }
        }
    }
}

/// Bumps the modification time so recency survives a restart.
fn touch(path: &Path) {
    let result = fs::OpenOptions::new()
        .write(true)
        .open(path)
        .and_then(|file| file.set_modified(SystemTime::now()));
    if let Err(e) = result {
        trace!(path = %path.display(), error = %e, "Failed to touch cache entry");
    }
}

/// Returns the default cache directory path.
#[must_use]
pub fn default_cache_dir() -> PathBuf {
    directories::ProjectDirs::from("org", "shelfcache", "shelfcache").map_or_else(
        || std::env::temp_dir().join("shelfcache").join("covers"),
        |dirs| dirs.cache_dir().join("covers"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockTransportPort;
    use std::time::Duration;
    use tempfile::TempDir;

    const MB: usize = 1024 * 1024;

    async fn create_test_cache(max_size: u64) -> (DiskImageCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = DiskImageCache::new(temp_dir.path().to_path_buf(), max_size)
            .await
            .unwrap();
        (cache, temp_dir)
    }

    fn key(name: &str) -> DiskKey {
        DiskKey::from_uri(name)
    }

    #[tokio::test]
    async fn test_put_and_get_bytes() {
        let (cache, _temp) = create_test_cache(1024 * 1024).await;
        let id = key("test1");

        let stored = cache
            .put_bytes(&id, Bytes::from_static(b"test image data"))
            .await
            .unwrap();
        assert_eq!(&stored[..], b"test image data");

        let retrieved = cache.get_bytes(&id).await.unwrap();
        assert_eq!(retrieved.as_deref(), Some(&b"test image data"[..]));
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let (cache, _temp) = create_test_cache(1024).await;
        assert!(cache.get_bytes(&key("nonexistent")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_or_fetch_fetches_once() {
        let (cache, _temp) = create_test_cache(1024).await;
        let mut transport = MockTransportPort::new();
        transport
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(Bytes::from_static(b"cover")));

        let first = cache.get_or_fetch("https://a/1.jpg", &transport).await.unwrap();
        let second = cache.get_or_fetch("https://a/1.jpg", &transport).await.unwrap();

        assert_eq!(first, second);
        assert!(cache.contains(&key("https://a/1.jpg")));
    }

    #[tokio::test]
    async fn test_fetch_failure_creates_no_entry() {
        let (cache, _temp) = create_test_cache(1024).await;
        let mut transport = MockTransportPort::new();
        transport
            .expect_fetch()
            .returning(|_| Err(ImageError::fetch("connection refused")));

        let result = cache.get_or_fetch("https://a/1.jpg", &transport).await;

        assert!(matches!(result, Err(ImageError::Fetch(_))));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_fetch_is_not_committed() {
        let (cache, _temp) = create_test_cache(1024).await;
        let mut transport = MockTransportPort::new();
        transport
            .expect_fetch()
            .returning(|_| Ok(Bytes::from_static(b"cover")));

        let result = cache
            .get_or_fetch_unless("https://a/1.jpg", &transport, || true)
            .await;

        assert_eq!(result, Err(ImageError::Cancelled));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_evict() {
        let (cache, _temp) = create_test_cache(1024).await;
        let id = key("test1");

        cache.put_bytes(&id, Bytes::from_static(b"test")).await.unwrap();
        assert!(cache.contains(&id));

        cache.evict(&id).await;
        assert!(!cache.contains(&id));
        assert_eq!(cache.current_size(), 0);
    }

    #[tokio::test]
    async fn test_clear() {
        let (cache, _temp) = create_test_cache(1024).await;

        cache.put_bytes(&key("test1"), Bytes::from_static(b"data1")).await.unwrap();
        cache.put_bytes(&key("test2"), Bytes::from_static(b"data2")).await.unwrap();
        assert_eq!(cache.len(), 2);

        cache.clear().await.unwrap();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.current_size(), 0);
    }

    #[tokio::test]
    async fn test_size_accounting_on_overwrite() {
        let (cache, _temp) = create_test_cache(1024).await;

        cache.put_bytes(&key("test1"), Bytes::from_static(b"hello")).await.unwrap();
        cache.put_bytes(&key("test2"), Bytes::from_static(b"world!")).await.unwrap();
        assert_eq!(cache.current_size(), 11);

        cache.put_bytes(&key("test1"), Bytes::from_static(b"hey")).await.unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.current_size(), 9);
    }

    #[tokio::test]
    async fn test_oversized_entry_is_returned_but_not_kept() {
        let (cache, _temp) = create_test_cache(4).await;

        let bytes = cache
            .put_bytes(&key("big"), Bytes::from_static(b"too large"))
            .await
            .unwrap();

        assert_eq!(&bytes[..], b"too large");
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_never_exceeded() {
        let (cache, _temp) = create_test_cache(100).await;

        for i in 0..20 {
            let data = Bytes::from(vec![b'x'; 7 + i]);
            cache.put_bytes(&key(&format!("entry{i}")), data).await.unwrap();
            assert!(cache.current_size() <= 100);
        }
    }

    #[tokio::test]
    async fn test_reads_reorder_eviction() {
        let (cache, _temp) = create_test_cache(10).await;
        let blob = || Bytes::from_static(b"abcd");

        cache.put_bytes(&key("a"), blob()).await.unwrap();
        cache.put_bytes(&key("b"), blob()).await.unwrap();
        cache.get_bytes(&key("a")).await.unwrap();
        cache.put_bytes(&key("c"), blob()).await.unwrap();

        assert!(cache.contains(&key("a")));
        assert!(!cache.contains(&key("b")));
        assert!(cache.contains(&key("c")));
    }

    #[tokio::test]
    async fn test_lru_scenario_with_hot_entry() {
        let (cache, _temp) = create_test_cache(10 * MB as u64).await;
        let ids: Vec<DiskKey> = (1..=5).map(|i| key(&format!("entry{i}"))).collect();
        let blob = || Bytes::from(vec![0u8; 3 * MB]);

        for (i, id) in ids.iter().enumerate() {
            cache.put_bytes(id, blob()).await.unwrap();
            assert!(cache.current_size() <= 10 * MB as u64);
            if i < 4 {
                assert!(cache.get_bytes(&ids[0]).await.unwrap().is_some());
            }
        }

        // Entry 1 kept hot, entries 2 and 3 went first in that order.
        assert!(cache.contains(&ids[0]));
        assert!(!cache.contains(&ids[1]));
        assert!(!cache.contains(&ids[2]));
        assert!(cache.contains(&ids[3]));
        assert!(cache.contains(&ids[4]));

        // Once no longer touched, entry 1 is the next to go.
        cache.get_bytes(&ids[3]).await.unwrap();
        cache.get_bytes(&ids[4]).await.unwrap();
        cache.put_bytes(&key("entry6"), blob()).await.unwrap();
        assert!(!cache.contains(&ids[0]));
    }

    #[tokio::test]
    async fn test_reopen_rebuilds_index_and_drops_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_path_buf();

        {
            let cache = DiskImageCache::new(dir.clone(), 1024).await.unwrap();
            cache.put_bytes(&key("a"), Bytes::from_static(b"12345")).await.unwrap();
            cache.put_bytes(&key("b"), Bytes::from_static(b"678")).await.unwrap();
        }
        std::fs::write(dir.join(format!("{TEMP_PREFIX}leftover")), b"partial").unwrap();
        std::fs::write(dir.join("unrelated.txt"), b"ignored").unwrap();

        let cache = DiskImageCache::new(dir.clone(), 1024).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.current_size(), 8);
        assert!(!dir.join(format!("{TEMP_PREFIX}leftover")).exists());
        assert_eq!(
            cache.get_bytes(&key("a")).await.unwrap().as_deref(),
            Some(&b"12345"[..])
        );
    }

    #[tokio::test]
    async fn test_reopen_with_smaller_budget_trims() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_path_buf();

        {
            let cache = DiskImageCache::new(dir.clone(), 1024).await.unwrap();
            for i in 0..4 {
                cache
                    .put_bytes(&key(&format!("e{i}")), Bytes::from_static(b"0123456789"))
                    .await
                    .unwrap();
            }
        }

        let cache = DiskImageCache::new(dir, 25).await.unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.current_size() <= 25);
    }

    #[tokio::test]
    async fn test_externally_deleted_entry_is_a_miss() {
        let (cache, temp) = create_test_cache(1024).await;
        let id = key("gone");
        cache.put_bytes(&id, Bytes::from_static(b"data")).await.unwrap();

        std::fs::remove_file(temp.path().join(format!("{}.img", id.as_str()))).unwrap();

        assert!(cache.get_bytes(&id).await.unwrap().is_none());
        assert!(!cache.contains(&id));
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.current_size(), 0);
    }

    #[tokio::test]
    async fn test_vanished_entry_can_be_stored_again() {
        let (cache, temp) = create_test_cache(1024).await;
        let id = key("again");
        cache.put_bytes(&id, Bytes::from_static(b"first")).await.unwrap();
        std::fs::remove_file(temp.path().join(format!("{}.img", id.as_str()))).unwrap();
        assert!(cache.get_bytes(&id).await.unwrap().is_none());

        cache.put_bytes(&id, Bytes::from_static(b"second")).await.unwrap();

        assert_eq!(cache.get_bytes(&id).await.unwrap().unwrap().as_ref(), b"second");
        assert_eq!(cache.current_size(), 6);
    }

    #[tokio::test]
    async fn test_read_recency_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_path_buf();
        let (a, b) = (key("older"), key("newer"));

        {
            let cache = DiskImageCache::new(dir.clone(), 1024).await.unwrap();
            cache.put_bytes(&a, Bytes::from_static(b"0123456789")).await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            cache.put_bytes(&b, Bytes::from_static(b"0123456789")).await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert!(cache.get_bytes(&a).await.unwrap().is_some());
        }

        let cache = DiskImageCache::new(dir, 15).await.unwrap();
        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert_eq!(cache.current_size(), 10);
    }
}
