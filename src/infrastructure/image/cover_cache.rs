//! Two-tier cover cache: decoded bitmaps in memory over raw bytes on disk.
//!
//! A miss in memory fills through the disk tier (which fetches through the
//! transport on its own miss) and the decoder. Concurrent requests for the
//! same `(uri, policy)` share one fill; its result, success or error, goes to
//! every waiter and nothing is remembered once it completes.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::domain::entities::{Bitmap, DiskKey, DisplaySizePolicy, ImageSource, LoadedImage, MemoryKey};
use crate::domain::errors::{CacheResult, ImageError};
use crate::domain::ports::{ImageDecoderPort, TransportPort};

use super::disk_cache::DiskImageCache;
use super::memory_cache::MemoryImageCache;

type FillOutput = CacheResult<(Arc<Bitmap>, ImageSource)>;
type SharedFill = Shared<BoxFuture<'static, FillOutput>>;

/// An in-flight fill and the number of requests still waiting on it.
struct InFlight {
    id: u64,
    fill: SharedFill,
    waiters: Arc<AtomicUsize>,
}

/// Decrements the waiter count when a request stops waiting, including when
/// its task is aborted.
struct WaiterGuard(Arc<AtomicUsize>);

impl Drop for WaiterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Memory tier over disk tier, parameterised over the decode strategy.
pub struct CoverCache<D> {
    memory: Arc<MemoryImageCache>,
    disk: DiskImageCache,
    decoder: Arc<D>,
    transport: Arc<dyn TransportPort>,
    in_flight: Arc<Mutex<HashMap<MemoryKey, InFlight>>>,
    next_fill_id: AtomicU64,
}

impl<D> std::fmt::Debug for CoverCache<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverCache")
            .field("disk", &self.disk)
            .field("memory_bytes", &self.memory.current_size())
            .finish_non_exhaustive()
    }
}

impl<D: ImageDecoderPort> CoverCache<D> {
    /// Builds the cache from its tiers.
    #[must_use]
    pub fn new(
        memory: Arc<MemoryImageCache>,
        disk: DiskImageCache,
        decoder: Arc<D>,
        transport: Arc<dyn TransportPort>,
    ) -> Self {
        Self {
            memory,
            disk,
            decoder,
            transport,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_fill_id: AtomicU64::new(0),
        }
    }

    /// Returns the bitmap for `uri` at `policy`.
    ///
    /// The returned bitmap is shared with the memory tier and must be treated
    /// as read-only.
    ///
    /// # Errors
    /// Returns [`ImageError::Fetch`], [`ImageError::Io`] or
    /// [`ImageError::Decode`]; a decode failure also evicts the disk entry.
    pub async fn get(&self, uri: &str, policy: DisplaySizePolicy) -> CacheResult<Arc<Bitmap>> {
        Ok(self.load(uri, policy).await?.bitmap)
    }

    /// Like [`get`](Self::get), also reporting which tier satisfied the request.
    ///
    /// # Errors
    /// See [`get`](Self::get).
    pub async fn load(&self, uri: &str, policy: DisplaySizePolicy) -> CacheResult<LoadedImage> {
        let key = MemoryKey::new(uri, policy);

        if let Some(bitmap) = self.memory.get(&key) {
            return Ok(LoadedImage {
                uri: uri.to_string(),
                policy,
                bitmap,
                source: ImageSource::MemoryCache,
            });
        }

        let (fill, _guard) = self.join_or_start(&key);
        let (bitmap, source) = fill.await?;

        Ok(LoadedImage {
            uri: uri.to_string(),
            policy,
            bitmap,
            source,
        })
    }

    /// Number of fills currently running.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// The memory tier.
    #[must_use]
    pub fn memory(&self) -> &MemoryImageCache {
        &self.memory
    }

    /// The disk tier.
    #[must_use]
    pub const fn disk(&self) -> &DiskImageCache {
        &self.disk
    }

    fn join_or_start(&self, key: &MemoryKey) -> (SharedFill, WaiterGuard) {
        let mut in_flight = self.in_flight.lock();

        // A fill whose waiters all left may already have given up; start afresh.
        if let Some(existing) = in_flight.get(key)
            && existing
                .waiters
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n > 0).then_some(n + 1))
                .is_ok()
        {
            trace!(key = %key, "Joining in-flight fill");
            return (existing.fill.clone(), WaiterGuard(existing.waiters.clone()));
        }

        let id = self.next_fill_id.fetch_add(1, Ordering::Relaxed);
        let waiters = Arc::new(AtomicUsize::new(1));
        let task = FillTask {
            id,
            key: key.clone(),
            memory: self.memory.clone(),
            disk: self.disk.clone(),
            decoder: self.decoder.clone(),
            transport: self.transport.clone(),
            in_flight: self.in_flight.clone(),
            waiters: waiters.clone(),
        };

        // Aborting one waiter must not tear down a fill others are awaiting.
        let handle = tokio::spawn(task.run());
        let fill = async move {
            handle
                .await
                .unwrap_or_else(|e| Err(ImageError::io(format!("Fill task failed: {e}"))))
        }
        .boxed()
        .shared();

        in_flight.insert(
            key.clone(),
            InFlight {
                id,
                fill: fill.clone(),
                waiters: waiters.clone(),
            },
        );
        (fill, WaiterGuard(waiters))
    }
}

/// Removes a fill from the in-flight table when it finishes or panics.
///
/// Only the entry with a matching id is removed, so a replacement fill
/// started for the same key is left alone.
struct Registration<'a> {
    id: u64,
    key: &'a MemoryKey,
    in_flight: &'a Mutex<HashMap<MemoryKey, InFlight>>,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock();
        if in_flight.get(self.key).is_some_and(|entry| entry.id == self.id) {
            in_flight.remove(self.key);
        }
    }
}

/// Everything a fill needs, detached from the cache's lifetime.
struct FillTask<D> {
    id: u64,
    key: MemoryKey,
    memory: Arc<MemoryImageCache>,
    disk: DiskImageCache,
    decoder: Arc<D>,
    transport: Arc<dyn TransportPort>,
    in_flight: Arc<Mutex<HashMap<MemoryKey, InFlight>>>,
    waiters: Arc<AtomicUsize>,
}

impl<D: ImageDecoderPort> FillTask<D> {
    async fn run(self) -> FillOutput {
        let _registration = Registration {
            id: self.id,
            key: &self.key,
            in_flight: &self.in_flight,
        };
        self.fill().await
    }

    fn abandoned(&self) -> bool {
        self.waiters.load(Ordering::Acquire) == 0
    }

    async fn fill(&self) -> FillOutput {
        // A fill that completed just before this one started may have stored it.
        if let Some(bitmap) = self.memory.peek(&self.key) {
            return Ok((bitmap, ImageSource::MemoryCache));
        }

        let uri = self.key.uri.as_str();
        let disk_key = DiskKey::from_uri(uri);
        let source = if self.disk.contains(&disk_key) {
            ImageSource::DiskCache
        } else {
            ImageSource::Network
        };

        let waiters = self.waiters.clone();
        let bytes = self
            .disk
            .get_or_fetch_unless(uri, self.transport.as_ref(), move || {
                waiters.load(Ordering::Acquire) == 0
            })
            .await?;

        let decoder = self.decoder.clone();
        let policy = self.key.policy;
        let decoded = tokio::task::spawn_blocking(move || decoder.decode(&bytes, policy))
            .await
            .map_err(|e| ImageError::decode(format!("Decode task failed: {e}")))?;

        let bitmap = match decoded {
            Ok(bitmap) => Arc::new(bitmap),
            Err(e) => {
                if e.is_decode_error() {
                    warn!(key = %disk_key, uri = %uri, error = %e, "Cached bytes undecodable, evicting");
                    self.disk.evict(&disk_key).await;
                }
                return Err(e);
            }
        };

        if self.abandoned() {
            debug!(key = %self.key, "Fill abandoned before memory store");
            return Err(ImageError::Cancelled);
        }

        self.memory.put(self.key.clone(), bitmap.clone());
        debug!(key = %self.key, source = %source, "Image loaded");
        Ok((bitmap, source))
    }
}
