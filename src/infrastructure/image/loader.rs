//! Async image loading facade.
//!
//! Requests run on the tokio runtime, bounded per [`FetchClass`] by a
//! semaphore, and report back through an [`ImageListener`] and a cancellable
//! [`ImageRequest`] future.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::task::{Context, Poll};

use tokio::sync::{Semaphore, oneshot};
use tokio::task::AbortHandle;
use tracing::{debug, info, trace, warn};

use crate::domain::entities::{Bitmap, DisplaySizePolicy, FetchClass, LoadedImage};
use crate::domain::errors::{CacheResult, ImageError};
use crate::domain::ports::{ImageDecoderPort, ImageListener};

use super::cover_cache::CoverCache;
use super::decoder::ScalingDecoder;
use super::memory_cache::CacheStats;

/// Configuration for the image loader.
#[derive(Debug, Clone)]
pub struct ImageLoaderConfig {
    /// Maximum concurrent cover requests.
    pub max_concurrent_covers: usize,
    /// Maximum concurrent thumbnail requests.
    pub max_concurrent_thumbnails: usize,
}

impl Default for ImageLoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_covers: 4,
            max_concurrent_thumbnails: 2,
        }
    }
}

const PENDING: u8 = 0;
const DELIVERED: u8 = 1;
const CANCELLED: u8 = 2;

/// Handle to an asynchronous image request.
///
/// Awaiting the handle yields the result; [`cancel`](Self::cancel) stops
/// delivery. Dropping the handle does not cancel the request, so the
/// listener still fires.
#[derive(Debug)]
pub struct ImageRequest {
    uri: String,
    state: Arc<AtomicU8>,
    result_rx: oneshot::Receiver<CacheResult<Arc<Bitmap>>>,
    task: AbortHandle,
}

impl ImageRequest {
    /// Cancels the request.
    ///
    /// Returns `false` if the result had already been delivered, in which
    /// case cancelling has no effect.
    pub fn cancel(&self) -> bool {
        let cancelled = self
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if cancelled {
            self.task.abort();
            debug!(uri = %self.uri, "Cancelled image request");
        }
        cancelled
    }

    /// Returns true if the request was cancelled before delivery.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    /// Returns true once a result has been delivered.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.load(Ordering::Acquire) == DELIVERED
    }

    /// The requested URI.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl Future for ImageRequest {
    type Output = CacheResult<Arc<Bitmap>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.is_cancelled() {
            return Poll::Ready(Err(ImageError::Cancelled));
        }
        Pin::new(&mut self.result_rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(ImageError::Cancelled)))
    }
}

/// Decrements the pending counter when a request task ends or is aborted.
struct PendingGuard(Arc<AtomicUsize>);

impl PendingGuard {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter.clone())
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Orchestrates asynchronous image loading through the cover cache.
pub struct ImageLoader<D = ScalingDecoder> {
    cache: Arc<CoverCache<D>>,
    cover_permits: Arc<Semaphore>,
    thumbnail_permits: Arc<Semaphore>,
    pending: Arc<AtomicUsize>,
    config: ImageLoaderConfig,
}

impl<D> std::fmt::Debug for ImageLoader<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<D: ImageDecoderPort> ImageLoader<D> {
    /// Creates a loader over an existing cache.
    #[must_use]
    pub fn new(config: ImageLoaderConfig, cache: Arc<CoverCache<D>>) -> Self {
        Self {
            cache,
            cover_permits: Arc::new(Semaphore::new(config.max_concurrent_covers.max(1))),
            thumbnail_permits: Arc::new(Semaphore::new(config.max_concurrent_thumbnails.max(1))),
            pending: Arc::new(AtomicUsize::new(0)),
            config,
        }
    }

    fn permits(&self, class: FetchClass) -> Arc<Semaphore> {
        match class {
            FetchClass::Cover => self.cover_permits.clone(),
            FetchClass::Thumbnail => self.thumbnail_permits.clone(),
        }
    }

    /// Starts loading an image in the background.
    ///
    /// Unless the request is cancelled first, the listener is called exactly
    /// once, from a worker task.
    pub fn get(
        &self,
        uri: impl Into<String>,
        policy: DisplaySizePolicy,
        class: FetchClass,
        listener: Arc<dyn ImageListener>,
    ) -> ImageRequest {
        let uri = uri.into();
        let state = Arc::new(AtomicU8::new(PENDING));
        let (result_tx, result_rx) = oneshot::channel();

        let cache = self.cache.clone();
        let permits = self.permits(class);
        let pending = PendingGuard::new(&self.pending);
        let task_state = state.clone();
        let task_uri = uri.clone();

        let handle = tokio::spawn(async move {
            let _pending = pending;
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            if task_state.load(Ordering::Acquire) == CANCELLED {
                return;
            }

            trace!(uri = %task_uri, class = %class, policy = %policy, "Running image request");
            let result = cache.get(&task_uri, policy).await;

            if task_state
                .compare_exchange(PENDING, DELIVERED, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                debug!(uri = %task_uri, "Dropping result of cancelled request");
                return;
            }

            match &result {
                Ok(bitmap) => listener.on_success(&task_uri, bitmap.clone()),
                Err(e) => {
                    if !e.is_cancelled() {
                        debug!(uri = %task_uri, error = %e, "Image request failed");
                    }
                    listener.on_failure(&task_uri, e.clone());
                }
            }
            let _ = result_tx.send(result);
        });

        ImageRequest {
            uri,
            state,
            result_rx,
            task: handle.abort_handle(),
        }
    }

    /// Loads an image directly, checking caches first.
    ///
    /// # Errors
    /// Returns error if the image cannot be fetched or decoded.
    pub async fn load(&self, uri: &str, policy: DisplaySizePolicy) -> CacheResult<LoadedImage> {
        self.cache.load(uri, policy).await
    }

    /// Warms the caches for several images without reporting results.
    pub fn prefetch_batch(&self, images: Vec<(String, DisplaySizePolicy)>, class: FetchClass) {
        for (uri, policy) in images {
            let cache = self.cache.clone();
            let permits = self.permits(class);
            let pending = PendingGuard::new(&self.pending);

            tokio::spawn(async move {
                let _pending = pending;
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                if let Err(e) = cache.get(&uri, policy).await {
                    debug!(uri = %uri, error = %e, "Prefetch failed");
                }
            });
        }
    }

    /// Returns the number of requests not yet finished.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Returns memory cache statistics.
    #[must_use]
    pub fn memory_cache_stats(&self) -> CacheStats {
        self.cache.memory().stats()
    }

    /// The underlying two-tier cache.
    #[must_use]
    pub fn cache(&self) -> &CoverCache<D> {
        &self.cache
    }

    /// Clears all caches.
    pub async fn clear_all(&self) {
        self.cache.memory().clear();
        if let Err(e) = self.cache.disk().clear().await {
            warn!(error = %e, "Failed to clear disk cache");
        }
        info!("Cleared all image caches");
    }
}
