use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::domain::errors::CacheResult;
use crate::domain::ports::TransportPort;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::image::{
    CoverCache, CoverGenerator, DiskImageCache, HttpTransport, ImageLoader, MemoryImageCache,
    RoutingTransport, ScalingDecoder,
};

/// Wires the cache tiers, decoder, transports and loader together.
///
/// Build one per process and share it; every tier is internally synchronised.
#[derive(Debug, Clone)]
pub struct CoverService {
    loader: Arc<ImageLoader>,
    generator: Arc<CoverGenerator>,
}

impl CoverService {
    /// Builds the service with an HTTP network transport.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or the disk cache
    /// directory cannot be opened.
    pub async fn new(config: &AppConfig) -> CacheResult<Self> {
        let http = HttpTransport::new(
            Duration::from_secs(config.loader.timeout_secs),
            config.loader.user_agent.as_deref(),
        )?;
        Self::with_transport(config, Arc::new(http)).await
    }

    /// Builds the service over a caller-supplied network transport.
    ///
    /// Generated placeholder URIs never reach `network`.
    ///
    /// # Errors
    /// Returns an error if the disk cache directory cannot be opened.
    pub async fn with_transport(
        config: &AppConfig,
        network: Arc<dyn TransportPort>,
    ) -> CacheResult<Self> {
        let cache_dir = config.cache.effective_directory();
        let disk = DiskImageCache::new(cache_dir.clone(), config.cache.disk_max_bytes).await?;
        let memory = Arc::new(MemoryImageCache::new(config.cache.memory_max_bytes));

        let generator = Arc::new(CoverGenerator::new());
        let transport = Arc::new(RoutingTransport::new(generator.clone(), network));

        let cache = Arc::new(CoverCache::new(
            memory,
            disk,
            Arc::new(ScalingDecoder::new()),
            transport,
        ));
        let loader = Arc::new(ImageLoader::new(config.loader.loader_config(), cache));

        info!(
            cache_dir = %cache_dir.display(),
            disk_max_bytes = config.cache.disk_max_bytes,
            memory_max_bytes = config.cache.memory_max_bytes,
            "Cover service ready"
        );

        Ok(Self { loader, generator })
    }

    /// The shared image loader.
    #[must_use]
    pub const fn loader(&self) -> &Arc<ImageLoader> {
        &self.loader
    }

    /// The placeholder generator.
    #[must_use]
    pub fn generator(&self) -> &CoverGenerator {
        &self.generator
    }

    /// Returns the book's cover URI, or its placeholder URI when it has none.
    #[must_use]
    pub fn cover_uri_or_placeholder(cover_uri: Option<&str>, title: &str, author: &str) -> String {
        match cover_uri.map(str::trim) {
            Some(uri) if !uri.is_empty() => uri.to_string(),
            _ => CoverGenerator::generate_uri_for_title_author(title, author),
        }
    }
}
