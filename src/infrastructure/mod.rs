//! Infrastructure layer with cache, decoding and transport adapters.

/// Application configuration.
pub mod config;
/// Image handling (disk and memory caching, decoding, loading, placeholders).
pub mod image;

pub use config::{AppConfig, CliArgs, LogLevel, StorageManager};
pub use self::image::{
    CacheStats, CoverCache, CoverGenerator, DiskImageCache, HttpTransport, ImageLoader,
    ImageLoaderConfig, ImageRequest, MemoryImageCache, RoutingTransport, ScalingDecoder,
};
