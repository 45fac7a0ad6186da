//! Cover image infrastructure.
//!
//! This module provides:
//! - Disk caching of raw fetched bytes with LRU eviction by size
//! - Decoding and scaling into RGB565 bitmaps
//! - Memory caching of decoded bitmaps with LRU eviction by size
//! - The two-tier cover cache and its async loading facade
//! - HTTP and routing transports, and placeholder cover generation

pub mod cover_cache;
pub mod decoder;
pub mod disk_cache;
pub mod generator;
pub mod loader;
pub mod memory_cache;
pub mod transport;

pub use cover_cache::CoverCache;
pub use decoder::{ScalingDecoder, sniff_dimensions, subsample_factor};
pub use disk_cache::{DiskImageCache, default_cache_dir};
pub use generator::{CoverGenerator, GENERATED_SCHEME, parse_generated_uri};
pub use loader::{ImageLoader, ImageLoaderConfig, ImageRequest};
pub use memory_cache::{CacheStats, MemoryImageCache};
pub use transport::{HttpTransport, RoutingTransport};
