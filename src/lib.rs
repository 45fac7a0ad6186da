//! Shelfcache - cover image caching for e-reader libraries.
//!
//! This crate fetches book cover images, keeps the raw bytes in a size-bounded
//! disk cache, decodes and scales them into compact bitmaps held in a
//! size-bounded memory cache, and renders placeholder covers for books
//! without one.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer composing the cache pipeline.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing cache, decoder and transport adapters.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "shelfcache";
