//! Application layer composing the cover pipeline.

/// Application services.
pub mod services;

pub use services::CoverService;
