//! Image pipeline error types.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, ImageError>;

/// Errors surfaced by the cover image pipeline.
///
/// The type is `Clone` so a single failed fill can be handed to every
/// request waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// The transport could not produce the resource.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The bytes were retrieved but are not a usable image.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Reading or writing the disk tier failed.
    #[error("io error: {0}")]
    Io(String),

    /// The request was cancelled before a result was delivered.
    #[error("request cancelled")]
    Cancelled,

    /// The cache could not be constructed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ImageError {
    /// Creates fetch error.
    #[must_use]
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates io error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Creates configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns whether this is a cancellation rather than a real failure.
    ///
    /// Callers should not report cancellations as errors.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns whether the cached bytes were found to be undecodable.
    #[must_use]
    pub const fn is_decode_error(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl From<std::io::Error> for ImageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(ImageError::Cancelled.is_cancelled());
        assert!(!ImageError::fetch("x").is_cancelled());
        assert!(ImageError::decode("x").is_decode_error());
        assert!(!ImageError::io("x").is_decode_error());
    }

    #[test]
    fn test_io_conversion() {
        let err: ImageError = std::io::Error::other("disk full").into();
        assert_eq!(err, ImageError::Io("disk full".to_string()));
    }
}
