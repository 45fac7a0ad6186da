//! Domain types for cover image caching.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::Bitmap;

/// Content-addressed identifier of a resource in the disk tier.
///
/// The key is the lowercase hex SHA-256 digest of the resource URI, so it is
/// fixed width, filesystem safe and stable across process restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiskKey(String);

impl DiskKey {
    /// Length of a rendered key in characters.
    pub const LEN: usize = 64;

    /// Derives the key for a resource URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(uri.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Parses a previously rendered key, e.g. a cache file stem.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = raw.len() == Self::LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(raw.to_string()))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DiskKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a decoded image should be sized for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplaySizePolicy {
    /// Scale to exactly `height` pixels, width follows the aspect ratio.
    HeightPreservingAspect {
        /// Requested height in pixels.
        height: u32,
    },
    /// Fit inside a `width` x `height` box, preserving the aspect ratio.
    ScaleSizeHint {
        /// Box width in pixels.
        width: u32,
        /// Box height in pixels.
        height: u32,
    },
    /// Decode at native resolution.
    ScalePreserve,
}

impl DisplaySizePolicy {
    /// Shorthand for [`DisplaySizePolicy::HeightPreservingAspect`].
    #[must_use]
    pub const fn height(height: u32) -> Self {
        Self::HeightPreservingAspect { height }
    }
}

impl std::fmt::Display for DisplaySizePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HeightPreservingAspect { height } => write!(f, "h{height}"),
            Self::ScaleSizeHint { width, height } => write!(f, "{width}x{height}"),
            Self::ScalePreserve => write!(f, "native"),
        }
    }
}

/// Key of the memory tier: the resource plus the size it was decoded for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoryKey {
    /// Resource URI.
    pub uri: String,
    /// Size policy the bitmap was produced with.
    pub policy: DisplaySizePolicy,
}

impl MemoryKey {
    /// Creates a key from its parts.
    #[must_use]
    pub fn new(uri: impl Into<String>, policy: DisplaySizePolicy) -> Self {
        Self {
            uri: uri.into(),
            policy,
        }
    }
}

impl std::fmt::Display for MemoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.uri, self.policy)
    }
}

/// Logical class of a request, used to keep thumbnails from starving covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FetchClass {
    /// Small images shown in lists and grids.
    Thumbnail,
    /// Full covers shown in detail views.
    #[default]
    Cover,
}

impl std::fmt::Display for FetchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Thumbnail => write!(f, "thumbnail"),
            Self::Cover => write!(f, "cover"),
        }
    }
}

/// Where an image was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Loaded from in-memory LRU cache.
    MemoryCache,
    /// Decoded from bytes already in the disk cache.
    DiskCache,
    /// Fetched through the transport (network or placeholder generator).
    Network,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoryCache => write!(f, "memory"),
            Self::DiskCache => write!(f, "disk"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// A decoded image together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Resource URI.
    pub uri: String,
    /// Size policy the bitmap was produced with.
    pub policy: DisplaySizePolicy,
    /// The decoded bitmap, shared with the memory cache.
    pub bitmap: Arc<Bitmap>,
    /// Tier that satisfied the request.
    pub source: ImageSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_key_from_uri() {
        let key = DiskKey::from_uri("https://example.com/covers/1.jpg");
        assert_eq!(key.as_str().len(), DiskKey::LEN);
        assert!(DiskKey::parse(key.as_str()).is_some());
    }

    #[test]
    fn test_disk_key_consistency() {
        let uri = "https://example.com/image.png";
        assert_eq!(DiskKey::from_uri(uri), DiskKey::from_uri(uri));
        assert_ne!(
            DiskKey::from_uri(uri),
            DiskKey::from_uri("https://example.com/image.jpg")
        );
    }

    #[test]
    fn test_disk_key_known_digest() {
        // SHA-256 of the empty string.
        assert_eq!(
            DiskKey::from_uri("").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_disk_key_parse_rejects_garbage() {
        assert!(DiskKey::parse("not-a-key").is_none());
        assert!(DiskKey::parse(&"A".repeat(64)).is_none());
    }

    #[test]
    fn test_memory_key_distinguishes_policy() {
        let a = MemoryKey::new("u", DisplaySizePolicy::height(100));
        let b = MemoryKey::new("u", DisplaySizePolicy::height(200));
        let c = MemoryKey::new("u", DisplaySizePolicy::height(100));
        assert_ne!(a, b);
        assert_eq!(a, c);
    }
}
