//! Port definition for resource transports.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::CacheResult;

/// Turns a resource URI into its raw bytes.
///
/// Failures must be reported as [`ImageError::Fetch`](crate::domain::errors::ImageError::Fetch).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransportPort: Send + Sync {
    /// Fetches the full contents of `uri`.
    async fn fetch(&self, uri: &str) -> CacheResult<Bytes>;
}
