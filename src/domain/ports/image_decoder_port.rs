//! Port definition for decode strategies.

use crate::domain::entities::{Bitmap, DisplaySizePolicy};
use crate::domain::errors::CacheResult;

/// Decodes raw image bytes into a bitmap sized according to a policy.
///
/// Implementations are CPU bound and are run on the blocking pool.
pub trait ImageDecoderPort: Send + Sync + 'static {
    /// Decodes `bytes` and scales the result for `policy`.
    ///
    /// # Errors
    /// Returns [`ImageError::Decode`](crate::domain::errors::ImageError::Decode)
    /// when the bytes are not a usable image.
    fn decode(&self, bytes: &[u8], policy: DisplaySizePolicy) -> CacheResult<Bitmap>;
}
