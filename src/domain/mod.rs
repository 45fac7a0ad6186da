//! Domain layer with core value types, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{Bitmap, DisplaySizePolicy, FetchClass, LoadedImage};
pub use errors::{CacheResult, ImageError};
pub use ports::{ImageDecoderPort, ImageListener, TransportPort};
