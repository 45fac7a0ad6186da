//! Domain entities.

mod bitmap;
mod cover;

pub use bitmap::{Bitmap, pack_rgb565, unpack_rgb565};
pub use cover::{DiskKey, DisplaySizePolicy, FetchClass, ImageSource, LoadedImage, MemoryKey};
