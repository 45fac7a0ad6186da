//! Decoding and scaling of cached image bytes.
//!
//! Decoding runs in three passes: a header-only sniff for the native size,
//! a power-of-two reduction towards the requested size, and a final precise
//! resize. JPEG sources are reduced inside the decoder itself; other formats
//! are decoded at native size and then thumbnailed. Output is stored as RGB565.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, Limits, RgbImage};
use jpeg_decoder::PixelFormat;
use tracing::trace;

use crate::domain::entities::{Bitmap, DisplaySizePolicy};
use crate::domain::errors::{CacheResult, ImageError};
use crate::domain::ports::ImageDecoderPort;

/// Largest allocation a single decode may make (256 MB).
pub const DEFAULT_MAX_DECODE_ALLOC: u64 = 256 * 1024 * 1024;

/// Production decode strategy built on the `image` crate.
#[derive(Debug, Clone)]
pub struct ScalingDecoder {
    filter: FilterType,
    max_alloc: u64,
}

impl ScalingDecoder {
    /// Creates a decoder with Lanczos3 resampling.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
            max_alloc: DEFAULT_MAX_DECODE_ALLOC,
        }
    }

    /// Sets the decode allocation limit.
    #[must_use]
    pub const fn with_max_alloc(mut self, max_alloc: u64) -> Self {
        self.max_alloc = max_alloc;
        self
    }

    fn decode_full(&self, bytes: &[u8]) -> CacheResult<DynamicImage> {
        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::decode(format!("Failed to read image header: {e}")))?;

        let mut limits = Limits::default();
        limits.max_alloc = Some(self.max_alloc);
        reader.limits(limits);

        reader
            .decode()
            .map_err(|e| ImageError::decode(format!("Failed to decode image: {e}")))
    }

    /// Decodes JPEG data directly at a reduced DCT scale no smaller than
    /// `min_width` x `min_height`, so native-size pixels are never allocated.
    ///
    /// Returns `None` for other formats and for pixel layouts without a
    /// direct RGB mapping; those take the full decode path.
    fn decode_reduced(
        &self,
        bytes: &[u8],
        min_width: u32,
        min_height: u32,
    ) -> CacheResult<Option<DynamicImage>> {
        if image::guess_format(bytes).ok() != Some(ImageFormat::Jpeg) {
            return Ok(None);
        }

        let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(bytes));
        let requested = |value: u32| u16::try_from(value).unwrap_or(u16::MAX);
        let (width, height) = decoder
            .scale(requested(min_width), requested(min_height))
            .map_err(|e| ImageError::decode(format!("Failed to read JPEG header: {e}")))?;

        let Some(info) = decoder.info() else {
            return Ok(None);
        };
        let channels: u64 = match info.pixel_format {
            PixelFormat::L8 => 1,
            PixelFormat::RGB24 => 3,
            _ => return Ok(None),
        };

        let needed = u64::from(width) * u64::from(height) * channels;
        if needed > self.max_alloc {
            return Err(ImageError::decode(format!(
                "Reduced decode needs {needed} bytes, limit is {}",
                self.max_alloc
            )));
        }

        let pixels = decoder
            .decode()
            .map_err(|e| ImageError::decode(format!("Failed to decode image: {e}")))?;
        let (width, height) = (u32::from(width), u32::from(height));
        let image = match info.pixel_format {
            PixelFormat::L8 => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
            _ => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        };

        trace!(scaled = %format!("{width}x{height}"), "Decoded JPEG at reduced scale");
        image
            .map(Some)
            .ok_or_else(|| ImageError::decode("Reduced JPEG decode returned a short buffer"))
    }
}

impl Default for ScalingDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageDecoderPort for ScalingDecoder {
    fn decode(&self, bytes: &[u8], policy: DisplaySizePolicy) -> CacheResult<Bitmap> {
        let (width, height) = sniff_dimensions(bytes)?;
        let factor = sample_factor(width, height, policy);
        let (sampled_w, sampled_h) = ((width / factor).max(1), (height / factor).max(1));

        let reduced = if factor > 1 {
            self.decode_reduced(bytes, sampled_w, sampled_h)?
        } else {
            None
        };
        let sampled = match reduced {
            Some(img) if (img.width(), img.height()) == (sampled_w, sampled_h) => img,
            Some(img) => img.thumbnail_exact(sampled_w, sampled_h),
            None if factor > 1 => self.decode_full(bytes)?.thumbnail_exact(sampled_w, sampled_h),
            None => self.decode_full(bytes)?,
        };

        let (target_w, target_h) = target_dimensions(sampled.width(), sampled.height(), policy);
        let scaled = if (target_w, target_h) == (sampled.width(), sampled.height()) {
            sampled
        } else {
            sampled.resize_exact(target_w, target_h, self.filter)
        };

        trace!(
            native = %format!("{width}x{height}"),
            factor = factor,
            target = %format!("{target_w}x{target_h}"),
            policy = %policy,
            "Decoded image"
        );

        Ok(Bitmap::from_rgb(&scaled.to_rgb8()))
    }
}

/// Reads the native dimensions from the image header without decoding pixels.
///
/// # Errors
/// Returns [`ImageError::Decode`] for unknown formats, truncated headers and
/// zero-sized images.
pub fn sniff_dimensions(bytes: &[u8]) -> CacheResult<(u32, u32)> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::decode(format!("Failed to read image header: {e}")))?
        .into_dimensions()
        .map_err(|e| ImageError::decode(format!("Failed to read image dimensions: {e}")))?;

    if width == 0 || height == 0 {
        return Err(ImageError::decode("Image has no pixels"));
    }
    Ok((width, height))
}

/// Smallest power of two `f` such that `native / f <= requested`.
///
/// Returns 1 when the source already fits; sub-sampling never enlarges.
#[must_use]
pub fn subsample_factor(native: u32, requested: u32) -> u32 {
    let requested = u64::from(requested.max(1));
    let native = u64::from(native);
    let mut factor: u64 = 1;
    while native > requested * factor {
        factor *= 2;
    }
    u32::try_from(factor).unwrap_or(u32::MAX)
}

/// Sub-sample factor for a whole policy.
#[must_use]
pub fn sample_factor(width: u32, height: u32, policy: DisplaySizePolicy) -> u32 {
    match policy {
        DisplaySizePolicy::HeightPreservingAspect { height: requested } => {
            subsample_factor(height, requested)
        }
        DisplaySizePolicy::ScaleSizeHint {
            width: box_w,
            height: box_h,
        } => subsample_factor(width, box_w).max(subsample_factor(height, box_h)),
        DisplaySizePolicy::ScalePreserve => 1,
    }
}

/// Final output size for an image of `width` x `height` under `policy`.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn target_dimensions(width: u32, height: u32, policy: DisplaySizePolicy) -> (u32, u32) {
    let scaled = |value: u32, ratio: f64| ((f64::from(value) * ratio).round() as u32).max(1);

    match policy {
        DisplaySizePolicy::HeightPreservingAspect { height: requested } => {
            let requested = requested.max(1);
            let ratio = f64::from(requested) / f64::from(height.max(1));
            (scaled(width, ratio), requested)
        }
        DisplaySizePolicy::ScaleSizeHint {
            width: box_w,
            height: box_h,
        } => {
            let ratio = (f64::from(box_w.max(1)) / f64::from(width.max(1)))
                .min(f64::from(box_h.max(1)) / f64::from(height.max(1)));
            (scaled(width, ratio), scaled(height, ratio))
        }
        DisplaySizePolicy::ScalePreserve => (width, height),
    }
}
