//! Decoded raster images in a 16-bit RGB565 layout.

use image::RgbImage;

/// A decoded, display-ready image.
///
/// Pixels are stored as RGB565 (5 bits red, 6 bits green, 5 bits blue),
/// halving the footprint of an 8-bit-per-channel RGBA buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u16>,
}

impl Bitmap {
    /// Converts an 8-bit RGB image.
    #[must_use]
    pub fn from_rgb(image: &RgbImage) -> Self {
        let pixels = image
            .pixels()
            .map(|p| pack_rgb565(p.0[0], p.0[1], p.0[2]))
            .collect();
        Self {
            width: image.width(),
            height: image.height(),
            pixels,
        }
    }

    /// Image width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB565 pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Allocation size of the pixel buffer in bytes.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<u16>()
    }

    /// Returns the packed pixel at `(x, y)`, if in bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels.get(idx).copied()
    }

    /// Expands back to an 8-bit RGB image.
    #[must_use]
    pub fn to_rgb(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let [r, g, b] = unpack_rgb565(self.pixel(x, y).unwrap_or_default());
            image::Rgb([r, g, b])
        })
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.byte_size())
            .finish_non_exhaustive()
    }
}

/// Packs an 8-bit RGB triple into RGB565.
#[must_use]
pub const fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    (((r as u16) >> 3) << 11) | (((g as u16) >> 2) << 5) | ((b as u16) >> 3)
}

/// Expands an RGB565 value to 8-bit channels.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn unpack_rgb565(value: u16) -> [u8; 3] {
    let r = ((value >> 11) & 0x1f) as u8;
    let g = ((value >> 5) & 0x3f) as u8;
    let b = (value & 0x1f) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_extremes() {
        assert_eq!(pack_rgb565(0, 0, 0), 0);
        assert_eq!(pack_rgb565(255, 255, 255), 0xffff);
        assert_eq!(unpack_rgb565(0xffff), [255, 255, 255]);
        assert_eq!(unpack_rgb565(pack_rgb565(255, 0, 0)), [255, 0, 0]);
    }

    #[test]
    fn test_byte_size_is_two_bytes_per_pixel() {
        let bitmap = Bitmap::from_rgb(&RgbImage::new(10, 20));
        assert_eq!(bitmap.byte_size(), 400);
        assert_eq!(bitmap.width(), 10);
        assert_eq!(bitmap.height(), 20);
    }

    #[test]
    fn test_pixel_bounds() {
        let bitmap = Bitmap::from_rgb(&RgbImage::from_pixel(2, 2, image::Rgb([0, 255, 0])));
        assert_eq!(bitmap.pixel(1, 1), Some(pack_rgb565(0, 255, 0)));
        assert_eq!(bitmap.pixel(2, 0), None);
        assert_eq!(bitmap.to_rgb().get_pixel(0, 0).0, [0, 255, 0]);
    }
}
