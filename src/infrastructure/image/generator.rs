//! Placeholder covers for books without a cover image.
//!
//! Placeholders are addressed by a synthetic `generated-cover://` URI so they
//! flow through the same disk and memory tiers as real covers.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use rand::Rng;
use url::Url;
use url::form_urlencoded;

use crate::domain::errors::{CacheResult, ImageError};

/// URI scheme of generated placeholders.
pub const GENERATED_SCHEME: &str = "generated-cover";

const DEFAULT_WIDTH: u32 = 300;
const DEFAULT_HEIGHT: u32 = 450;

/// Renders placeholder covers.
#[derive(Debug, Clone)]
pub struct CoverGenerator {
    width: u32,
    height: u32,
}

impl CoverGenerator {
    /// Creates a generator with the default 300x450 canvas.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    /// Creates a generator with a custom canvas size.
    #[must_use]
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Canvas width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Builds the synthetic URI for a title/author pair.
    ///
    /// The same pair always yields the same URI, and therefore the same cache key.
    #[must_use]
    pub fn generate_uri_for_title_author(title: &str, author: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("title", title)
            .append_pair("author", author)
            .finish();
        format!("{GENERATED_SCHEME}://cover?{query}")
    }

    /// Renders a placeholder and encodes it as PNG.
    ///
    /// The background colour is picked at random on every render, so a
    /// placeholder regenerated after eviction may change colour.
    ///
    /// # Errors
    /// Returns [`ImageError::Fetch`] if encoding fails.
    pub fn render_png(&self, title: &str, author: &str) -> CacheResult<Bytes> {
        let background: [u8; 3] = rand::rng().random();
        let canvas = self.render(title, author, Rgb(background));

        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(canvas)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| ImageError::fetch(format!("Failed to encode placeholder: {e}")))?;
        Ok(Bytes::from(buf))
    }

    /// Renders a placeholder on the given background.
    ///
    /// A darker band carries one bar per title word; author words are drawn
    /// as thinner bars beneath it.
    #[must_use]
    pub fn render(&self, title: &str, author: &str, background: Rgb<u8>) -> RgbImage {
        let (w, h) = (self.width, self.height);
        let mut canvas = RgbImage::from_pixel(w, h, background);

        let band = shade(background, 0.6);
        let band_top = h * 15 / 100;
        let band_bottom = h * 45 / 100;
        fill(&mut canvas, 0, band_top, w, band_bottom, band);

        let margin = (w / 10).max(1);
        let title_bar = (h / 30).max(1);
        draw_words(
            &mut canvas,
            title,
            Area {
                left: margin,
                right: w.saturating_sub(margin),
                top: band_top + title_bar,
                bottom: band_bottom,
            },
            title_bar,
            Rgb([240, 240, 240]),
        );

        let author_bar = (title_bar * 2 / 3).max(1);
        draw_words(
            &mut canvas,
            author,
            Area {
                left: margin,
                right: w.saturating_sub(margin),
                top: band_bottom + title_bar * 2,
                bottom: h.saturating_sub(margin),
            },
            author_bar,
            shade(background, 0.35),
        );

        canvas
    }
}

impl Default for CoverGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the title and author from a generated-cover URI.
///
/// Returns `None` for any other URI.
#[must_use]
pub fn parse_generated_uri(uri: &str) -> Option<(String, String)> {
    let url = Url::parse(uri).ok()?;
    if url.scheme() != GENERATED_SCHEME {
        return None;
    }

    let mut title = None;
    let mut author = None;
    for (name, value) in url.query_pairs() {
        match name.as_ref() {
            "title" => title = Some(value.into_owned()),
            "author" => author = Some(value.into_owned()),
            _ => {}
        }
    }
    Some((title.unwrap_or_default(), author.unwrap_or_default()))
}

struct Area {
    left: u32,
    right: u32,
    top: u32,
    bottom: u32,
}

/// Lays out one bar per word, wrapping to a new line when a row is full.
fn draw_words(canvas: &mut RgbImage, text: &str, area: Area, bar_height: u32, color: Rgb<u8>) {
    let unit = (bar_height / 2).max(1);
    let gap = unit;
    let line_step = bar_height * 2;
    let (mut x, mut y) = (area.left, area.top);

    for word in text.split_whitespace() {
        let chars = u32::try_from(word.chars().count()).unwrap_or(u32::MAX);
        let len = chars
            .saturating_mul(unit)
            .min(area.right.saturating_sub(area.left));

        if x > area.left && x + len > area.right {
            x = area.left;
            y += line_step;
        }
        if y + bar_height > area.bottom {
            break;
        }

        fill(canvas, x, y, x + len, y + bar_height, color);
        x += len + gap;
    }
}

fn fill(canvas: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    let x1 = x1.min(canvas.width());
    let y1 = y1.min(canvas.height());
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.put_pixel(x, y, color);
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn shade(color: Rgb<u8>, factor: f32) -> Rgb<u8> {
    Rgb(color.0.map(|c| (f32::from(c) * factor) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::DiskKey;

    #[test]
    fn test_uri_is_deterministic() {
        let a = CoverGenerator::generate_uri_for_title_author("Moby Dick", "Herman Melville");
        let b = CoverGenerator::generate_uri_for_title_author("Moby Dick", "Herman Melville");
        assert_eq!(a, b);
        assert_eq!(DiskKey::from_uri(&a), DiskKey::from_uri(&b));
        assert!(a.starts_with("generated-cover://"));
    }

    #[test]
    fn test_uri_distinguishes_books() {
        let a = CoverGenerator::generate_uri_for_title_author("Moby Dick", "Herman Melville");
        let b = CoverGenerator::generate_uri_for_title_author("Typee", "Herman Melville");
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_round_trips_special_characters() {
        let uri = CoverGenerator::generate_uri_for_title_author("Q&A = 50% ?", "Zoë Ünal");
        assert_eq!(
            parse_generated_uri(&uri),
            Some(("Q&A = 50% ?".to_string(), "Zoë Ünal".to_string()))
        );
    }

    #[test]
    fn test_parse_ignores_network_uris() {
        assert!(parse_generated_uri("https://example.com/cover.png").is_none());
        assert!(parse_generated_uri("not a uri").is_none());
    }

    #[test]
    fn test_render_is_deterministic_for_fixed_background() {
        let generator = CoverGenerator::with_size(120, 180);
        let a = generator.render("Moby Dick", "Herman Melville", Rgb([10, 120, 200]));
        let b = generator.render("Moby Dick", "Herman Melville", Rgb([10, 120, 200]));
        assert_eq!(a, b);
        assert_eq!(a.get_pixel(0, 0), &Rgb([10, 120, 200]));
        assert_ne!(a, generator.render("Typee", "Herman Melville", Rgb([10, 120, 200])));
    }

    #[test]
    fn test_render_png_decodes() {
        let generator = CoverGenerator::with_size(60, 90);
        let bytes = generator.render_png("A Very Long Title Indeed", "Someone").unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (60, 90));
    }
}
