//! Shared test utilities for the texprep test suite.
//!
//! Builds small synthetic images in memory or on disk so tests never depend
//! on checked-in binary fixtures.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = write_png(tmp.path(), "hero.png", 30, 17);
//! let bytes = jpeg_bytes(16, 16);
//! ```

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

// =========================================================================
// In-memory images
// =========================================================================

/// A gradient, so resampling has something to chew on.
fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    })
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Opaque RGB PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::Png)
}

/// Half-transparent RGBA PNG.
pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, _| Rgba([200, 40, 40, (x * 25) as u8]));
    encode(DynamicImage::ImageRgba8(image), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::Jpeg)
}

// =========================================================================
// On-disk fixtures
// =========================================================================

/// Write a PNG into `dir`, creating parent directories as needed.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    write_bytes(dir, name, &png_bytes(width, height))
}

pub fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    write_bytes(dir, name, &jpeg_bytes(width, height))
}

pub fn write_bytes(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Decode `path` and return its pixel size.
pub fn image_size(path: &Path) -> (u32, u32) {
    let image = image::open(path).unwrap();
    (image.width(), image.height())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_produce_decodable_images() {
        for (bytes, format) in [
            (png_bytes(5, 3), ImageFormat::Png),
            (rgba_png_bytes(5, 3), ImageFormat::Png),
            (jpeg_bytes(5, 3), ImageFormat::Jpeg),
        ] {
            assert_eq!(image::guess_format(&bytes).unwrap(), format);
            let image = image::load_from_memory(&bytes).unwrap();
            assert_eq!((image.width(), image.height()), (5, 3));
        }
    }

    #[test]
    fn write_png_creates_parents() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_png(tmp.path(), "a/b/c.png", 7, 9);
        assert_eq!(image_size(&path), (7, 9));
    }
}
