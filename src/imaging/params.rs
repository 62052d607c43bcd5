//! Parameter types for image operations.
//!
//! These describe *what* to produce, not *how*. The orchestrator resolves a
//! user-facing [`OutputFormat`] selector into a concrete [`Codec`] and hands
//! an [`EncodeParams`] to the backend, which does the pixel work. Keeping the
//! two apart lets tests swap in a mock backend.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 95). Clamped on construction.
//! - [`Codec`]: A container the backend can decode and encode.
//! - [`OutputFormat`]: The selector: keep the original container or force one.
//! - [`EncodeParams`]: Target dimensions, codec and quality for one output.

use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
///
/// Only JPEG output honors it; PNG, TIFF and WebP are written losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// An image container with a decoder and encoder compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Png,
    Jpeg,
    WebP,
    Tiff,
}

impl Codec {
    pub const ALL: [Codec; 4] = [Codec::Png, Codec::Jpeg, Codec::WebP, Codec::Tiff];

    /// Look up a codec by file extension (without the dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Png => &["png"],
            Self::Jpeg => &["jpg", "jpeg"],
            Self::WebP => &["webp"],
            Self::Tiff => &["tif", "tiff"],
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::WebP => image::ImageFormat::WebP,
            Self::Tiff => image::ImageFormat::Tiff,
        }
    }

    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::WebP => Some(Self::WebP),
            image::ImageFormat::Tiff => Some(Self::Tiff),
            _ => None,
        }
    }
}

/// Output format selector.
///
/// `Jpg` and `Jpeg` encode the same way and differ only in the extension
/// written to disk.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Keep the source container and extension
    #[default]
    Original,
    Png,
    Jpg,
    Jpeg,
    Webp,
    Tiff,
}

impl OutputFormat {
    /// Codec to encode with, given the codec the source was decoded from.
    pub fn codec(self, source: Codec) -> Codec {
        match self {
            Self::Original => source,
            Self::Png => Codec::Png,
            Self::Jpg | Self::Jpeg => Codec::Jpeg,
            Self::Webp => Codec::WebP,
            Self::Tiff => Codec::Tiff,
        }
    }

    /// Replacement extension (with dot), or `None` to keep the original one.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Original => None,
            Self::Png => Some(".png"),
            Self::Jpg => Some(".jpg"),
            Self::Jpeg => Some(".jpeg"),
            Self::Webp => Some(".webp"),
            Self::Tiff => Some(".tiff"),
        }
    }
}

/// Parameters for a stretch-resize and encode.
///
/// The image is resized to exactly `width`x`height`, ignoring its aspect
/// ratio. No cropping, no letterboxing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub width: u32,
    pub height: u32,
    pub codec: Codec,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
        assert_eq!(Quality::new(300).value(), 100);
        assert_eq!(Quality::new(u32::MAX).value(), 100);
    }

    #[test]
    fn quality_default_is_near_lossless() {
        assert_eq!(Quality::default().value(), 95);
    }

    #[test]
    fn codec_from_extension_any_case() {
        assert_eq!(Codec::from_extension("PNG"), Some(Codec::Png));
        assert_eq!(Codec::from_extension("Jpeg"), Some(Codec::Jpeg));
        assert_eq!(Codec::from_extension("tif"), Some(Codec::Tiff));
        assert_eq!(Codec::from_extension("psd"), None);
    }

    #[test]
    fn codec_image_format_roundtrip() {
        for codec in Codec::ALL {
            assert_eq!(Codec::from_image_format(codec.image_format()), Some(codec));
        }
        assert_eq!(Codec::from_image_format(image::ImageFormat::Gif), None);
    }

    #[test]
    fn original_keeps_source_codec() {
        assert_eq!(OutputFormat::Original.codec(Codec::Jpeg), Codec::Jpeg);
        assert_eq!(OutputFormat::Original.extension(), None);
    }

    #[test]
    fn jpg_and_jpeg_share_codec() {
        assert_eq!(OutputFormat::Jpg.codec(Codec::Png), Codec::Jpeg);
        assert_eq!(OutputFormat::Jpeg.codec(Codec::Png), Codec::Jpeg);
        assert_eq!(OutputFormat::Jpg.extension(), Some(".jpg"));
        assert_eq!(OutputFormat::Jpeg.extension(), Some(".jpeg"));
    }

    #[test]
    fn output_format_parses_lowercase() {
        let f: OutputFormat = serde_json::from_str("\"webp\"").unwrap();
        assert_eq!(f, OutputFormat::Webp);
        assert_eq!(OutputFormat::default(), OutputFormat::Original);
    }
}
