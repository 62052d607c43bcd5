//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Sniff container | `image::ImageReader::with_guessed_format` |
//! | Decode (PNG, JPEG, WebP, TIFF) | `image` crate decoders |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` (stretch, no crop) |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` (alpha flattened to RGB) |
//! | Encode → PNG / TIFF / WebP | `PngEncoder`, `TiffEncoder`, `WebPEncoder::new_lossless` |

use super::backend::{BackendError, Decoded, ImageBackend};
use super::params::{Codec, EncodeParams};
use crate::types::Dimensions;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use std::borrow::Cow;
use std::io::Cursor;
use std::sync::LazyLock;

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    Codec::ALL
        .iter()
        .filter(|codec| codec.image_format().reading_enabled())
        .flat_map(|codec| codec.extensions().iter().copied())
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    type Image = DynamicImage;

    fn decode(
        &self,
        bytes: &[u8],
        hint: Option<&str>,
    ) -> Result<Decoded<DynamicImage>, BackendError> {
        let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let format = reader
            .format()
            .or_else(|| hint.and_then(ImageFormat::from_extension));
        let codec = format
            .and_then(Codec::from_image_format)
            .ok_or_else(|| BackendError::Decode("unrecognized image format".to_string()))?;
        reader.set_format(codec.image_format());
        let image = reader
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(Decoded { image, codec })
    }

    fn dimensions(&self, image: &DynamicImage) -> Dimensions {
        Dimensions::new(image.width(), image.height())
    }

    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        let resized = if image.width() == params.width && image.height() == params.height {
            Cow::Borrowed(image)
        } else {
            Cow::Owned(image.resize_exact(params.width, params.height, FilterType::Lanczos3))
        };

        let input = encoder_input(&resized, params.codec);
        let mut buf = Cursor::new(Vec::new());
        let written = match params.codec {
            Codec::Jpeg => {
                let quality = params.quality.value() as u8;
                input.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
            }
            Codec::Png => input.write_with_encoder(PngEncoder::new(&mut buf)),
            Codec::Tiff => input.write_with_encoder(TiffEncoder::new(&mut buf)),
            Codec::WebP => input.write_with_encoder(WebPEncoder::new_lossless(&mut buf)),
        };
        written.map_err(|e| BackendError::Encode(format!("{:?}: {}", params.codec, e)))?;
        Ok(buf.into_inner())
    }
}

/// Convert `image` to a color type the encoder for `codec` accepts.
///
/// - JPEG: 8-bit RGB, alpha dropped.
/// - WebP: 8-bit RGB or RGBA.
/// - TIFF: no gray+alpha, so LumaA widens to RGBA at the same depth.
/// - PNG / TIFF: float samples narrow to 16-bit.
fn encoder_input(image: &DynamicImage, codec: Codec) -> Cow<'_, DynamicImage> {
    let converted = match (codec, image.color()) {
        (Codec::Jpeg, ColorType::Rgb8) => None,
        (Codec::Jpeg, _) => Some(DynamicImage::ImageRgb8(image.to_rgb8())),
        (Codec::WebP, ColorType::Rgb8 | ColorType::Rgba8) => None,
        (Codec::WebP, color) if color.has_alpha() => {
            Some(DynamicImage::ImageRgba8(image.to_rgba8()))
        }
        (Codec::WebP, _) => Some(DynamicImage::ImageRgb8(image.to_rgb8())),
        (Codec::Tiff, ColorType::La8) => Some(DynamicImage::ImageRgba8(image.to_rgba8())),
        (Codec::Tiff, ColorType::La16) => Some(DynamicImage::ImageRgba16(image.to_rgba16())),
        (Codec::Png | Codec::Tiff, ColorType::Rgb32F) => {
            Some(DynamicImage::ImageRgb16(image.to_rgb16()))
        }
        (Codec::Png | Codec::Tiff, ColorType::Rgba32F) => {
            Some(DynamicImage::ImageRgba16(image.to_rgba16()))
        }
        _ => None,
    };
    converted.map_or(Cow::Borrowed(image), Cow::Owned)
}
