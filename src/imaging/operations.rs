//! High-level image operations.
//!
//! These functions combine calculations with backend execution: take a
//! decoded image, compute its texture-friendly size, and have the backend
//! resize and encode it.

use super::backend::{BackendError, Decoded, ImageBackend};
use super::calculations::{DimensionError, NormalizationPolicy, normalize};
use super::params::{Codec, EncodeParams, OutputFormat, Quality};
use crate::types::Dimensions;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextureError {
    #[error(transparent)]
    Dimensions(#[from] DimensionError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Encoded output for one source image.
#[derive(Debug, Clone)]
pub struct PreparedTexture {
    pub original: Dimensions,
    pub target: Dimensions,
    pub codec: Codec,
    pub bytes: Vec<u8>,
}

/// Normalize the dimensions of `decoded` and encode it in the selected format.
pub fn prepare_texture<B: ImageBackend>(
    backend: &B,
    decoded: &Decoded<B::Image>,
    policy: &NormalizationPolicy,
    format: OutputFormat,
    quality: Quality,
) -> Result<PreparedTexture, TextureError> {
    let original = backend.dimensions(&decoded.image);
    let target = normalize(original.width, original.height, policy)?;
    let codec = format.codec(decoded.codec);

    let bytes = backend.encode(
        &decoded.image,
        &EncodeParams {
            width: target.width,
            height: target.height,
            codec,
            quality,
        },
    )?;

    Ok(PreparedTexture {
        original,
        target,
        codec,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp, mock_image};

    fn decode(backend: &MockBackend, w: u32, h: u32, ext: &str) -> Decoded<Dimensions> {
        backend.decode(&mock_image(w, h), Some(ext)).unwrap()
    }

    #[test]
    fn prepare_rounds_and_encodes() {
        let backend = MockBackend::new();
        let decoded = decode(&backend, 10, 9, "png");

        let prepared = prepare_texture(
            &backend,
            &decoded,
            &NormalizationPolicy::unbounded(),
            OutputFormat::Original,
            Quality::new(80),
        )
        .unwrap();

        assert_eq!(prepared.original, Dimensions::new(10, 9));
        assert_eq!(prepared.target, Dimensions::new(12, 8));
        assert_eq!(prepared.codec, Codec::Png);

        let ops = backend.get_operations();
        assert_eq!(
            ops[1],
            RecordedOp::Encode {
                source: Dimensions::new(10, 9),
                width: 12,
                height: 8,
                codec: Codec::Png,
                quality: 80,
            }
        );
    }

    #[test]
    fn prepare_switches_codec_for_forced_format() {
        let backend = MockBackend::new();
        let decoded = decode(&backend, 64, 64, "png");

        let prepared = prepare_texture(
            &backend,
            &decoded,
            &NormalizationPolicy::unbounded(),
            OutputFormat::Jpg,
            Quality::default(),
        )
        .unwrap();
        assert_eq!(prepared.codec, Codec::Jpeg);
    }

    #[test]
    fn prepare_applies_caps() {
        let backend = MockBackend::new();
        let decoded = decode(&backend, 4000, 3000, "jpg");

        let prepared = prepare_texture(
            &backend,
            &decoded,
            &NormalizationPolicy::capped(2048, 2048),
            OutputFormat::Original,
            Quality::default(),
        )
        .unwrap();
        assert_eq!(prepared.target, Dimensions::new(2048, 1536));
    }

    #[test]
    fn zero_sized_source_is_dimension_error() {
        let backend = MockBackend::new();
        let decoded = decode(&backend, 0, 10, "png");

        let result = prepare_texture(
            &backend,
            &decoded,
            &NormalizationPolicy::unbounded(),
            OutputFormat::Original,
            Quality::default(),
        );
        assert!(matches!(result, Err(TextureError::Dimensions(_))));
        assert_eq!(backend.get_operations().len(), 1);
    }
}
