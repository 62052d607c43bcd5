//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the batch needs:
//! decode bytes into an image handle, report its dimensions, and
//! stretch-resize + encode it into output bytes. Handles are `Clone` so that
//! a [`DecodeCache`](crate::cache::DecodeCache) can hand out copies.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image` crate and
//! statically linked.

use super::params::{Codec, EncodeParams};
use crate::types::Dimensions;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// A decoded source image and the container it was decoded from.
#[derive(Debug, Clone)]
pub struct Decoded<I> {
    pub image: I,
    pub codec: Codec,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Decoded image handle.
    type Image: Clone;

    /// Decode `bytes`. `hint` is the source file extension, used when the
    /// container cannot be sniffed from the content.
    fn decode(&self, bytes: &[u8], hint: Option<&str>)
    -> Result<Decoded<Self::Image>, BackendError>;

    /// Native pixel dimensions of a decoded image.
    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Resize to exactly the requested size and encode.
    fn encode(&self, image: &Self::Image, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}
