//! Image processing, pure Rust and statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` with content sniffing |
//! | **Normalize** | [`normalize`], multiple-of-4 sizing with caps |
//! | **Resize** | `resize_exact` + Lanczos3 (stretch to the exact target) |
//! | **Encode** | `image` JPEG / PNG / WebP / TIFF encoders |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Decoded, ImageBackend};
pub use calculations::{
    ASPECT_TOLERANCE, BLOCK, DimensionError, MAX_ADJUSTMENT, NormalizationPolicy,
    nearest_multiple, normalize,
};
pub use operations::{PreparedTexture, TextureError, prepare_texture};
pub use params::{Codec, EncodeParams, OutputFormat, Quality};
pub use rust_backend::{RustBackend, supported_input_extensions};
