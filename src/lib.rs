//! # texprep
//!
//! Batch-prepare images for texture import: every output has pixel
//! dimensions divisible by 4, an accent-free filesystem-safe name with a
//! configurable suffix, and the requested output format.
//!
//! # Pipeline
//!
//! ```text
//! inputs (files, dirs, stdin) ─▶ InputItem ─▶ process_batch ─▶ output/{stem}{suffix}{ext}
//!                                                 │
//!                                   decode ─▶ normalize ─▶ resize + encode
//! ```
//!
//! Items are processed one at a time. Per-item failures are collected in the
//! [`process::BatchReport`] instead of stopping the batch.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Dimension normalization, backend trait, `image`-crate backend |
//! | [`naming`] | Filename sanitizer: accent folding, whitespace, character whitelist |
//! | [`process`] | Sequential batch orchestrator, cancel token, outcomes and events |
//! | [`scan`] | Lazy recursive directory walk filtered by extension |
//! | [`source`] | `InputItem`: a path or an in-memory buffer |
//! | [`cache`] | Content-addressed decode cache (`NoCache`, `LruCache`) |
//! | [`config`] | `texprep.toml` loading, merging and validation |
//! | [`types`] | Shared value types (`Dimensions`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Stretch, Never Crop
//!
//! The target size is at most 4 pixels away from the source on each side,
//! so the image is resampled to exactly that size. Nothing is cropped or
//! padded, and a tiny aspect change is accepted.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling and encoding all go through the `image`
//! crate. The binary has no system dependencies.
//!
//! ## One Canonical Normalizer
//!
//! [`imaging::normalize`] is the only place output sizes are computed. Caps
//! and aspect preservation are policy inputs, not separate code paths.

pub mod cache;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod source;
mod transliterate;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
