//! Batch processing of input images.
//!
//! Takes a list of [`InputItem`]s and turns each one into a texture-ready
//! file in the output directory: dimensions normalized to multiples of 4,
//! name sanitized, suffix and format applied.
//!
//! ## Pipeline per item
//!
//! ```text
//! load bytes ─▶ extension check ─▶ decode (cache) ─▶ normalize ─▶ resize + encode ─▶ write
//! ```
//!
//! Items are processed strictly one after another. A failure in one item is
//! recorded as a failed [`ProcessingOutcome`] and the batch moves on; only a
//! failure to create the output directory aborts the whole batch.
//!
//! ## Cancellation
//!
//! A [`CancelToken`] can be flipped from any thread. The loop looks at it
//! before starting each item, never in the middle of one, so every file that
//! was started is either fully written or reported as failed.
//!
//! ## Progress
//!
//! When a `Sender<ProcessEvent>` is passed in, an `ItemStarted` and an
//! `ItemFinished` event are sent for every attempted item. The CLI prints
//! them from a separate thread via [`crate::output::format_process_event`].

use crate::cache::{self, CacheStats, DecodeCache, content_key};
use crate::config::Settings;
use crate::imaging::{
    BackendError, Decoded, DimensionError, ImageBackend, NormalizationPolicy, OutputFormat,
    Quality, RustBackend, TextureError, prepare_texture, supported_input_extensions,
};
use crate::naming::output_file_name;
use crate::source::InputItem;
use crate::types::Dimensions;
use log::{debug, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Why a single item could not be processed.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(#[from] DimensionError),
    #[error("unsupported format: .{0}")]
    UnsupportedFormat(String),
    #[error("failed to decode image: {0}")]
    DecodeFailure(String),
    #[error("failed to encode image: {0}")]
    EncodeFailure(String),
    #[error("I/O error on {}: {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<TextureError> for ItemError {
    fn from(err: TextureError) -> Self {
        match err {
            TextureError::Dimensions(e) => Self::InvalidDimensions(e),
            TextureError::Backend(e) => Self::EncodeFailure(e.to_string()),
        }
    }
}

/// Errors that stop a batch before any item is attempted.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Cooperative cancellation flag shared between the batch loop and whoever
/// wants to stop it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    /// Inserted between the sanitized stem and the extension.
    pub suffix: String,
    pub format: OutputFormat,
    pub quality: Quality,
    pub policy: NormalizationPolicy,
}

impl BatchOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::from_settings(&Settings::default())
        }
    }

    /// Build options from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            output_dir: settings.output_dir.clone(),
            suffix: settings.suffix.clone(),
            format: settings.format,
            quality: Quality::new(settings.quality),
            policy: settings.resize.to_policy(),
        }
    }
}

/// Result of one attempted item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingOutcome {
    pub success: bool,
    /// Path for files, name for in-memory buffers.
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_size: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_size: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingOutcome {
    fn succeeded(input: String, written: Written) -> Self {
        Self {
            success: true,
            input,
            output_path: Some(written.path),
            original_size: Some(written.original),
            new_size: Some(written.target),
            error: None,
        }
    }

    fn failed(input: String, error: &ItemError) -> Self {
        Self {
            success: false,
            input,
            output_path: None,
            original_size: None,
            new_size: None,
            error: Some(error.to_string()),
        }
    }
}

/// Aggregate result of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// The batch ran to the end. Individual items may still have failed.
    pub success: bool,
    pub processed_count: usize,
    pub total_count: usize,
}

impl BatchSummary {
    /// Summary for a batch that stopped before processing anything.
    pub fn aborted(total_count: usize) -> Self {
        Self {
            success: false,
            processed_count: 0,
            total_count,
        }
    }
}

/// Full result of a batch: one outcome per attempted item, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<ProcessingOutcome>,
    /// Number of items written successfully.
    pub processed_count: usize,
    /// Number of items handed to the batch, attempted or not.
    pub total_count: usize,
    pub cancelled: bool,
    pub cache: CacheStats,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            success: !self.cancelled,
            processed_count: self.processed_count,
            total_count: self.total_count,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProcessingOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Progress event sent while a batch runs. `index` is 1-based.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    ItemStarted {
        index: usize,
        total: usize,
        name: String,
    },
    ItemFinished {
        index: usize,
        total: usize,
        outcome: ProcessingOutcome,
    },
}

/// Process `items` with the `image` crate backend.
///
/// `cache_capacity` of 0 disables the decode cache.
pub fn process(
    items: &[InputItem],
    options: &BatchOptions,
    cache_capacity: usize,
    cancel: &CancelToken,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, BatchError> {
    let backend = RustBackend::new();
    let mut cache = cache::with_capacity::<Decoded<image::DynamicImage>>(cache_capacity);
    process_batch(items, options, &backend, cache.as_mut(), cancel, events)
}

/// Process `items` using a specific backend and cache (allows testing with mock).
pub fn process_batch<B: ImageBackend>(
    items: &[InputItem],
    options: &BatchOptions,
    backend: &B,
    cache: &mut dyn DecodeCache<Decoded<B::Image>>,
    cancel: &CancelToken,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, BatchError> {
    let total = items.len();
    std::fs::create_dir_all(&options.output_dir).map_err(|source| BatchError::OutputDir {
        path: options.output_dir.clone(),
        source,
    })?;

    info!(
        "processing {} item(s) into {}",
        total,
        options.output_dir.display()
    );

    let mut outcomes = Vec::with_capacity(total);
    let mut processed_count = 0;
    let mut stats = CacheStats::default();
    let mut cancelled = false;

    for (i, item) in items.iter().enumerate() {
        if cancel.is_cancelled() {
            info!("batch cancelled after {} of {} item(s)", i, total);
            cancelled = true;
            break;
        }
        let index = i + 1;
        send(
            &events,
            ProcessEvent::ItemStarted {
                index,
                total,
                name: item.identifier(),
            },
        );

        let outcome = process_one(item, options, backend, cache, &mut stats);
        if outcome.success {
            processed_count += 1;
        }
        send(
            &events,
            ProcessEvent::ItemFinished {
                index,
                total,
                outcome: outcome.clone(),
            },
        );
        outcomes.push(outcome);
    }

    Ok(BatchReport {
        outcomes,
        processed_count,
        total_count: total,
        cancelled,
        cache: stats,
    })
}

/// Process a single item into `options.output_dir`.
///
/// The output directory must already exist; [`process_batch`] creates it.
pub fn process_one<B: ImageBackend>(
    item: &InputItem,
    options: &BatchOptions,
    backend: &B,
    cache: &mut dyn DecodeCache<Decoded<B::Image>>,
    stats: &mut CacheStats,
) -> ProcessingOutcome {
    let input = item.identifier();
    match run_item(item, options, backend, cache, stats) {
        Ok(written) => {
            debug!(
                "{}: {} -> {} ({})",
                input,
                written.original,
                written.target,
                written.path.display()
            );
            ProcessingOutcome::succeeded(input, written)
        }
        Err(err) => {
            warn!("{}: {}", input, err);
            ProcessingOutcome::failed(input, &err)
        }
    }
}

struct Written {
    path: PathBuf,
    original: Dimensions,
    target: Dimensions,
}

fn run_item<B: ImageBackend>(
    item: &InputItem,
    options: &BatchOptions,
    backend: &B,
    cache: &mut dyn DecodeCache<Decoded<B::Image>>,
    stats: &mut CacheStats,
) -> Result<Written, ItemError> {
    let extension = item.extension();
    if let Some(ext) = &extension
        && !supported_input_extensions().contains(&ext.as_str())
    {
        return Err(ItemError::UnsupportedFormat(ext.clone()));
    }

    let loaded = item.load().map_err(|source| ItemError::IoFailure {
        path: PathBuf::from(item.identifier()),
        source,
    })?;

    let key = cache.enabled().then(|| content_key(&loaded.bytes));
    let cached = key.as_deref().and_then(|key| cache.get(key));
    let decoded = match cached {
        Some(hit) => {
            debug!("{}: decode cache hit", loaded.name);
            stats.hit();
            hit
        }
        None => {
            let decoded = backend
                .decode(&loaded.bytes, extension.as_deref())
                .map_err(decode_failure)?;
            stats.miss();
            if let Some(key) = key {
                cache.insert(key, decoded.clone());
            }
            decoded
        }
    };

    let texture = prepare_texture(
        backend,
        &decoded,
        &options.policy,
        options.format,
        options.quality,
    )?;

    let file_name = output_file_name(&loaded.name, &options.suffix, options.format.extension());
    let path = options.output_dir.join(file_name);
    write_output(&path, &texture.bytes)?;

    Ok(Written {
        path,
        original: texture.original,
        target: texture.target,
    })
}

fn decode_failure(err: BackendError) -> ItemError {
    match err {
        BackendError::Decode(msg) => ItemError::DecodeFailure(msg),
        other => ItemError::DecodeFailure(other.to_string()),
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), ItemError> {
    std::fs::write(path, bytes).map_err(|source| ItemError::IoFailure {
        path: path.to_path_buf(),
        source,
    })
}

fn send(events: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening.
        tx.send(event).ok();
    }
}
