//! Pure dimension math for texture-friendly sizes.
//!
//! Block-compressed texture formats work on 4x4 pixel tiles, so both sides
//! of an output image must be a multiple of 4. [`normalize`] gets there in
//! four passes:
//!
//! 1. **Cap** to `max_width` / `max_height`, width first, scaling the other
//!    side by the source aspect ratio when aspect preservation is on.
//! 2. **Round** each side to the nearest multiple of 4 (remainder 2 rounds up).
//! 3. **Repair** the aspect ratio: if it drifted by more than 1 %, height is
//!    recomputed from the rounded width and rounded again.
//! 4. **Bound** every side to within [`MAX_ADJUSTMENT`] pixels of its capped
//!    value and back under its cap.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::types::Dimensions;
use thiserror::Error;

/// Block size both output dimensions must be divisible by.
pub const BLOCK: u32 = 4;

/// Largest distance, in pixels, a side may move away from its capped value.
pub const MAX_ADJUSTMENT: u32 = 4;

/// Relative aspect-ratio drift tolerated before the repair pass kicks in.
pub const ASPECT_TOLERANCE: f64 = 0.01;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DimensionError {
    #[error("invalid dimensions {width}x{height}: both sides must be positive")]
    Zero { width: u32, height: u32 },
    #[error("size cap {0} is smaller than the {BLOCK}px block size")]
    CapTooSmall(u32),
}

/// How [`normalize`] treats size caps and aspect ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizationPolicy {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    /// Explicit aspect-ratio choice. `None` preserves the ratio exactly when
    /// a cap is configured.
    pub preserve_aspect_ratio: Option<bool>,
}

impl NormalizationPolicy {
    /// No caps, no aspect repair: per-side rounding only.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Cap both sides and preserve the aspect ratio.
    pub fn capped(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width: Some(max_width),
            max_height: Some(max_height),
            preserve_aspect_ratio: None,
        }
    }

    pub fn has_caps(&self) -> bool {
        self.max_width.is_some() || self.max_height.is_some()
    }

    pub fn preserves_aspect_ratio(&self) -> bool {
        self.preserve_aspect_ratio.unwrap_or_else(|| self.has_caps())
    }

    /// Reject caps no multiple of 4 can satisfy.
    pub fn validate(&self) -> Result<(), DimensionError> {
        for cap in [self.max_width, self.max_height].into_iter().flatten() {
            if cap < BLOCK {
                return Err(DimensionError::CapTooSmall(cap));
            }
        }
        Ok(())
    }
}

/// Compute texture-friendly dimensions for a `width`x`height` source.
///
/// # Examples
/// ```
/// use texprep::imaging::{NormalizationPolicy, normalize};
///
/// let dims = normalize(10, 9, &NormalizationPolicy::unbounded()).unwrap();
/// assert_eq!((dims.width, dims.height), (12, 8));
///
/// let dims = normalize(4000, 3000, &NormalizationPolicy::capped(2048, 2048)).unwrap();
/// assert_eq!((dims.width, dims.height), (2048, 1536));
/// ```
pub fn normalize(
    width: u32,
    height: u32,
    policy: &NormalizationPolicy,
) -> Result<Dimensions, DimensionError> {
    if width == 0 || height == 0 {
        return Err(DimensionError::Zero { width, height });
    }
    policy.validate()?;

    let aspect = width as f64 / height as f64;
    let preserve = policy.preserves_aspect_ratio();
    let capped = apply_caps(width, height, aspect, policy.max_width, policy.max_height, preserve);

    let out_w = nearest_multiple(capped.width);
    let mut out_h = nearest_multiple(capped.height);

    if preserve && aspect_drift(out_w, out_h, aspect) > ASPECT_TOLERANCE {
        out_h = nearest_multiple(scale(out_w, 1.0 / aspect));
    }

    Ok(Dimensions {
        width: settle(out_w, capped.width, policy.max_width),
        height: settle(out_h, capped.height, policy.max_height),
    })
}

/// Apply the size caps, width first, then height against the scaled height.
fn apply_caps(
    width: u32,
    height: u32,
    aspect: f64,
    max_width: Option<u32>,
    max_height: Option<u32>,
    preserve: bool,
) -> Dimensions {
    let (mut w, mut h) = (width, height);

    if let Some(max_w) = max_width.filter(|&m| w > m) {
        w = max_w;
        if preserve {
            h = scale(w, 1.0 / aspect);
        }
    }
    if let Some(max_h) = max_height.filter(|&m| h > m) {
        h = max_h;
        if preserve {
            w = scale(h, aspect);
        }
    }

    Dimensions {
        width: w,
        height: h,
    }
}

/// `round(value * factor)`, never below 1.
fn scale(value: u32, factor: f64) -> u32 {
    ((value as f64 * factor).round() as u32).max(1)
}

/// Nearest multiple of 4, remainder 2 rounding up. Never returns 0.
///
/// ```text
/// 8 → 8    9 → 8    10 → 12    11 → 12    1 → 4
/// ```
pub fn nearest_multiple(value: u32) -> u32 {
    let remainder = value % BLOCK;
    let lower = value - remainder;
    let rounded = if remainder == 0 {
        value
    } else if remainder >= BLOCK / 2 {
        // The top multiple of 4 below u32::MAX has nowhere to round up to.
        lower.checked_add(BLOCK).unwrap_or(lower)
    } else {
        lower
    };
    rounded.max(BLOCK)
}

fn aspect_drift(width: u32, height: u32, aspect: f64) -> f64 {
    let ratio = width as f64 / height as f64;
    (ratio / aspect - 1.0).abs()
}

/// Pull `value` back within [`MAX_ADJUSTMENT`] of `reference`, then under `cap`.
fn settle(value: u32, reference: u32, cap: Option<u32>) -> u32 {
    let bounded = limit_adjustment(value, reference);
    match cap {
        Some(cap) if bounded > cap => floor_multiple(cap),
        _ => bounded,
    }
}

/// Step from `reference` by at most [`MAX_ADJUSTMENT`] toward `value`,
/// landing on a multiple of 4.
fn limit_adjustment(value: u32, reference: u32) -> u32 {
    if value.abs_diff(reference) <= MAX_ADJUSTMENT {
        return value;
    }
    if value > reference {
        floor_multiple(reference.saturating_add(MAX_ADJUSTMENT))
    } else {
        ceil_multiple(reference.saturating_sub(MAX_ADJUSTMENT)).max(BLOCK)
    }
}

fn floor_multiple(value: u32) -> u32 {
    (value - value % BLOCK).max(BLOCK)
}

fn ceil_multiple(value: u32) -> u32 {
    value.div_ceil(BLOCK) * BLOCK
}
