//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! art/
//!     a.JPG (jpg, 12.0 KB)
//!     chars/hero.psd (psd, 1.2 MB)
//! 2 files
//! ```
//!
//! ## Process
//!
//! ```text
//! [1/3] art/Ảnh đẹp.png
//!     1023x767 -> 1024x768
//!     Output: output/Anh_dep_u.png
//! [2/3] art/broken.png
//!     Failed: failed to decode image: ...
//! ```
//!
//! ## Summary
//!
//! ```text
//! Processed 2 of 3 files (1 failed)
//! Cache: 3 decoded
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::process::{BatchReport, ProcessEvent};
use crate::scan::ScannedFile;
use std::path::Path;

/// Indentation for context lines under an entry.
const INDENT: &str = "    ";

fn display_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}

// ============================================================================
// Scan output
// ============================================================================

/// Format the files found under `root`, paths shown relative to it.
pub fn format_scan_output(root: &Path, files: &[ScannedFile]) -> Vec<String> {
    let mut lines = vec![format!("{}/", root.display())];
    for file in files {
        let rel = file.path.strip_prefix(root).unwrap_or(&file.path);
        lines.push(format!(
            "{INDENT}{} ({}, {})",
            rel.display(),
            file.kind,
            display_size(file.size)
        ));
    }
    lines.push(plural(files.len(), "file", "files"));
    lines
}

pub fn print_scan_output(root: &Path, files: &[ScannedFile]) {
    for line in format_scan_output(root, files) {
        println!("{}", line);
    }
}

// ============================================================================
// Process output
// ============================================================================

/// Format a single process progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::ItemStarted { index, total, name } => {
            vec![format!("[{}/{}] {}", index, total, name)]
        }
        ProcessEvent::ItemFinished { outcome, .. } => {
            if let Some(error) = &outcome.error {
                return vec![format!("{INDENT}Failed: {}", error)];
            }
            let mut lines = Vec::new();
            if let (Some(from), Some(to)) = (outcome.original_size, outcome.new_size) {
                if from == to {
                    lines.push(format!("{INDENT}{} (unchanged)", to));
                } else {
                    lines.push(format!("{INDENT}{} -> {}", from, to));
                }
            }
            if let Some(path) = &outcome.output_path {
                lines.push(format!("{INDENT}Output: {}", path.display()));
            }
            lines
        }
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Format the end-of-batch summary.
pub fn format_summary(report: &BatchReport) -> Vec<String> {
    let failed = report.failures().count();
    let mut headline = format!(
        "Processed {} of {}",
        report.processed_count,
        plural(report.total_count, "file", "files")
    );
    if failed > 0 {
        headline.push_str(&format!(" ({} failed)", failed));
    }
    let mut lines = vec![headline];
    if report.cancelled {
        let skipped = report.total_count - report.outcomes.len();
        lines.push(format!("Cancelled: {} not attempted", skipped));
    }
    lines.push(format!("Cache: {}", report.cache));
    lines
}

pub fn print_summary(report: &BatchReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}
