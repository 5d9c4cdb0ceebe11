//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Compress
//!
//! ```text
//! Compressing 2 images
//! 001 avatar.jpg
//!     Source: photos/avatar.jpg
//!     q0.60: 80.0 KB
//!     q0.55: 48.2 KB
//!     Output: compressed/avatar.webp (48.2 KB, within budget)
//! 002 scan.png
//!     Source: photos/scan.png
//!     Failed: Encode failed: Processing failed: ...
//!
//! 1 within budget, 0 over budget, 1 failed (budget 50.0 KB)
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 avatar.jpg: image/jpeg
//! 002 anim.gif: image/gif (unsupported)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::MediaType;
use crate::process::{ProcessEvent, Summary};
use std::path::{Path, PathBuf};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Bytes as KiB with one decimal: `49152` → `48.0 KB`.
pub fn format_size(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { image_count } => {
            let noun = if *image_count == 1 { "image" } else { "images" };
            vec![format!("Compressing {} {}", image_count, noun)]
        }
        ProcessEvent::ImageCompressed {
            index,
            source_path,
            output_path,
            size,
            within_budget,
            attempts,
        } => {
            let mut lines = vec![
                format!("{} {}", format_index(*index), file_name(source_path)),
                format!("{}Source: {}", indent(1), source_path),
            ];
            for attempt in attempts {
                lines.push(format!(
                    "{}q{}: {}",
                    indent(1),
                    attempt.quality,
                    format_size(attempt.size)
                ));
            }
            let verdict = if *within_budget {
                "within budget"
            } else {
                "over budget"
            };
            lines.push(format!(
                "{}Output: {} ({}, {})",
                indent(1),
                output_path,
                format_size(*size),
                verdict
            ));
            lines
        }
        ProcessEvent::ImageFailed {
            index,
            source_path,
            error,
        } => vec![
            format!("{} {}", format_index(*index), file_name(source_path)),
            format!("{}Source: {}", indent(1), source_path),
            format!("{}Failed: {}", indent(1), error),
        ],
    }
}

pub fn format_summary(summary: &Summary, budget: u64) -> String {
    format!(
        "{} within budget, {} over budget, {} failed (budget {})",
        summary.within_budget,
        summary.over_budget,
        summary.failed,
        format_size(budget)
    )
}

pub fn format_check_output(checked: &[(PathBuf, MediaType)]) -> Vec<String> {
    checked
        .iter()
        .enumerate()
        .map(|(i, (path, media))| {
            let name = file_name(&path.display().to_string());
            if media.is_accepted_input() {
                format!("{} {}: {}", format_index(i + 1), name, media)
            } else {
                format!("{} {}: {} (unsupported)", format_index(i + 1), name, media)
            }
        })
        .collect()
}

pub fn print_check_output(checked: &[(PathBuf, MediaType)]) {
    for line in format_check_output(checked) {
        println!("{}", line);
    }
}

pub fn print_summary(summary: &Summary, budget: u64) {
    println!();
    println!("{}", format_summary(summary, budget));
}
