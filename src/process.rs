//! Batch compression.
//!
//! Takes a list of files and directories, picks every image in them, runs
//! each through [`compress_to_budget`](crate::imaging::compress_to_budget),
//! and copies the winning attempt into the output directory.
//!
//! ## Output Structure
//!
//! ```text
//! compressed/
//! ├── report.json        # Per-image attempts, sizes, and failures
//! ├── avatar.webp
//! ├── avatar-2.webp      # Second input whose stem was also "avatar"
//! └── selfie.webp
//! ```
//!
//! ## Failures
//!
//! A file that can't be picked or compressed (missing, unsupported format,
//! corrupt) is recorded as a failed entry; the rest of the batch carries on.
//! Only I/O on the output directory itself aborts the run.
//!
//! ## Parallel Processing
//!
//! Files are compressed in parallel using [rayon](https://docs.rs/rayon).
//! Each individual compression stays a sequential loop.

use crate::imaging::{
    Attempt, BackendError, CompressConfig, ImageBackend, MediaType, QualityLevel, RustBackend,
};
use crate::picker::{PathPicker, pick_and_compress};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

/// Name of the report written next to the outputs.
pub const REPORT_FILENAME: &str = "report.json";

/// Extensions picked up when walking a directory input.
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff", "heic", "heif", "avif",
];

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Progress events, sent as each image finishes.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started {
        image_count: usize,
    },
    ImageCompressed {
        index: usize,
        source_path: String,
        output_path: String,
        size: u64,
        within_budget: bool,
        attempts: Vec<Attempt>,
    },
    ImageFailed {
        index: usize,
        source_path: String,
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    /// Budget the batch ran against, in bytes.
    pub budget: u64,
    pub images: Vec<ImageReport>,
    /// Set when the work directory could not be removed afterwards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub source: String,
    #[serde(flatten)]
    pub outcome: ImageOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageOutcome {
    Compressed {
        output: String,
        media_type: MediaType,
        size: u64,
        quality: QualityLevel,
        within_budget: bool,
        attempts: Vec<Attempt>,
    },
    Failed {
        error: String,
    },
}

/// Outcome tallies for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub within_budget: usize,
    pub over_budget: usize,
    pub failed: usize,
}

impl ProcessReport {
    pub fn summary(&self) -> Summary {
        self.images
            .iter()
            .fold(Summary::default(), |mut s, image| {
                match &image.outcome {
                    ImageOutcome::Compressed {
                        within_budget: true,
                        ..
                    } => s.within_budget += 1,
                    ImageOutcome::Compressed { .. } => s.over_budget += 1,
                    ImageOutcome::Failed { .. } => s.failed += 1,
                }
                s
            })
    }
}

/// Expand directory inputs into their image files, sorted by path.
///
/// Explicit file arguments are kept as given, whatever their extension, so
/// that unsupported files show up as failures instead of vanishing.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, ProcessError> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && has_image_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Output filename for each input: `<stem>.webp`, with `-2`, `-3`, … appended
/// until the name is free. Names are compared case-insensitively.
pub fn assign_output_names(inputs: &[PathBuf]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    inputs
        .iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let mut name = format!("{stem}.webp");
            let mut suffix = 1;
            while !taken.insert(name.to_lowercase()) {
                suffix += 1;
                name = format!("{stem}-{suffix}.webp");
            }
            name
        })
        .collect()
}

/// Compress every input with a [`RustBackend`] rooted at `work_dir`.
///
/// The work directory is removed once the batch is done. A failed removal
/// never replaces the batch outcome; see [`ProcessReport::cleanup_error`].
pub fn process(
    inputs: &[PathBuf],
    output_dir: &Path,
    work_dir: &Path,
    config: &CompressConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessReport, ProcessError> {
    let backend = RustBackend::new(work_dir);
    let report = process_with_backend(&backend, inputs, output_dir, config, events);
    finish_batch(report, backend.clear())
}

fn finish_batch(
    report: Result<ProcessReport, ProcessError>,
    cleanup: Result<(), BackendError>,
) -> Result<ProcessReport, ProcessError> {
    let mut report = report?;
    if let Err(e) = cleanup {
        report.cleanup_error = Some(e.to_string());
    }
    Ok(report)
}

/// Compress every input using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    inputs: &[PathBuf],
    output_dir: &Path,
    config: &CompressConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessReport, ProcessError> {
    let files = collect_inputs(inputs)?;
    let names = assign_output_names(&files);
    std::fs::create_dir_all(output_dir)?;

    if let Some(tx) = &events {
        tx.send(ProcessEvent::Started {
            image_count: files.len(),
        })
        .ok();
    }

    let images = files
        .par_iter()
        .zip(names.par_iter())
        .enumerate()
        .map(|(i, (file, name))| {
            let index = i + 1;
            let source_path = file.display().to_string();
            let outcome = compress_one(backend, file, &output_dir.join(name), config);

            if let Some(tx) = &events {
                let event = match &outcome {
                    ImageOutcome::Compressed {
                        output,
                        size,
                        within_budget,
                        attempts,
                        ..
                    } => ProcessEvent::ImageCompressed {
                        index,
                        source_path: source_path.clone(),
                        output_path: output.clone(),
                        size: *size,
                        within_budget: *within_budget,
                        attempts: attempts.clone(),
                    },
                    ImageOutcome::Failed { error } => ProcessEvent::ImageFailed {
                        index,
                        source_path: source_path.clone(),
                        error: error.clone(),
                    },
                };
                tx.send(event).ok();
            }

            ImageReport {
                source: source_path,
                outcome,
            }
        })
        .collect();

    Ok(ProcessReport {
        budget: config.budget.bytes(),
        images,
        cleanup_error: None,
    })
}

fn compress_one(
    backend: &impl ImageBackend,
    file: &Path,
    destination: &Path,
    config: &CompressConfig,
) -> ImageOutcome {
    let picker = PathPicker::new(file);
    let compressed = match pick_and_compress(&picker, backend, config) {
        Ok(Some(compressed)) => compressed,
        Ok(None) => {
            return ImageOutcome::Failed {
                error: "pick cancelled".to_string(),
            };
        }
        Err(e) => {
            return ImageOutcome::Failed {
                error: e.to_string(),
            };
        }
    };

    if let Err(e) = std::fs::copy(&compressed.image.path, destination) {
        return ImageOutcome::Failed {
            error: format!("Failed to write {}: {}", destination.display(), e),
        };
    }

    ImageOutcome::Compressed {
        output: destination.display().to_string(),
        media_type: compressed.image.media_type,
        size: compressed.size,
        quality: compressed.quality,
        within_budget: compressed.within_budget,
        attempts: compressed.attempts,
    }
}

/// Media-type check without encoding, for the `check` command.
pub fn check_inputs(inputs: &[PathBuf]) -> Result<Vec<(PathBuf, MediaType)>, ProcessError> {
    Ok(collect_inputs(inputs)?
        .into_iter()
        .map(|path| {
            let media = MediaType::from_path(&path);
            (path, media)
        })
        .collect())
}

/// Write the report as pretty JSON into `output_dir`.
pub fn write_report(report: &ProcessReport, output_dir: &Path) -> Result<PathBuf, ProcessError> {
    let path = output_dir.join(REPORT_FILENAME);
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::{create_test_jpeg, touch};
    use std::fs;
    use tempfile::TempDir;

    const KB: u64 = 1024;

    // =========================================================================
    // Input collection and naming
    // =========================================================================

    #[test]
    fn collect_inputs_walks_directories_sorted() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("photos/b.png"));
        touch(&tmp.path().join("photos/a.jpg"));
        touch(&tmp.path().join("photos/nested/c.JPEG"));
        touch(&tmp.path().join("photos/notes.txt"));

        let files = collect_inputs(&[tmp.path().join("photos")]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.JPEG"]);
    }

    #[test]
    fn collect_inputs_keeps_explicit_files() {
        let files = collect_inputs(&[PathBuf::from("/somewhere/notes.txt")]).unwrap();
        assert_eq!(files, vec![PathBuf::from("/somewhere/notes.txt")]);
    }

    #[test]
    fn output_names_skip_names_taken_by_other_stems() {
        let names = assign_output_names(&[
            PathBuf::from("a/avatar.jpg"),
            PathBuf::from("b/avatar.png"),
            PathBuf::from("c/avatar-2.jpg"),
        ]);
        assert_eq!(
            names,
            vec!["avatar.webp", "avatar-2.webp", "avatar-2-2.webp"]
        );
    }

    #[test]
    fn output_names_never_collide_ignoring_case() {
        let names = assign_output_names(&[
            PathBuf::from("x/Photo-2.png"),
            PathBuf::from("y/photo.jpg"),
            PathBuf::from("z/PHOTO.jpg"),
        ]);
        let unique: HashSet<String> = names.iter().map(|n| n.to_lowercase()).collect();
        assert_eq!(unique.len(), names.len());
        assert_eq!(names, vec!["Photo-2.webp", "photo.webp", "PHOTO-3.webp"]);
    }

    #[test]
    fn output_names_deduplicate_stems() {
        let names = assign_output_names(&[
            PathBuf::from("a/avatar.jpg"),
            PathBuf::from("b/avatar.png"),
            PathBuf::from("c/Avatar.jpeg"),
            PathBuf::from("selfie.png"),
        ]);
        assert_eq!(
            names,
            vec!["avatar.webp", "avatar-2.webp", "Avatar-3.webp", "selfie.webp"]
        );
    }

    // =========================================================================
    // Batch with mock backend
    // =========================================================================

    #[test]
    fn process_with_mock_writes_outputs_and_report() {
        let tmp = TempDir::new().unwrap();
        let work = tmp.path().join("work");
        fs::create_dir_all(&work).unwrap();
        touch(&tmp.path().join("in/one.jpg"));
        touch(&tmp.path().join("in/two.png"));

        let backend = MockBackend::with_constant_size(10 * KB).writing_to(&work);
        let out = tmp.path().join("out");
        let report = process_with_backend(
            &backend,
            &[tmp.path().join("in")],
            &out,
            &CompressConfig::default(),
            None,
        )
        .unwrap();

        assert!(out.join("one.webp").exists());
        assert!(out.join("two.webp").exists());
        assert_eq!(
            report.summary(),
            Summary {
                within_budget: 2,
                over_budget: 0,
                failed: 0
            }
        );
        assert_eq!(report.budget, 50 * KB);

        let path = write_report(&report, &out).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["images"][0]["status"], "compressed");
        assert_eq!(json["images"][0]["media_type"], "image/webp");
        assert_eq!(json["images"][0]["quality"], 60);
    }

    #[test]
    fn process_records_failures_and_continues() {
        let tmp = TempDir::new().unwrap();
        let work = tmp.path().join("work");
        fs::create_dir_all(&work).unwrap();
        let good = tmp.path().join("good.jpg");
        let gif = tmp.path().join("anim.gif");
        touch(&good);
        touch(&gif);

        let backend = MockBackend::with_constant_size(500 * KB).writing_to(&work);
        let out = tmp.path().join("out");
        let report = process_with_backend(
            &backend,
            &[good, gif, tmp.path().join("missing.png")],
            &out,
            &CompressConfig::default(),
            None,
        )
        .unwrap();

        assert_eq!(
            report.summary(),
            Summary {
                within_budget: 0,
                over_budget: 1,
                failed: 2
            }
        );
        match &report.images[1].outcome {
            ImageOutcome::Failed { error } => assert!(error.contains("image/gif")),
            other => panic!("expected failure, got {other:?}"),
        }
        match &report.images[2].outcome {
            ImageOutcome::Failed { error } => assert!(error.contains("not found")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn process_sends_events() {
        let tmp = TempDir::new().unwrap();
        let work = tmp.path().join("work");
        fs::create_dir_all(&work).unwrap();
        let good = tmp.path().join("good.jpg");
        touch(&good);

        let backend = MockBackend::with_constant_size(KB).writing_to(&work);
        let (tx, rx) = std::sync::mpsc::channel();
        process_with_backend(
            &backend,
            &[good, tmp.path().join("bad.bmp")],
            &tmp.path().join("out"),
            &CompressConfig::default(),
            Some(tx),
        )
        .unwrap();

        let events: Vec<ProcessEvent> = rx.iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], ProcessEvent::Started { image_count: 2 }));
        assert!(events.iter().any(|e| matches!(
            e,
            ProcessEvent::ImageCompressed {
                index: 1,
                within_budget: true,
                ..
            }
        )));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, ProcessEvent::ImageFailed { index: 2, .. }))
        );
    }

    fn empty_report() -> ProcessReport {
        ProcessReport {
            budget: 50 * KB,
            images: Vec::new(),
            cleanup_error: None,
        }
    }

    #[test]
    fn cleanup_failure_keeps_the_report() {
        let cleanup = Err(BackendError::ProcessingFailed("busy".into()));
        let report = finish_batch(Ok(empty_report()), cleanup).unwrap();
        assert_eq!(report.cleanup_error.as_deref(), Some("Processing failed: busy"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["cleanup_error"], "Processing failed: busy");
    }

    #[test]
    fn cleanup_failure_does_not_mask_batch_error() {
        let batch = Err(ProcessError::Io(std::io::Error::other("output dir")));
        let cleanup = Err(BackendError::ProcessingFailed("busy".into()));
        match finish_batch(batch, cleanup) {
            Err(ProcessError::Io(e)) => assert_eq!(e.to_string(), "output dir"),
            other => panic!("expected batch error, got {other:?}"),
        }
    }

    #[test]
    fn clean_report_omits_cleanup_error() {
        let report = finish_batch(Ok(empty_report()), Ok(())).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("cleanup_error").is_none());
    }

    #[test]
    fn check_inputs_reports_declared_types() {
        let checked = check_inputs(&[PathBuf::from("a.jpg"), PathBuf::from("b.gif")]).unwrap();
        assert_eq!(checked[0].1, MediaType::Jpeg);
        assert_eq!(checked[1].1, MediaType::Other("image/gif".into()));
    }

    // =========================================================================
    // Batch with the real backend
    // =========================================================================

    #[test]
    fn process_real_jpeg_fits_budget_and_cleans_work_dir() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("portrait.jpg");
        create_test_jpeg(&source, 1200, 1600);

        let out = tmp.path().join("out");
        let work = tmp.path().join("work");
        let report = process(
            &[source],
            &out,
            &work,
            &CompressConfig::default(),
            None,
        )
        .unwrap();

        let output = out.join("portrait.webp");
        assert!(output.exists());
        assert_eq!(image::image_dimensions(&output).unwrap(), (400, 533));
        match &report.images[0].outcome {
            ImageOutcome::Compressed { size, attempts, .. } => {
                assert_eq!(*size, fs::metadata(&output).unwrap().len());
                assert!(!attempts.is_empty());
            }
            other => panic!("expected compressed, got {other:?}"),
        }
        assert!(!work.exists());
    }
}
