//! Batch conversion of record files to track files.
//!
//! Accepts a single record file or a directory of them and writes each
//! rendered track next to its source file. One bad record never aborts
//! the rest of a directory run; failures are logged and collected into
//! the returned report.

use crate::export::{ExportError, TrackFormat};
use crate::records::store;
use crate::records::RECORD_EXTENSION;
use std::fs;
use std::path::{Path, PathBuf};

/// One record file that could not be converted.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a batch export run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output files written, in processing order
    pub written: Vec<PathBuf>,
    /// Record files skipped because of a per-file error
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    /// True when every record converted cleanly.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Convert a record file, or every record file in a directory
/// (non-recursive), to the requested track format.
///
/// Each output lands next to its input as `<basename>.<gpx|kml>`,
/// silently overwriting a previous export. Per-file failures are
/// reported in the result; only an unusable input path is an error.
pub fn export_path(input: &Path, format: TrackFormat) -> Result<BatchReport, ExportError> {
    let files = collect_record_files(input)?;
    let mut report = BatchReport::default();

    for file in files {
        match convert_file(&file, format) {
            Ok(output) => {
                tracing::info!("Wrote {}", output.display());
                report.written.push(output);
            }
            Err(err) => {
                tracing::warn!("Skipping {}: {}", file.display(), err);
                report.failures.push(FileFailure {
                    path: file,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(report)
}

/// Resolve the input path to the list of record files to process.
fn collect_record_files(input: &Path) -> Result<Vec<PathBuf>, ExportError> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == RECORD_EXTENSION)
        })
        .collect();

    // Deterministic processing order regardless of directory iteration.
    files.sort();

    Ok(files)
}

fn convert_file(path: &Path, format: TrackFormat) -> Result<PathBuf, ExportError> {
    let ride = store::load_ride(path)?;
    let rendered = format.render(&ride)?;

    let output = path.with_extension(format.extension());
    fs::write(&output, rendered)?;

    Ok(output)
}
