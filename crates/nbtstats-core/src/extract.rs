//! The extraction orchestrator.
//!
//! Drives enumerate -> decode -> normalize -> map -> write for tag files,
//! and a separate map -> copy pass for files already in structured form.
//! Per-file failures are collected into the report and logged; one bad file
//! never aborts a batch over thousands of save fragments.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::nbt::decode_file;
use crate::normalize::normalize;
use crate::paths::map_output_path;
use crate::sources::enumerate_sources;
use crate::writer::{copy_file, write_structured, OutputFormat};

/// Inputs for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Files or directories to pull tag files from.
    pub sources: Vec<PathBuf>,
    /// Root of the mirrored output tree.
    pub output_root: PathBuf,
    /// Root that source paths are made relative to.
    pub project_root: PathBuf,
    /// Serialization format for converted files.
    pub format: OutputFormat,
}

/// Pipeline stage at which a file failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Decode,
    MapPath,
    Write,
    Copy,
}

/// One failed file: where it failed and why.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub stage: Stage,
    pub message: String,
}

/// Outcome of an extraction run. The processed count is the run's only
/// success signal; partial failure never escalates to a run-level error.
#[derive(Debug, Default, Serialize)]
pub struct ExtractReport {
    /// Tag files decoded and written as structured output.
    pub converted: usize,
    /// Already-structured files relocated unchanged.
    pub copied: usize,
    /// Per-file failures, in encounter order.
    pub failures: Vec<FileFailure>,
}

impl ExtractReport {
    /// Total files successfully written or copied.
    pub fn processed(&self) -> usize {
        self.converted + self.copied
    }
}

/// Run one extraction batch.
///
/// Zero resolvable input is a no-op success, not an error.
pub fn run_extract(opts: &ExtractOptions) -> ExtractReport {
    let mut report = ExtractReport::default();

    for path in enumerate_sources(&opts.sources, &["dat"]) {
        match convert_one(&path, opts) {
            Ok(()) => {
                debug!(path = %path.display(), "converted");
                report.converted += 1;
            }
            Err(failure) => {
                warn!(path = %path.display(), error = %failure.message, "failed to convert");
                report.failures.push(failure);
            }
        }
    }

    for path in enumerate_sources(&opts.sources, &["json"]) {
        match copy_one(&path, opts) {
            Ok(()) => {
                debug!(path = %path.display(), "copied");
                report.copied += 1;
            }
            Err(failure) => {
                warn!(path = %path.display(), error = %failure.message, "failed to copy");
                report.failures.push(failure);
            }
        }
    }

    report
}

fn convert_one(path: &Path, opts: &ExtractOptions) -> Result<(), FileFailure> {
    let fail = |stage, message| FileFailure {
        path: path.to_path_buf(),
        stage,
        message,
    };

    let tag = decode_file(path).map_err(|err| fail(Stage::Decode, err.to_string()))?;
    let value = normalize(&tag);
    let out_path = map_output_path(
        path,
        &opts.project_root,
        &opts.output_root,
        opts.format.extension(),
    )
    .map_err(|err| fail(Stage::MapPath, err.to_string()))?;
    write_structured(&value, &out_path, opts.format)
        .map_err(|err| fail(Stage::Write, err.to_string()))
}

fn copy_one(path: &Path, opts: &ExtractOptions) -> Result<(), FileFailure> {
    let fail = |stage, message| FileFailure {
        path: path.to_path_buf(),
        stage,
        message,
    };

    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("json");
    let out_path = map_output_path(path, &opts.project_root, &opts.output_root, ext)
        .map_err(|err| fail(Stage::MapPath, err.to_string()))?;
    copy_file(path, &out_path).map_err(|err| fail(Stage::Copy, err.to_string()))
}
