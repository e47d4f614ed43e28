//! Atomic persistence: structured writes, raw copies, and JSON reports.
//!
//! Every write here follows the same discipline: serialize or stream into a
//! temporary sibling file, then `rename` over the destination. The final
//! path is only ever mutated by the rename, so readers observe either the
//! old content or the new content, never a partial write. On failure the
//! temporary file is left in place for diagnosis.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use thiserror::Error;

/// Structured output serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// Output file extension for this format, without a dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Mode for [`write_json_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the destination.
    Overwrite,
    /// Append the value to an existing JSON list (or start a new one).
    Append,
}

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize value for {path}: {source}")]
    SerializeJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize value for {path}: {source}")]
    SerializeYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("append target {path} does not contain a JSON list")]
    AppendTargetNotAList { path: PathBuf },

    #[error("append target {path} is not valid JSON: {source}")]
    AppendTargetInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Serialize a canonical value to `out_path` in the chosen format.
///
/// Parent directories are created as needed. JSON output is pretty-printed
/// with stable key order; YAML uses block style.
pub fn write_structured(
    value: &Value,
    out_path: &Path,
    format: OutputFormat,
) -> Result<(), WriteError> {
    let mut content = match format {
        OutputFormat::Json => {
            serde_json::to_vec_pretty(value).map_err(|source| WriteError::SerializeJson {
                path: out_path.to_path_buf(),
                source,
            })?
        }
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|source| WriteError::SerializeYaml {
                path: out_path.to_path_buf(),
                source,
            })?
            .into_bytes(),
    };
    if !content.ends_with(b"\n") {
        content.push(b'\n');
    }
    atomic_write(out_path, &content).map_err(|source| WriteError::Io {
        path: out_path.to_path_buf(),
        source,
    })
}

/// Copy a raw file to `out_path` with the same temp-then-rename discipline,
/// streaming in fixed-size chunks.
pub fn copy_file(src: &Path, out_path: &Path) -> Result<(), WriteError> {
    let source_file = File::open(src).map_err(|source| WriteError::Io {
        path: src.to_path_buf(),
        source,
    })?;

    let io_err = |source| WriteError::Io {
        path: out_path.to_path_buf(),
        source,
    };
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let temp = temp_path_for(out_path);
    let temp_file = File::create(&temp).map_err(io_err)?;

    let mut reader = BufReader::new(source_file);
    let mut writer = BufWriter::new(temp_file);
    io::copy(&mut reader, &mut writer).map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    drop(writer);

    fs::rename(&temp, out_path).map_err(io_err)
}

/// Write a JSON value, either replacing the destination or appending to the
/// list it contains.
///
/// Append mode requires the existing destination (if any) to hold a JSON
/// list; a non-list or unparseable target is a descriptive error, not a
/// silent overwrite.
pub fn write_json_value(value: &Value, out_path: &Path, mode: WriteMode) -> Result<(), WriteError> {
    let to_write = match mode {
        WriteMode::Overwrite => value.clone(),
        WriteMode::Append => {
            let mut existing = match fs::read_to_string(out_path) {
                Ok(text) => {
                    let parsed: Value = serde_json::from_str(&text).map_err(|source| {
                        WriteError::AppendTargetInvalid {
                            path: out_path.to_path_buf(),
                            source,
                        }
                    })?;
                    match parsed {
                        Value::Array(items) => items,
                        _ => {
                            return Err(WriteError::AppendTargetNotAList {
                                path: out_path.to_path_buf(),
                            })
                        }
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
                Err(source) => {
                    return Err(WriteError::Io {
                        path: out_path.to_path_buf(),
                        source,
                    })
                }
            };
            existing.push(value.clone());
            Value::Array(existing)
        }
    };
    write_structured(&to_write, out_path, OutputFormat::Json)
}

/// Temp sibling name for a destination: same directory, derived file name,
/// unique per process and instant.
fn temp_path_for(path: &Path) -> PathBuf {
    let pid = std::process::id();
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    path.with_file_name(format!(
        ".{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        pid,
        timestamp
    ))
}

/// Write content via a temporary sibling plus rename. If the process dies
/// before the rename, only the temp file is orphaned; the destination is
/// untouched.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp = temp_path_for(path);
    fs::write(&temp, content)?;
    fs::rename(&temp, path)
}
