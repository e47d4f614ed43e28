//! Output path mapping.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Path-mapping precondition failure: the input is not under the project
/// root. Fatal for the affected file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path} is not under project root {root}")]
pub struct PathNotUnderRoot {
    pub path: PathBuf,
    pub root: PathBuf,
}

/// Compute the output location for an input file.
///
/// The result preserves the input's path relative to `project_root` under
/// `output_root`, with the final extension replaced by `new_ext` (leading
/// dot optional). Pure, no I/O. Distinct relative paths map to distinct
/// outputs.
pub fn map_output_path(
    input: &Path,
    project_root: &Path,
    output_root: &Path,
    new_ext: &str,
) -> Result<PathBuf, PathNotUnderRoot> {
    let relative = input
        .strip_prefix(project_root)
        .map_err(|_| PathNotUnderRoot {
            path: input.to_path_buf(),
            root: project_root.to_path_buf(),
        })?;
    Ok(output_root
        .join(relative)
        .with_extension(new_ext.trim_start_matches('.')))
}
