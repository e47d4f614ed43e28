//! Source enumeration over files and directories.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Collect candidate files from one or more sources.
///
/// Each source is either a directory (matched recursively) or a single file
/// (kept only if its extension matches). Extension matching is
/// case-insensitive on the final extension; entries in `extensions` may be
/// given with or without a leading dot.
///
/// Order follows source order, then deterministic directory-traversal order.
/// Roots and files are deduplicated by canonicalized absolute path, so each
/// physical file appears at most once even when supplied roots overlap.
/// Nonexistent sources are skipped, not errors: batch runs over
/// partially-present backups are expected.
pub fn enumerate_sources(sources: &[PathBuf], extensions: &[&str]) -> Vec<PathBuf> {
    let wanted: Vec<String> = extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .collect();

    let mut seen_roots: HashSet<PathBuf> = HashSet::new();
    let mut seen_files: HashSet<PathBuf> = HashSet::new();
    let mut out = Vec::new();

    for source in sources {
        if !source.exists() {
            debug!(path = %source.display(), "skipping nonexistent source");
            continue;
        }
        if !seen_roots.insert(identity_key(source)) {
            continue;
        }

        if source.is_dir() {
            for entry in WalkDir::new(source)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if extension_matches(path, &wanted) && seen_files.insert(identity_key(path)) {
                    out.push(path.to_path_buf());
                }
            }
        } else if extension_matches(source, &wanted) && seen_files.insert(identity_key(source)) {
            out.push(source.clone());
        }
    }

    out
}

/// Dedup key for a path: canonicalized when possible, as-given otherwise.
fn identity_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn extension_matches(path: &Path, wanted: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| wanted.iter().any(|w| *w == ext))
}
