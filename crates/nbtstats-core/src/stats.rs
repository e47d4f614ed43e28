//! Occurrence aggregation over normalized value trees.
//!
//! Scans already-extracted JSON trees for four-int-array identifiers,
//! resolves each through the name table, and tallies occurrences per name.
//! Any four-element all-integer array under the selected key path counts as
//! a candidate; the format carries no tag distinguishing identifiers from
//! other short integer arrays, so unrelated quadruples can be miscounted.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::ident::{IdentValue, NameTable};
use crate::sources::enumerate_sources;
use crate::writer::{write_json_value, WriteError, WriteMode};

/// Read every JSON file under `root` and return the value at `key_path`
/// from each file where the full path is present.
///
/// Unreadable or unparseable files are skipped, as are files missing any
/// key along the path.
pub fn extract_key_path(root: &Path, key_path: &[&str]) -> Vec<Value> {
    let mut results = Vec::new();
    for path in enumerate_sources(&[root.to_path_buf()], &["json"]) {
        let Some(value) = read_json(&path) else {
            continue;
        };
        let mut current = &value;
        let mut found = true;
        for key in key_path {
            match current.get(key) {
                Some(next) => current = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if found {
            results.push(current.clone());
        }
    }
    results
}

fn read_json(path: &Path) -> Option<Value> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "skipping unreadable file");
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "skipping invalid JSON");
            None
        }
    }
}

/// Recursively collect every array of exactly four integers.
///
/// A matching array is taken whole and not descended into; anything else
/// recurses. Entries outside the 32-bit range wrap to their low 32 bits,
/// matching how the save format stores identifier words.
pub fn collect_int_arrays(value: &Value) -> Vec<[i32; 4]> {
    let mut out = Vec::new();
    walk(value, &mut out);
    out
}

fn walk(value: &Value, out: &mut Vec<[i32; 4]>) {
    match value {
        Value::Array(items) => {
            if let Some(words) = as_int_array(items) {
                out.push(words);
            } else {
                for item in items {
                    walk(item, out);
                }
            }
        }
        Value::Object(entries) => {
            for item in entries.values() {
                walk(item, out);
            }
        }
        _ => {}
    }
}

fn as_int_array(items: &[Value]) -> Option<[i32; 4]> {
    if items.len() != 4 {
        return None;
    }
    let mut words = [0i32; 4];
    for (word, item) in words.iter_mut().zip(items) {
        *word = item.as_i64()? as i32;
    }
    Some(words)
}

/// Count identifier occurrences under `key_path` across every JSON tree
/// below `root`, keyed by resolved name (or the no-match indicator string).
pub fn count_occurrences(
    root: &Path,
    key_path: &[&str],
    table: &NameTable,
) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for value in extract_key_path(root, key_path) {
        for words in collect_int_arrays(&value) {
            if let Ok(name) = table.display_name(&IdentValue::Ints(words.to_vec())) {
                *counts.entry(name).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Persist a count table as a single JSON object, replacing any prior
/// report at the destination.
pub fn write_report(counts: &BTreeMap<String, u64>, out_path: &Path) -> Result<(), WriteError> {
    let value = serde_json::to_value(counts).map_err(|source| WriteError::SerializeJson {
        path: out_path.to_path_buf(),
        source,
    })?;
    write_json_value(&value, out_path, WriteMode::Overwrite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn write_tree(root: &Path, rel: &str, value: &Value) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_vec(value).unwrap()).unwrap();
    }

    mod key_paths {
        use super::*;

        #[test]
        fn collects_values_at_nested_path() {
            let dir = TempDir::new().unwrap();
            write_tree(
                dir.path(),
                "a.json",
                &json!({"data": {"openers": [1, 2]}}),
            );
            write_tree(dir.path(), "sub/b.json", &json!({"data": {"openers": 3}}));
            write_tree(dir.path(), "c.json", &json!({"data": {"other": 4}}));

            let mut values = extract_key_path(dir.path(), &["data", "openers"]);
            values.sort_by_key(|v| v.to_string());
            assert_eq!(values, vec![json!(3), json!([1, 2])]);
        }

        #[test]
        fn skips_unparseable_files() {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("bad.json"), b"not json").unwrap();
            write_tree(dir.path(), "good.json", &json!({"k": 1}));

            assert_eq!(extract_key_path(dir.path(), &["k"]), vec![json!(1)]);
        }
    }

    mod int_array_scan {
        use super::*;

        #[test]
        fn finds_quadruples_at_any_depth() {
            let value = json!({
                "direct": [1, 2, 3, 4],
                "nested": {"deep": [[5, 6, 7, 8], "noise"]},
            });
            let mut found = collect_int_arrays(&value);
            found.sort();
            assert_eq!(found, vec![[1, 2, 3, 4], [5, 6, 7, 8]]);
        }

        #[test]
        fn ignores_wrong_lengths_and_mixed_types() {
            let value = json!({
                "three": [1, 2, 3],
                "five": [1, 2, 3, 4, 5],
                "mixed": [1, 2, "x", 4],
            });
            assert!(collect_int_arrays(&value).is_empty());
        }

        #[test]
        fn matched_quadruple_is_not_descended_into() {
            // A quadruple of ints is taken whole even though each element
            // would itself be scanned inside a longer array.
            let value = json!([[1, 2, 3, 4]]);
            assert_eq!(collect_int_arrays(&value), vec![[1, 2, 3, 4]]);
        }

        #[test]
        fn out_of_range_entries_wrap_to_low_32_bits() {
            let value = json!([[4294967296i64, 0, 0, 0]]);
            assert_eq!(collect_int_arrays(&value), vec![[0, 0, 0, 0]]);
        }
    }

    mod counting {
        use super::*;

        #[test]
        fn counts_known_and_unknown_identifiers() {
            let dir = TempDir::new().unwrap();
            // AtlasV1224 appears twice, one unknown identifier once.
            let atlas = json!([2088048874, -679722978, -2141306900, -1177290616]);
            write_tree(
                dir.path(),
                "one.json",
                &json!({"data": {"openers": [atlas.clone(), atlas.clone()]}}),
            );
            write_tree(
                dir.path(),
                "two.json",
                &json!({"data": {"openers": [[1, 2, 3, 4]]}}),
            );

            let counts = count_occurrences(dir.path(), &["data", "openers"], &NameTable::builtin());
            assert_eq!(counts.get("AtlasV1224"), Some(&2));
            let unknown: Vec<_> = counts
                .keys()
                .filter(|k| k.starts_with("no name found for UUID: "))
                .collect();
            assert_eq!(unknown.len(), 1);
        }

        #[test]
        fn injected_table_resolves_custom_entry() {
            let dir = TempDir::new().unwrap();
            write_tree(
                dir.path(),
                "data.json",
                &json!({"data": [[2122219690, -1427526657, -1754699066, -1091895974]]}),
            );

            let table = NameTable::new([(
                "Tester".to_string(),
                Uuid::parse_str("7e7e80aa-aae9-abff-9769-6ac6beeafd5a").unwrap(),
            )]);
            let counts = count_occurrences(dir.path(), &["data"], &table);
            assert_eq!(counts.get("Tester"), Some(&1));
            assert_eq!(counts.len(), 1);
        }
    }

    mod report {
        use super::*;

        #[test]
        fn report_overwrites_prior_content() {
            let dir = TempDir::new().unwrap();
            let out = dir.path().join("sorted/report.json");

            let mut counts = BTreeMap::new();
            counts.insert("AtlasV1224".to_string(), 3u64);
            write_report(&counts, &out).unwrap();

            counts.insert("SinZ".to_string(), 1);
            write_report(&counts, &out).unwrap();

            let value: Value =
                serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
            assert_eq!(value, json!({"AtlasV1224": 3, "SinZ": 1}));
        }
    }
}
