//! Merge every JSON file in a directory into a single array.
//!
//! Arrays are flattened into the aggregate; single objects and scalars
//! are appended as-is. Empty files are skipped.

use crate::error::{Error, Result};
use crate::log_status;
use glob_match::glob_match;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOrder {
    Name,
    Mtime,
    None,
}

#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub dir: PathBuf,
    /// Glob matched against file names (not full paths).
    pub pattern: String,
    pub recursive: bool,
    pub order: FileOrder,
    /// Skip files with invalid JSON instead of aborting.
    pub skip_invalid: bool,
    /// Drop later items whose value under this key was already seen.
    pub dedup_key: Option<String>,
}

#[derive(Debug)]
pub struct MergeResult {
    pub items: Vec<Value>,
    pub files_read: usize,
    pub files_skipped: usize,
}

/// Collect files under `dir` whose name matches `pattern`.
pub fn collect_files(dir: &Path, pattern: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::InputNotFound(format!(
            "'{}' does not exist or is not a directory",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    collect_recursive(dir, pattern, recursive, &mut files)?;
    Ok(files)
}

fn collect_recursive(
    dir: &Path,
    pattern: &str,
    recursive: bool,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in std::fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_recursive(&path, pattern, recursive, files)?;
            }
        } else {
            let name = entry.file_name().to_string_lossy().to_string();
            if glob_match(pattern, &name) {
                files.push(path);
            }
        }
    }
    Ok(())
}

/// Order files by name, mtime, or leave them in directory order.
pub fn sort_files(files: &mut [PathBuf], order: FileOrder) {
    match order {
        FileOrder::Name => {
            files.sort_by_key(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().to_lowercase())
                    .unwrap_or_default()
            });
        }
        FileOrder::Mtime => {
            files.sort_by_key(|p| {
                p.metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH)
            });
        }
        FileOrder::None => {}
    }
}

/// Read and aggregate the given files into one flat item list.
pub fn merge_files(files: &[PathBuf], skip_invalid: bool) -> Result<MergeResult> {
    let mut items = Vec::new();
    let mut files_read = 0;
    let mut files_skipped = 0;

    for path in files {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                if skip_invalid {
                    log_status!("merge", "Skipping {} ({})", path.display(), e);
                    files_skipped += 1;
                    continue;
                }
                return Err(Error::Other(format!(
                    "Failed to read '{}': {}",
                    path.display(),
                    e
                )));
            }
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        let data: Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(e) => {
                if skip_invalid {
                    log_status!("merge", "Skipping {} (invalid JSON: {})", path.display(), e);
                    files_skipped += 1;
                    continue;
                }
                return Err(Error::Other(format!(
                    "Invalid JSON in '{}': {}",
                    path.display(),
                    e
                )));
            }
        };

        files_read += 1;
        match data {
            Value::Array(list) => items.extend(list),
            other => items.push(other),
        }
    }

    Ok(MergeResult {
        items,
        files_read,
        files_skipped,
    })
}

/// Drop later items whose value under `key` was already seen. Items that
/// are not objects, or that lack the key, always pass through.
pub fn dedup_by_key(items: Vec<Value>, key: &str) -> Vec<Value> {
    let mut seen = std::collections::HashSet::new();
    let mut result = Vec::new();
    for item in items {
        if let Some(value) = item.as_object().and_then(|o| o.get(key)) {
            let marker = value.to_string();
            if seen.contains(&marker) {
                continue;
            }
            seen.insert(marker);
        }
        result.push(item);
    }
    result
}

/// Serialize the aggregate with a configurable indent, optionally escaping
/// non-ASCII characters.
pub fn to_json_string(items: &[Value], indent: usize, ascii: bool) -> Result<String> {
    let out = if indent == 0 {
        serde_json::to_string(items)?
    } else {
        let pad = " ".repeat(indent);
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(pad.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(&items, &mut ser)?;
        String::from_utf8(buf).map_err(|e| Error::Other(format!("non-UTF-8 output: {}", e)))?
    };

    if ascii {
        Ok(escape_non_ascii(&out))
    } else {
        Ok(out)
    }
}

/// Escape every character above 0x7F as a `\uXXXX` sequence (surrogate
/// pairs for astral-plane characters), matching ensure_ascii output.
fn escape_non_ascii(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}
