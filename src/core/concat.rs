//! Concatenate source files into a single text blob, with optional file
//! banners for navigating the result.

use crate::error::{Error, Result};
use crate::log_status;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Directory names skipped at any depth.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "coverage",
    ".next",
    "out",
    ".cache",
    ".turbo",
    ".idea",
    ".vscode",
    "__pycache__",
    ".venv",
    "venv",
    "env",
    ".expo",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatOrder {
    Path,
    Name,
    /// Newest first.
    Mtime,
    /// Biggest first.
    Size,
}

impl ConcatOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConcatOrder::Path => "path",
            ConcatOrder::Name => "name",
            ConcatOrder::Mtime => "mtime",
            ConcatOrder::Size => "size",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConcatOptions {
    pub root: PathBuf,
    pub output: PathBuf,
    /// Extensions with leading dot, e.g. `.js`.
    pub extensions: Vec<String>,
    /// Extra directory names to exclude on top of the defaults.
    pub exclude_dirs: Vec<String>,
    pub recursive: bool,
    pub order: ConcatOrder,
    pub with_header: bool,
    /// Skip files larger than this many megabytes.
    pub max_size_mb: Option<f64>,
}

#[derive(Debug)]
pub struct ConcatSummary {
    pub files_written: usize,
    pub total_size: u64,
    pub output: PathBuf,
}

pub fn human_size(num_bytes: u64) -> String {
    let mut size = num_bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}

/// Scan `root` for files with the given extensions, pruning excluded
/// directory names at every depth.
pub fn collect_files(
    root: &Path,
    recursive: bool,
    excluded: &HashSet<String>,
    extensions: &[String],
) -> Vec<PathBuf> {
    let ext_norm: HashSet<String> = extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .collect();

    let mut files = Vec::new();
    scan_dir(root, recursive, excluded, &ext_norm, &mut files);
    files
}

fn scan_dir(
    dir: &Path,
    recursive: bool,
    excluded: &HashSet<String>,
    ext_norm: &HashSet<String>,
    files: &mut Vec<PathBuf>,
) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let name = entry.file_name().to_string_lossy().to_string();
            if recursive && !excluded.contains(&name) {
                scan_dir(&path, recursive, excluded, ext_norm, files);
            }
        } else if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if ext_norm.contains(&ext.to_lowercase()) {
                files.push(path);
            }
        }
    }
}

fn mtime(path: &Path) -> SystemTime {
    path.metadata()
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

fn size(path: &Path) -> u64 {
    path.metadata().map(|m| m.len()).unwrap_or(0)
}

pub fn sort_files(files: &mut [PathBuf], order: ConcatOrder) {
    match order {
        ConcatOrder::Path => files.sort_by_key(|p| p.to_string_lossy().to_lowercase()),
        ConcatOrder::Name => files.sort_by_key(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default()
        }),
        ConcatOrder::Mtime => {
            files.sort_by_key(|p| mtime(p));
            files.reverse();
        }
        ConcatOrder::Size => {
            files.sort_by_key(|p| size(p));
            files.reverse();
        }
    }
}

/// Read a file tolerantly (invalid UTF-8 replaced) and normalize line
/// endings to LF.
fn read_normalized(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok(text.replace("\r\n", "\n").replace('\r', "\n"))
}

fn banner(opts: &ConcatOptions, files_count: usize, total_size: u64) -> String {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut excluded: Vec<&str> = opts.exclude_dirs.iter().map(|s| s.as_str()).collect();
    excluded.sort_unstable();
    let excluded = if excluded.is_empty() {
        "(defaults only)".to_string()
    } else {
        excluded.join(", ")
    };
    let mut exts: Vec<&str> = opts.extensions.iter().map(|s| s.as_str()).collect();
    exts.sort_unstable();

    [
        "/*".to_string(),
        format!("  Generated by quizkit concat at {}", now),
        format!("  Scanned root: {}", opts.root.display()),
        format!("  Recursive: {}", if opts.recursive { "yes" } else { "no" }),
        format!("  Extensions: {}", exts.join(", ")),
        format!("  Extra excluded folders: {}", excluded),
        format!("  Ordering: {}", opts.order.as_str()),
        format!("  Total files: {}", files_count),
        format!("  Combined size: {}", human_size(total_size)),
        "*/".to_string(),
        String::new(),
    ]
    .join("\n")
}

/// Run the concatenation and write the output file.
pub fn run(opts: &ConcatOptions) -> Result<ConcatSummary> {
    if !opts.root.is_dir() {
        return Err(Error::InputNotFound(format!(
            "Invalid root directory: {}",
            opts.root.display()
        )));
    }

    let mut excluded: HashSet<String> =
        DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect();
    excluded.extend(opts.exclude_dirs.iter().cloned());

    let mut files = collect_files(&opts.root, opts.recursive, &excluded, &opts.extensions);
    sort_files(&mut files, opts.order);

    // Never include the output file itself
    let output_abs = opts.output.canonicalize().ok();
    files.retain(|p| p.canonicalize().ok() != output_abs || output_abs.is_none());

    if let Some(limit_mb) = opts.max_size_mb {
        let limit_bytes = (limit_mb * 1024.0 * 1024.0) as u64;
        files.retain(|p| size(p) <= limit_bytes);
    }

    let total_size: u64 = files.iter().map(|p| size(p)).sum();

    let mut out = String::new();
    if opts.with_header {
        out.push_str(&banner(opts, files.len(), total_size));
    }

    let mut written = 0;
    for (i, path) in files.iter().enumerate() {
        let content = match read_normalized(path) {
            Ok(c) => c,
            Err(e) => {
                log_status!("concat", "Skipping {} ({})", path.display(), e);
                continue;
            }
        };

        if opts.with_header {
            let rel = path.strip_prefix(&opts.root).unwrap_or(path);
            out.push_str(&format!(
                "\n/* ===== File #{}: {} ===== */\n\n",
                i + 1,
                rel.display()
            ));
        }
        out.push_str(&content);
        if opts.with_header {
            out.push_str("\n\n/* ===== End of file ===== */\n");
        }
        written += 1;
    }

    if let Some(parent) = opts.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    crate::utils::io::write_file(&opts.output, &out)?;

    Ok(ConcatSummary {
        files_written: written,
        total_size,
        output: opts.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options(root: &Path, output: PathBuf) -> ConcatOptions {
        ConcatOptions {
            root: root.to_path_buf(),
            output,
            extensions: vec![".js".to_string()],
            exclude_dirs: Vec::new(),
            recursive: true,
            order: ConcatOrder::Path,
            with_header: true,
            max_size_mb: None,
        }
    }

    #[test]
    fn human_size_picks_sensible_units() {
        assert_eq!(human_size(512), "512.0 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn collect_respects_extension_filter_and_exclusions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.js"), "let a;").unwrap();
        fs::write(dir.path().join("b.ts"), "let b;").unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/dep.js"), "let d;").unwrap();

        let excluded: HashSet<String> =
            DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect();
        let files = collect_files(dir.path(), true, &excluded, &[".js".to_string()]);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.js"));
    }

    #[test]
    fn run_concatenates_in_path_order_with_banners() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.js"), "first\r\n").unwrap();
        fs::write(dir.path().join("b.js"), "second\n").unwrap();

        let output = dir.path().join("all.txt");
        let summary = run(&options(dir.path(), output.clone())).unwrap();
        assert_eq!(summary.files_written, 2);

        let blob = fs::read_to_string(&output).unwrap();
        assert!(blob.starts_with("/*"));
        assert!(blob.contains("File #1: a.js"));
        assert!(blob.contains("File #2: b.js"));
        // CRLF normalized
        assert!(!blob.contains('\r'));
        assert!(blob.find("first").unwrap() < blob.find("second").unwrap());
    }

    #[test]
    fn run_without_header_emits_raw_contents_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.js"), "only\n").unwrap();

        let output = dir.path().join("all.txt");
        let mut opts = options(dir.path(), output.clone());
        opts.with_header = false;
        run(&opts).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "only\n");
    }

    #[test]
    fn run_excludes_the_output_file_itself() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.js"), "a\n").unwrap();

        let output = dir.path().join("all.js");
        let mut opts = options(dir.path(), output.clone());
        opts.with_header = false;

        // First run creates all.js inside root; second run must not ingest it
        run(&opts).unwrap();
        let summary = run(&opts).unwrap();
        assert_eq!(summary.files_written, 1);
        assert_eq!(fs::read_to_string(&output).unwrap(), "a\n");
    }

    #[test]
    fn run_skips_files_over_max_size() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("small.js"), "s\n").unwrap();
        fs::write(dir.path().join("big.js"), "x".repeat(2 * 1024 * 1024)).unwrap();

        let output = dir.path().join("all.txt");
        let mut opts = options(dir.path(), output);
        opts.max_size_mb = Some(1.0);
        let summary = run(&opts).unwrap();
        assert_eq!(summary.files_written, 1);
    }

    #[test]
    fn run_fails_for_missing_root() {
        let dir = TempDir::new().unwrap();
        let mut opts = options(dir.path(), dir.path().join("out.txt"));
        opts.root = dir.path().join("missing");
        let err = run(&opts).unwrap_err();
        assert_eq!(err.code(), "INPUT_NOT_FOUND");
    }

    #[test]
    fn no_recursion_stays_at_top_level() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("top.js"), "t\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/deep.js"), "d\n").unwrap();

        let output = dir.path().join("all.txt");
        let mut opts = options(dir.path(), output);
        opts.recursive = false;
        let summary = run(&opts).unwrap();
        assert_eq!(summary.files_written, 1);
    }
}
