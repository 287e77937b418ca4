//! One-time project restructuring: rename a source directory, rewrite the
//! import paths that referenced it, strip dead option lines, rename route
//! string literals, and drop a dependency from the package manifest.
//!
//! Sequencing matters in two places only: the backup must precede any
//! mutation, and the directory restructure must precede path rewriting so
//! rewritten imports point at the already-moved directory.

pub mod restructure;
pub mod rewrite;

pub use restructure::{backup, remove_dependency, restructure};
pub use rewrite::{PathRewriter, RouteRename, TextPatcher};

use crate::error::Result;
use crate::log_status;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Directories scanned for candidate source files, relative to root.
const SRC_DIRS: &[&str] = &["src"];

/// Root-level files that commonly carry imports or route names.
const ROOT_FILES: &[&str] = &["App.js", "app.json", "app.config.js", "app.config.ts"];

const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

#[derive(Debug, Clone)]
pub struct RefactorOptions {
    /// Project root; all paths are resolved against it explicitly.
    pub root: PathBuf,
    pub dry_run: bool,
    /// Directory name being renamed under `src/` (e.g. `app`).
    pub from_dir: String,
    /// Its new name (e.g. `core`).
    pub to_dir: String,
    /// Lines containing any of these markers are removed wholesale.
    pub strip_markers: Vec<String>,
    /// Exact quoted-literal renames for route names.
    pub route_renames: Vec<RouteRename>,
    /// Package to remove from the manifest's dependency sections.
    pub remove_dep: Option<String>,
}

impl RefactorOptions {
    pub fn new(root: PathBuf) -> Self {
        RefactorOptions {
            root,
            dry_run: false,
            from_dir: "app".to_string(),
            to_dir: "core".to_string(),
            strip_markers: Vec::new(),
            route_renames: Vec::new(),
            remove_dep: None,
        }
    }
}

/// The full result of a refactor run.
#[derive(Debug, Clone, Serialize)]
pub struct RefactorSummary {
    /// Backup directory created (or that would be created in dry-run).
    pub backup_path: Option<String>,
    /// Whether the directory restructure acted.
    pub restructured: bool,
    /// Files whose content changed, relative to root.
    pub changed_files: Vec<String>,
    pub changed_count: usize,
    /// Whether the manifest was edited; None when no edit was requested.
    pub manifest_changed: Option<bool>,
    pub dry_run: bool,
}

/// Run the whole sequence: backup, restructure, patch files, edit manifest.
pub fn run(opts: &RefactorOptions) -> Result<RefactorSummary> {
    let from_rel = format!("src/{}", opts.from_dir);
    let to_rel = format!("src/{}", opts.to_dir);

    let backup_path = backup(&opts.root, &from_rel, "package.json", opts.dry_run)?;

    let restructured = restructure(&opts.root, &from_rel, &to_rel, opts.dry_run)?;
    if !restructured {
        log_status!("refactor", "Nothing to rename under {} (ok)", from_rel);
    }

    let patcher = TextPatcher::new(
        PathRewriter::new("src", &opts.from_dir, &opts.to_dir),
        opts.strip_markers.clone(),
        opts.route_renames.clone(),
    )?;

    let mut changed_files = Vec::new();
    for path in candidate_files(&opts.root) {
        if process_file(&path, &opts.root, &patcher, opts.dry_run)? {
            let relative = path
                .strip_prefix(&opts.root)
                .unwrap_or(&path)
                .to_string_lossy()
                .to_string();
            changed_files.push(relative);
        }
    }
    log_status!("refactor", "Files changed: {}", changed_files.len());

    let manifest_changed = match &opts.remove_dep {
        Some(package) => Some(remove_dependency(&opts.root, package, opts.dry_run)?),
        None => None,
    };

    Ok(RefactorSummary {
        backup_path: backup_path.map(|p| p.display().to_string()),
        restructured,
        changed_count: changed_files.len(),
        changed_files,
        manifest_changed,
        dry_run: opts.dry_run,
    })
}

/// Collect candidate files: everything with a source extension under the
/// scanned directories, plus the well-known root-level files.
fn candidate_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for base in SRC_DIRS {
        let base_path = root.join(base);
        if base_path.exists() {
            walk_recursive(&base_path, &mut files);
        }
    }
    for name in ROOT_FILES {
        let path = root.join(name);
        if path.is_file() {
            files.push(path);
        }
    }
    files
}

fn walk_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk_recursive(&path, files);
        } else if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if SOURCE_EXTENSIONS.contains(&ext) {
                files.push(path);
            }
        }
    }
}

/// Patch one file, writing back only when the content actually changed.
/// Returns whether the file changed (or would change, in dry-run mode).
///
/// Non-UTF-8 and unreadable files are skipped, not fatal.
fn process_file(path: &Path, root: &Path, patcher: &TextPatcher, dry_run: bool) -> Result<bool> {
    let source = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            log_status!("refactor", "Skipping {} ({})", path.display(), e);
            return Ok(false);
        }
    };

    let patched = patcher.patch(&source);
    if patched == source {
        return Ok(false);
    }

    let relative = path.strip_prefix(root).unwrap_or(path);
    if dry_run {
        log_status!("refactor", "(dry-run) Would change: {}", relative.display());
        return Ok(true);
    }

    crate::utils::io::write_file(path, &patched)?;
    log_status!("refactor", "Changed: {}", relative.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options(root: &Path) -> RefactorOptions {
        RefactorOptions::new(root.to_path_buf())
    }

    #[test]
    fn end_to_end_moves_dir_rewrites_imports_and_backs_up() {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join("src/app");
        fs::create_dir_all(&app).unwrap();
        fs::write(app.join("a.js"), "const util = require(\"./app/util\");\n").unwrap();

        let summary = run(&options(dir.path())).unwrap();

        assert!(summary.restructured);
        assert!(!app.exists());
        let moved = dir.path().join("src/core/a.js");
        assert_eq!(
            fs::read_to_string(&moved).unwrap(),
            "const util = require(\"./core/util\");\n"
        );

        // Backup holds the pre-rename tree
        let backup_dir = PathBuf::from(summary.backup_path.expect("backup should exist"));
        assert_eq!(
            fs::read_to_string(backup_dir.join("src/app/a.js")).unwrap(),
            "const util = require(\"./app/util\");\n"
        );

        assert_eq!(summary.changed_count, 1);
        assert!(summary.changed_files[0].ends_with("a.js"));
    }

    #[test]
    fn run_on_empty_tree_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let summary = run(&options(dir.path())).unwrap();
        assert!(!summary.restructured);
        assert!(summary.backup_path.is_none());
        assert_eq!(summary.changed_count, 0);
        assert!(summary.manifest_changed.is_none());
    }

    #[test]
    fn dry_run_reports_without_mutating() {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join("src/app");
        fs::create_dir_all(&app).unwrap();
        fs::write(app.join("a.js"), "import x from '../app/widgets';\n").unwrap();
        fs::write(
            dir.path().join("package.json"),
            "{\n  \"dependencies\": {\n    \"expo-router\": \"1.0.0\"\n  }\n}\n",
        )
        .unwrap();

        let mut opts = options(dir.path());
        opts.dry_run = true;
        opts.remove_dep = Some("expo-router".to_string());
        let summary = run(&opts).unwrap();

        assert!(summary.restructured);
        assert_eq!(summary.manifest_changed, Some(true));
        // Nothing on disk moved or changed
        assert!(app.join("a.js").exists());
        assert!(!dir.path().join("src/core").exists());
        let raw = fs::read_to_string(dir.path().join("package.json")).unwrap();
        assert!(raw.contains("expo-router"));
        // No backup directory was created
        assert!(fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .all(|e| !e.file_name().to_string_lossy().starts_with(".backup_refactor_")));
    }

    #[test]
    fn unchanged_files_are_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        let untouched = src.join("plain.js");
        fs::write(&untouched, "import React from 'react';\n").unwrap();

        // A write would fail on a read-only file, so Ok proves no write happened
        let mut perms = fs::metadata(&untouched).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&untouched, perms).unwrap();

        let summary = run(&options(dir.path())).unwrap();
        assert_eq!(summary.changed_count, 0);

        let mut perms = fs::metadata(&untouched).unwrap().permissions();
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(&untouched, perms).unwrap();
    }

    #[test]
    fn root_level_app_js_is_patched() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/app")).unwrap();
        fs::write(
            dir.path().join("App.js"),
            "import { db } from './src/app/db';\n",
        )
        .unwrap();

        let summary = run(&options(dir.path())).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("App.js")).unwrap(),
            "import { db } from './src/core/db';\n"
        );
        assert!(summary.changed_files.iter().any(|f| f == "App.js"));
    }

    #[test]
    fn non_utf8_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("binary.js"), [0xFFu8, 0xFE, 0x00, 0x80]).unwrap();
        fs::write(src.join("good.js"), "import x from './app/util';\n").unwrap();
        fs::create_dir_all(dir.path().join("src/app")).unwrap();

        let summary = run(&options(dir.path())).unwrap();
        assert_eq!(summary.changed_count, 1);
        assert!(summary.changed_files[0].ends_with("good.js"));
    }

    #[test]
    fn strip_and_rename_options_flow_through() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(
            src.join("nav.js"),
            "options: {\n  statusBarTranslucent: true,\n}\nnavigate(\"QuestionEditorScreen\");\n",
        )
        .unwrap();

        let mut opts = options(dir.path());
        opts.strip_markers = vec!["statusBarTranslucent".to_string()];
        opts.route_renames = vec![("QuestionEditorScreen".into(), "QuestionEditor".into())];
        let summary = run(&opts).unwrap();

        assert_eq!(summary.changed_count, 1);
        let patched = fs::read_to_string(src.join("nav.js")).unwrap();
        assert!(!patched.contains("statusBarTranslucent"));
        assert!(patched.contains("navigate(\"QuestionEditor\");"));
    }
}
