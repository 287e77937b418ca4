//! Filesystem side of the restructuring: backup, directory rename/merge,
//! and package manifest editing.

use crate::error::Result;
use crate::log_status;
use std::fs;
use std::path::{Path, PathBuf};

/// Rename `root/from_rel` to `root/to_rel`, merging into the destination
/// when it already exists. Returns whether any action was taken (or would
/// be taken, in dry-run mode).
pub fn restructure(root: &Path, from_rel: &str, to_rel: &str, dry_run: bool) -> Result<bool> {
    let source = root.join(from_rel);
    let dest = root.join(to_rel);

    if !source.exists() {
        log_status!("refactor", "No {} directory found (ok)", from_rel);
        return Ok(false);
    }

    if dest.exists() {
        log_status!(
            "refactor",
            "{} already exists, merging contents of {} into it",
            to_rel,
            from_rel
        );
        if !dry_run {
            for entry in fs::read_dir(&source)?.flatten() {
                let target = dest.join(entry.file_name());
                fs::rename(entry.path(), target)?;
            }
            remove_dir_if_empty(&source);
        }
        return Ok(true);
    }

    if dry_run {
        log_status!("refactor", "(dry-run) Would rename {} -> {}", from_rel, to_rel);
        return Ok(true);
    }

    fs::rename(&source, &dest)?;
    log_status!("refactor", "Renamed: {} -> {}", from_rel, to_rel);
    Ok(true)
}

/// Remove a directory expected to be empty after a merge. A failure
/// (e.g. a residual hidden entry) leaves the directory in place rather
/// than aborting the run.
pub(crate) fn remove_dir_if_empty(dir: &Path) {
    if let Err(e) = fs::remove_dir(dir) {
        log_status!(
            "refactor",
            "Left {} in place (not empty: {})",
            dir.display(),
            e
        );
    }
}

/// Copy the critical paths (the source directory being renamed and the
/// package manifest, whichever exist) into a fresh timestamped backup
/// directory under root. Returns the backup path, or None when there was
/// nothing to back up.
///
/// Backup failure is fatal: later steps mutate the tree destructively and
/// must not run without a completed backup.
pub fn backup(
    root: &Path,
    source_rel: &str,
    manifest_name: &str,
    dry_run: bool,
) -> Result<Option<PathBuf>> {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let backup_dir = root.join(format!(".backup_refactor_{}", timestamp));

    let mut to_copy: Vec<(String, PathBuf)> = Vec::new();
    let source = root.join(source_rel);
    if source.exists() {
        to_copy.push((source_rel.to_string(), source));
    }
    let manifest = root.join(manifest_name);
    if manifest.exists() {
        to_copy.push((manifest_name.to_string(), manifest));
    }

    if to_copy.is_empty() {
        log_status!("refactor", "Nothing critical to back up (ok)");
        return Ok(None);
    }

    if dry_run {
        log_status!("refactor", "(dry-run) Would create backup at {}", backup_dir.display());
        for (rel, _) in &to_copy {
            log_status!("refactor", "(dry-run)  - would copy {}", rel);
        }
        return Ok(Some(backup_dir));
    }

    fs::create_dir_all(&backup_dir)?;
    for (rel, path) in &to_copy {
        let dest = backup_dir.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        if path.is_dir() {
            copy_dir_recursive(path, &dest)?;
        } else {
            fs::copy(path, &dest)?;
        }
    }

    log_status!("refactor", "Backup created at {}", backup_dir.display());
    Ok(Some(backup_dir))
}

/// Recursive directory copy. Fails loudly if `dest` already exists: the
/// backup root is freshly timestamped, so a collision means something is
/// wrong and continuing would risk overwriting an earlier backup.
fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir(dest)?;
    for entry in fs::read_dir(src)?.flatten() {
        let target = dest.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Remove `package` from the dependencies and devDependencies sections of
/// `root/package.json`. Returns whether a change was made (or would be
/// made, in dry-run mode).
///
/// A missing manifest and a manifest that fails to parse are both
/// recoverable: the run continues without manifest edits.
pub fn remove_dependency(root: &Path, package: &str, dry_run: bool) -> Result<bool> {
    let manifest = root.join("package.json");
    if !manifest.exists() {
        log_status!("refactor", "package.json not found (ok)");
        return Ok(false);
    }

    let raw = crate::utils::io::read_file(&manifest)?;
    let mut data: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            log_status!("refactor", "Failed to parse package.json: {}", e);
            return Ok(false);
        }
    };

    let mut changed = false;
    for section in ["dependencies", "devDependencies"] {
        if let Some(deps) = data.get_mut(section).and_then(|v| v.as_object_mut()) {
            if deps.contains_key(package) {
                log_status!("refactor", "Removing {} from {}...", package, section);
                if !dry_run {
                    // shift_remove keeps the remaining keys in order
                    deps.shift_remove(package);
                }
                changed = true;
            }
        }
    }

    if changed && !dry_run {
        let output = format!("{}\n", serde_json::to_string_pretty(&data)?);
        crate::utils::io::write_file_atomic(&manifest, &output)?;
        log_status!("refactor", "package.json updated ({} removed)", package);
    } else if changed {
        log_status!("refactor", "(dry-run) Would update package.json (remove {})", package);
    } else {
        log_status!("refactor", "{} is not listed in package.json (ok)", package);
    }

    Ok(changed)
}
