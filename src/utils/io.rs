//! File I/O primitives with consistent error handling.

use crate::error::Result;
use std::fs;
use std::path::Path;

/// Read file contents as UTF-8.
pub fn read_file(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

/// Write content to file.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    Ok(fs::write(path, content)?)
}

/// Write content to file atomically (write to .tmp, then rename).
///
/// Prevents data loss if the process crashes mid-write. The rename is
/// atomic on POSIX filesystems, so readers always see either the old
/// content or the new content — never a partial write.
pub fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        crate::error::Error::InvalidArgument(format!("Invalid path: {}", path.display()))
    })?;

    let filename = path.file_name().ok_or_else(|| {
        crate::error::Error::InvalidArgument(format!("Invalid path: {}", path.display()))
    })?;

    let tmp_path = parent.join(format!("{}.tmp", filename.to_string_lossy()));

    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Expand a leading tilde in a user-supplied path.
pub fn expand_path(raw: &str) -> std::path::PathBuf {
    std::path::PathBuf::from(shellexpand::tilde(raw).into_owned())
}
