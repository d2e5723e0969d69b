//! Filesystem utility functions
//!
//! Thin wrappers around `std::fs` that map failures onto [`TbmError`] with the
//! offending path attached.

use std::fs;
use std::path::Path;

use crate::error::{Result, TbmError};

/// Fail with `PathNotFound` unless `path` exists
pub fn require_path(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(TbmError::PathNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Create or truncate `path` and write `data` to it
pub fn write_file(path: &Path, data: &str) -> Result<()> {
    fs::write(path, data).map_err(|e| TbmError::write(path, e))
}

/// Write `data` next to `path` first, then rename it into place
///
/// A crash never leaves `path` half-written.
pub fn write_file_atomic(path: &Path, data: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!("{}.tmp", file_name));

    write_file(&temp_path, data)?;
    rename_file(&temp_path, path)
}

/// Rename `from` to `to`, replacing `to` if it exists
pub fn rename_file(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|e| TbmError::RenameFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        cause: e,
    })
}

/// Names of all entries directly inside `dir`, sorted
pub fn entry_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| TbmError::read(dir, e))? {
        let entry = entry.map_err(|e| TbmError::read(dir, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
