use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, TbmError};
use crate::fs_utils::require_path;
use crate::paths::Paths;

/// Exclusive advisory lock on the taskbook root
///
/// Held for the whole of a mutating operation. The lock is released when the
/// guard is dropped, which covers early returns through `?`.
pub struct RootLock {
    file: File,
    path: PathBuf,
}

impl RootLock {
    /// Lock `<root>/tbm.lock`, failing with `Locked` instead of waiting
    pub fn acquire(paths: &Paths) -> Result<Self> {
        require_path(&paths.root)?;
        Self::acquire_at(&paths.lock_file)
    }

    fn acquire_at(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| TbmError::write(path, e))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                file,
                path: path.to_path_buf(),
            }),
            Err(e) if is_contended(&e) => Err(TbmError::Locked {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(TbmError::write(path, e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Drop for RootLock {
    fn drop(&mut self) {
        // Release the lock (ignore errors during drop)
        let _ = self.file.unlock();
    }
}
