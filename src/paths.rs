use anyhow::{Context, Result};
use directories::BaseDirs;
use std::path::PathBuf;

/// File stem of the active storage slot
pub const STORAGE_SLOT: &str = "storage";
/// File stem of the active archive slot
pub const ARCHIVE_SLOT: &str = "archive";

/// All computed paths used by tbm
#[derive(Debug, Clone)]
pub struct Paths {
    /// ~/.taskbook
    pub root: PathBuf,
    /// ~/.taskbook/tbm.profile
    pub pointer_file: PathBuf,
    /// ~/.taskbook/tbm.lock
    pub lock_file: PathBuf,
    /// ~/.taskbook/tbm.switch
    pub journal_file: PathBuf,
    /// ~/.taskbook/storage
    pub storage_dir: PathBuf,
    /// ~/.taskbook/archive
    pub archive_dir: PathBuf,
}

impl Paths {
    /// Resolve the layout under `~/.taskbook`
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
        Ok(Self::with_root(base_dirs.home_dir().join(".taskbook")))
    }

    /// Use `root` when given (from `--root` / `TBM_ROOT`), the home layout otherwise
    pub fn resolve(root: Option<PathBuf>) -> Result<Self> {
        match root {
            Some(root) => Ok(Self::with_root(root)),
            None => Self::new(),
        }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            pointer_file: root.join("tbm.profile"),
            lock_file: root.join("tbm.lock"),
            journal_file: root.join("tbm.switch"),
            storage_dir: root.join("storage"),
            archive_dir: root.join("archive"),
            root,
        }
    }

    /// `storage/<name>.json`
    pub fn storage_file(&self, name: &str) -> PathBuf {
        self.storage_dir.join(json_file_name(name))
    }

    /// `archive/<name>.json`
    pub fn archive_file(&self, name: &str) -> PathBuf {
        self.archive_dir.join(json_file_name(name))
    }

    /// `storage/storage.json`, the file taskbook reads directly
    pub fn active_storage(&self) -> PathBuf {
        self.storage_file(STORAGE_SLOT)
    }

    /// `archive/archive.json`
    pub fn active_archive(&self) -> PathBuf {
        self.archive_file(ARCHIVE_SLOT)
    }
}

fn json_file_name(name: &str) -> String {
    format!("{}.json", name)
}
