//! Test utilities shared across test modules

use std::fs;

use crate::paths::Paths;
use crate::ui::{ColorMode, Ui};
use tempfile::TempDir;

/// Create a Paths struct for testing using a temporary directory
///
/// Mirrors a fresh `~/.taskbook` with empty `storage/` and `archive/`
/// directories and no pointer file.
pub fn setup_test_paths(temp_dir: &TempDir) -> Paths {
    let paths = Paths::with_root(temp_dir.path().join(".taskbook"));
    fs::create_dir_all(&paths.storage_dir).unwrap();
    fs::create_dir_all(&paths.archive_dir).unwrap();
    paths
}

/// A layout where profile `active` is live and each of `parked` is stored under its own name
///
/// Each profile's storage file holds `{"profile":"<name>"}` and its archive
/// file `{"archive":"<name>"}`.
pub fn seed_profiles(paths: &Paths, active: &str, parked: &[&str]) {
    fs::write(&paths.pointer_file, active).unwrap();
    fs::write(paths.active_storage(), storage_bytes(active)).unwrap();
    fs::write(paths.active_archive(), archive_bytes(active)).unwrap();
    for name in parked {
        fs::write(paths.storage_file(name), storage_bytes(name)).unwrap();
        fs::write(paths.archive_file(name), archive_bytes(name)).unwrap();
    }
}

pub fn storage_bytes(name: &str) -> String {
    format!(r#"{{"profile":"{}"}}"#, name)
}

pub fn archive_bytes(name: &str) -> String {
    format!(r#"{{"archive":"{}"}}"#, name)
}

pub fn test_ui() -> Ui {
    Ui::new(ColorMode::Never, false)
}
