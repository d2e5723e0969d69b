//! The active-profile pointer (`tbm.profile`).
//!
//! A single line naming the profile whose data currently sits in
//! `storage.json` / `archive.json`.

use std::fs;
use std::io;

use crate::error::{Result, TbmError};
use crate::fs_utils::write_file_atomic;
use crate::lock::RootLock;
use crate::paths::Paths;
use crate::ui::Ui;

/// Name used when the pointer is missing or empty
pub const DEFAULT_PROFILE: &str = "default";

/// Read the pointer without creating or repairing it
///
/// Returns `None` when the file does not exist. One trailing line terminator
/// (as added by editors) is dropped; everything else is kept verbatim, since
/// the name is used as a file stem.
pub fn read_pointer(paths: &Paths) -> Result<Option<String>> {
    match fs::read_to_string(&paths.pointer_file) {
        Ok(content) => Ok(Some(strip_line_terminator(&content).to_string())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(TbmError::read(&paths.pointer_file, e)),
    }
}

fn strip_line_terminator(content: &str) -> &str {
    content
        .strip_suffix("\r\n")
        .or_else(|| content.strip_suffix('\n'))
        .unwrap_or(content)
}

/// Overwrite the pointer with `name` verbatim
pub fn write_pointer(paths: &Paths, name: &str) -> Result<()> {
    write_file_atomic(&paths.pointer_file, name)
}

/// Name of the currently active profile
///
/// A missing pointer is created holding `default`; an empty one is reset to
/// `default` with a warning.
pub fn current_profile_name(paths: &Paths, ui: &Ui) -> Result<String> {
    match read_pointer(paths)? {
        Some(name) if !name.is_empty() => Ok(name),
        Some(_) => {
            ui.warn("Taskbook profile name cannot be empty, resetting to 'default'.");
            write_pointer(paths, DEFAULT_PROFILE)?;
            Ok(DEFAULT_PROFILE.to_string())
        }
        None => {
            ui.debug(format!(
                "creating {} with '{}'",
                paths.pointer_file.display(),
                DEFAULT_PROFILE
            ));
            write_pointer(paths, DEFAULT_PROFILE)?;
            Ok(DEFAULT_PROFILE.to_string())
        }
    }
}

/// Relabel the active profile without moving any data file
pub fn rename_current(paths: &Paths, new_name: &str, ui: &Ui) -> Result<()> {
    let _lock = RootLock::acquire(paths)?;
    ui.debug(format!(
        "writing '{}' to {}",
        new_name,
        paths.pointer_file.display()
    ));
    write_pointer(paths, new_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{setup_test_paths, test_ui};
    use tempfile::TempDir;

    #[test]
    fn test_missing_pointer_is_created_as_default() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);

        let name = current_profile_name(&paths, &test_ui()).unwrap();
        assert_eq!(name, "default");
        assert_eq!(fs::read_to_string(&paths.pointer_file).unwrap(), "default");
    }

    #[test]
    fn test_empty_pointer_is_reset() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        fs::write(&paths.pointer_file, "").unwrap();

        let name = current_profile_name(&paths, &test_ui()).unwrap();
        assert_eq!(name, "default");
        assert_eq!(fs::read_to_string(&paths.pointer_file).unwrap(), "default");
    }

    #[test]
    fn test_trailing_newline_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        fs::write(&paths.pointer_file, "work\n").unwrap();

        assert_eq!(current_profile_name(&paths, &test_ui()).unwrap(), "work");
        // Reading never rewrites a valid pointer
        assert_eq!(fs::read_to_string(&paths.pointer_file).unwrap(), "work\n");
    }

    #[test]
    fn test_only_one_line_terminator_is_stripped() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);

        fs::write(&paths.pointer_file, "work\r\n").unwrap();
        assert_eq!(read_pointer(&paths).unwrap().as_deref(), Some("work"));

        fs::write(&paths.pointer_file, " work \n").unwrap();
        assert_eq!(read_pointer(&paths).unwrap().as_deref(), Some(" work "));

        fs::write(&paths.pointer_file, "work\n\n").unwrap();
        assert_eq!(read_pointer(&paths).unwrap().as_deref(), Some("work\n"));
    }

    #[test]
    fn test_read_pointer_does_not_create() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);

        assert_eq!(read_pointer(&paths).unwrap(), None);
        assert!(!paths.pointer_file.exists());
    }

    #[test]
    fn test_rename_current_writes_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        fs::write(&paths.pointer_file, "default").unwrap();
        fs::write(paths.active_storage(), r#"{"a":1}"#).unwrap();

        rename_current(&paths, "personal", &test_ui()).unwrap();

        assert_eq!(fs::read_to_string(&paths.pointer_file).unwrap(), "personal");
        // Data files are untouched
        assert_eq!(
            fs::read_to_string(paths.active_storage()).unwrap(),
            r#"{"a":1}"#
        );
        assert!(!paths.storage_file("personal").exists());
    }

    #[test]
    fn test_rename_current_refused_while_locked() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        fs::write(&paths.pointer_file, "default").unwrap();

        let _held = RootLock::acquire(&paths).unwrap();
        let err = rename_current(&paths, "other", &test_ui()).unwrap_err();
        assert!(matches!(err, TbmError::Locked { .. }));
        assert_eq!(fs::read_to_string(&paths.pointer_file).unwrap(), "default");
    }
}
