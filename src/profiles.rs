//! Profile creation and listing.
//!
//! A profile that is not active is nothing more than `<name>.json` in the
//! storage directory (and optionally in the archive directory). This module
//! creates new empty profiles and lists what the storage directory holds.

use crate::error::Result;
use crate::fs_utils::{entry_names, write_file};
use crate::lock::RootLock;
use crate::paths::{ARCHIVE_SLOT, Paths, STORAGE_SLOT};
use crate::ui::Ui;

/// Content written for a freshly created profile
const EMPTY_PROFILE: &str = "{}";

/// Prefix of auto-generated profile names (`new0`, `new1`, ...)
const AUTO_NAME_PREFIX: &str = "new";

/// Arguments to `new` that ask for a generated name
const AUTO_NAME_TOKENS: [&str; 4] = [" ", "-", STORAGE_SLOT, ARCHIVE_SLOT];

/// Whether `name` collides with the active-slot file names
pub fn is_reserved(name: &str) -> bool {
    name == STORAGE_SLOT || name == ARCHIVE_SLOT
}

/// Whether `requested` should be replaced by a generated name
pub fn wants_auto_name(requested: &str) -> bool {
    requested.is_empty() || AUTO_NAME_TOKENS.contains(&requested)
}

/// First `new<seq>` not present in either the storage or the archive directory
pub fn next_auto_name(paths: &Paths) -> String {
    let mut seq: u64 = 0;
    loop {
        let name = format!("{}{}", AUTO_NAME_PREFIX, seq);
        if !paths.storage_file(&name).exists() && !paths.archive_file(&name).exists() {
            return name;
        }
        seq += 1;
    }
}

/// Create a new empty profile, returning the name actually used
///
/// Existing files of the same name are overwritten.
pub fn create_profile(paths: &Paths, requested: &str, ui: &Ui) -> Result<String> {
    let _lock = RootLock::acquire(paths)?;

    let name = if wants_auto_name(requested) {
        let generated = next_auto_name(paths);
        ui.debug(format!("no usable name given, generated '{}'", generated));
        generated
    } else {
        requested.to_string()
    };

    for path in [paths.storage_file(&name), paths.archive_file(&name)] {
        ui.debug(format!("writing {}", path.display()));
        write_file(&path, EMPTY_PROFILE)?;
    }

    Ok(name)
}

/// Everything in the storage directory, including `storage.json`
pub fn list_profiles(paths: &Paths) -> Result<Vec<String>> {
    entry_names(&paths.storage_dir)
}
