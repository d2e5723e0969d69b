//! High-level command orchestration for the CLI.
//!
//! This module contains the handler functions for each CLI command (`switch`,
//! `new`, `rename`, ...). It is the coordination layer between:
//! - `crate::ui` for output.
//! - `crate::switch`, `crate::profiles` and `crate::pointer` for the
//!   switchboard operations themselves.
//! - `crate::doctor` and `crate::journal` for diagnostics.
//!
//! Each function here corresponds to a subcommand in `main.rs`.

use anstyle::AnsiColor;
use anyhow::{Context, Result, bail};
use std::path::Path;

use crate::doctor::run_doctor;
use crate::journal::SwitchJournal;
use crate::lock::RootLock;
use crate::paths::{Paths, STORAGE_SLOT};
use crate::pointer::{current_profile_name, read_pointer, rename_current};
use crate::profiles::{create_profile, list_profiles};
use crate::switch::{SlotStatus, activate};
use crate::ui::Ui;

/// Sentinel file that turns on the configuration dump
pub const DEBUG_SENTINEL: &str = "DEBUG";

/// The command being run, as shown in the debug dump
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub command: &'a str,
    pub argument: Option<&'a str>,
}

/// Switch to a profile
pub fn switch(paths: &Paths, name: &str, ui: &Ui) -> Result<()> {
    let spinner = ui.spinner(format!("Switching to profile '{}'...", name));

    match activate(paths, name, ui) {
        Ok(outcome) => {
            ui.spinner_finish_ok(
                &spinner,
                format!("Active profile: {} (parked '{}')", outcome.to, outcome.from),
            );
            Ok(())
        }
        Err(e) => {
            ui.spinner_finish_err(&spinner, format!("Failed to switch to '{}'", name));
            Err(e.into())
        }
    }
}

/// Relabel the active profile
pub fn rename(paths: &Paths, new_name: &str, ui: &Ui) -> Result<()> {
    let old = read_pointer(paths)?.filter(|name| !name.is_empty());
    rename_current(paths, new_name, ui)?;

    match old {
        Some(old) => ui.ok(format!("Renamed current profile '{}' to '{}'", old, new_name)),
        None => ui.ok(format!("Current profile is now called '{}'", new_name)),
    }
    Ok(())
}

/// Create a new, empty profile
pub fn new(paths: &Paths, name: &str, ui: &Ui) -> Result<()> {
    let created = create_profile(paths, name, ui)?;

    ui.ok(format!("Created profile '{}'", created));
    ui.newline();
    ui.println("To activate it:");
    ui.println(format!("  {} switch {}", ui.bold("tbm"), created));
    Ok(())
}

/// Show the current profile
pub fn profile(paths: &Paths, ui: &Ui) -> Result<()> {
    let name = current_profile_name(paths, ui)?;
    ui.println(format!("Current profile: {}", name));
    Ok(())
}

/// List everything in the storage directory
pub fn all_profiles(paths: &Paths, ui: &Ui) -> Result<()> {
    let entries = list_profiles(paths)
        .with_context(|| format!("Failed to list {}", paths.storage_dir.display()))?;

    if entries.is_empty() {
        ui.warn("No profiles found.");
        ui.newline();
        ui.println("Create one with:");
        ui.println(format!("  {} new <name>", ui.bold("tbm")));
        return Ok(());
    }

    let active = read_pointer(paths)?.filter(|name| !name.is_empty());
    let active_file = format!("{}.json", STORAGE_SLOT);

    let mut table = ui.simple_table();
    for entry in &entries {
        let is_active = *entry == active_file;
        let icon = if is_active { ui.icon_ok() } else { "-" };
        let status = if is_active {
            let label = match &active {
                Some(name) => format!("active ({})", name),
                None => String::from("active"),
            };
            ui.colored_cell(label, AnsiColor::Green)
        } else {
            ui.cell("")
        };
        table.add_row(vec![ui.cell(icon), ui.cell(entry), status]);
    }

    ui.section("Available profiles:");
    ui.println(table.to_string());
    Ok(())
}

/// Run diagnostics, optionally removing a stale switch journal
pub fn doctor(paths: &Paths, clear_journal: bool, ui: &Ui) -> Result<()> {
    if clear_journal {
        let _lock = RootLock::acquire(paths)?;
        if SwitchJournal::clear(paths)? {
            ui.ok(format!("Removed {}", paths.journal_file.display()));
        } else {
            ui.info("No switch journal to remove.");
        }
        ui.newline();
    }

    if !run_doctor(paths, ui) {
        bail!("Doctor found problems with {}", paths.root.display());
    }
    Ok(())
}

/// Whether `dir` contains the debug sentinel file
pub fn debug_sentinel_present(dir: &Path) -> bool {
    dir.join(DEBUG_SENTINEL).exists()
}

/// Print the resolved configuration
///
/// Reads the pointer without creating it, so the dump has no side effects.
pub fn debug_dump(paths: &Paths, invocation: Invocation<'_>, ui: &Ui) -> Result<()> {
    let status = SlotStatus::detect(paths);
    let profile = read_pointer(paths)?.unwrap_or_else(|| String::from("(unset)"));

    let rows = [
        ("TaskbookRoot", paths.root.display().to_string()),
        ("PointerFile", paths.pointer_file.display().to_string()),
        ("Profile", profile),
        ("Storage", paths.storage_dir.display().to_string()),
        ("StorageActive", status.active_storage.to_string()),
        ("Archive", paths.archive_dir.display().to_string()),
        ("ArchiveActive", status.active_archive.to_string()),
        ("Command", invocation.command.to_string()),
        (
            "Argument",
            invocation.argument.unwrap_or("-").to_string(),
        ),
    ];

    let mut table = ui.table();
    table.set_header(vec![ui.header_cell("Key"), ui.header_cell("Value")]);
    for (key, value) in rows {
        table.add_row(vec![ui.cell(key), ui.cell(value)]);
    }

    ui.newline();
    ui.section("Config-Dump:");
    ui.println(table.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{seed_profiles, setup_test_paths, storage_bytes, test_ui};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_switch_command() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        seed_profiles(&paths, "home", &["work"]);

        switch(&paths, "work", &test_ui()).unwrap();
        assert_eq!(fs::read_to_string(&paths.pointer_file).unwrap(), "work");
    }

    #[test]
    fn test_switch_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        seed_profiles(&paths, "home", &[]);

        let err = switch(&paths, "ghost", &test_ui()).unwrap_err();
        assert!(err.to_string().contains("ghost"));
        assert_eq!(
            fs::read_to_string(paths.active_storage()).unwrap(),
            storage_bytes("home")
        );
    }

    #[test]
    fn test_new_then_list() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let ui = test_ui();
        seed_profiles(&paths, "home", &[]);

        new(&paths, "-", &ui).unwrap();
        assert!(paths.storage_file("new0").exists());
        assert!(all_profiles(&paths, &ui).is_ok());
    }

    #[test]
    fn test_list_empty() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        assert!(all_profiles(&paths, &test_ui()).is_ok());
    }

    #[test]
    fn test_profile_creates_default_pointer() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);

        profile(&paths, &test_ui()).unwrap();
        assert_eq!(fs::read_to_string(&paths.pointer_file).unwrap(), "default");
    }

    #[test]
    fn test_rename_command() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        seed_profiles(&paths, "default", &[]);

        rename(&paths, "personal", &test_ui()).unwrap();
        assert_eq!(fs::read_to_string(&paths.pointer_file).unwrap(), "personal");
    }

    #[test]
    fn test_doctor_clear_journal() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        seed_profiles(&paths, "home", &["work"]);
        SwitchJournal::begin(&paths, "home", "work").unwrap();
        let ui = test_ui();

        assert!(doctor(&paths, false, &ui).is_err());
        doctor(&paths, true, &ui).unwrap();
        assert!(!paths.journal_file.exists());
    }

    #[test]
    fn test_debug_sentinel() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!debug_sentinel_present(temp_dir.path()));
        fs::write(temp_dir.path().join(DEBUG_SENTINEL), "").unwrap();
        assert!(debug_sentinel_present(temp_dir.path()));
    }

    #[test]
    fn test_debug_dump_has_no_side_effects() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let invocation = Invocation {
            command: "profile",
            argument: None,
        };

        debug_dump(&paths, invocation, &test_ui()).unwrap();
        assert!(!paths.pointer_file.exists());
    }
}
