//! Diagnostic tool for tbm.
//!
//! This module implements the `tbm doctor` command, which inspects the
//! taskbook layout without modifying it:
//! - Existence of the root, storage and archive directories.
//! - The active slot (`storage.json` / `archive.json`).
//! - The pointer file and whether the data files agree with it.
//! - Leftovers of an interrupted switch.
//!
//! Archive problems are reported as warnings, storage problems as failures.

use std::path::Path;

use anstyle::AnsiColor;

use crate::journal::SwitchJournal;
use crate::paths::{Paths, STORAGE_SLOT};
use crate::pointer::read_pointer;
use crate::profiles::{is_reserved, list_profiles};
use crate::switch::SlotStatus;
use crate::ui::Ui;

/// Run the doctor diagnostics; returns whether every check passed
pub fn run_doctor(paths: &Paths, ui: &Ui) -> bool {
    ui.section("tbm Doctor");
    ui.newline();

    let status = SlotStatus::detect(paths);
    let mut healthy = true;

    healthy &= check_step(ui, "Directories", || {
        let mut ok = true;
        ok &= report_path(ui, "Taskbook root", paths.root.is_dir(), paths, &paths.root, true);
        ok &= report_path(ui, "Storage directory", status.storage_dir, paths, &paths.storage_dir, true);
        report_path(ui, "Archive directory", status.archive_dir, paths, &paths.archive_dir, false);
        ok
    });

    healthy &= check_step(ui, "Active Slot", || {
        let ok = report_path(
            ui,
            "Active storage",
            status.active_storage,
            paths,
            &paths.active_storage(),
            true,
        );
        report_path(
            ui,
            "Active archive",
            status.active_archive,
            paths,
            &paths.active_archive(),
            false,
        );
        ok
    });

    healthy &= check_step(ui, "Pointer", || check_pointer(paths, ui));
    healthy &= check_step(ui, "Switch Journal", || check_journal(paths, ui));
    healthy &= check_step(ui, "Profiles", || check_profiles(paths, ui));

    healthy
}

fn report_path(
    ui: &Ui,
    label: &str,
    exists: bool,
    paths: &Paths,
    path: &std::path::Path,
    required: bool,
) -> bool {
    let shown = path.strip_prefix(&paths.root).unwrap_or(path);
    if exists {
        ui.println(format!("  {} {} exists: {}", ui.icon_ok(), label, shown.display()));
        true
    } else if required {
        ui.println(format!("  {} {} missing: {}", ui.icon_err(), label, path.display()));
        false
    } else {
        ui.println(format!("  {} {} missing: {}", ui.icon_warn(), label, path.display()));
        true
    }
}

fn check_pointer(paths: &Paths, ui: &Ui) -> bool {
    let name = match read_pointer(paths) {
        Ok(Some(name)) if name.is_empty() => {
            ui.println(format!(
                "  {} Pointer file is empty (will be reset to 'default')",
                ui.icon_warn()
            ));
            return true;
        }
        Ok(Some(name)) => name,
        Ok(None) => {
            ui.println(format!(
                "  {} Pointer file missing (will be created as 'default')",
                ui.icon_warn()
            ));
            return true;
        }
        Err(e) => {
            ui.println(format!("  {} {}", ui.icon_err(), e));
            return false;
        }
    };

    ui.println(format!("  {} Active profile: {}", ui.icon_info(), name));
    if is_reserved(&name) {
        ui.println(format!(
            "  {} '{}' is an active-slot name; relabel it with 'tbm rename <name>'",
            ui.icon_err(),
            name
        ));
        return false;
    }

    // While a profile is active its own <name>.json must not exist
    let mut ok = true;
    let parked_storage = paths.storage_file(&name);
    if parked_storage.exists() {
        report_occupied(ui, &parked_storage, &name);
        ok = false;
    }
    // archive/<name>.json only blocks a switch when there is an archive.json to park
    let parked_archive = paths.archive_file(&name);
    if parked_archive.exists() {
        if paths.active_archive().exists() {
            report_occupied(ui, &parked_archive, &name);
            ok = false;
        } else {
            ui.println(format!(
                "  {} {} exists although '{}' is active",
                ui.icon_warn(),
                parked_archive.display(),
                name
            ));
        }
    }
    if ok {
        ui.println(format!("  {} Data files agree with the pointer", ui.icon_ok()));
    }
    ok
}

fn report_occupied(ui: &Ui, parked: &Path, name: &str) {
    ui.println(format!(
        "  {} {} exists although '{}' is active; switching away would be refused",
        ui.icon_err(),
        parked.display(),
        name
    ));
}

fn check_journal(paths: &Paths, ui: &Ui) -> bool {
    match SwitchJournal::load(paths) {
        Ok(None) => {
            ui.println(format!("  {} No interrupted switch", ui.icon_ok()));
            true
        }
        Ok(Some(journal)) => {
            ui.println(format!(
                "  {} Switch from '{}' to '{}' started {} did not finish",
                ui.icon_err(),
                journal.from,
                journal.to,
                journal.started_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
            if journal.completed.is_empty() {
                ui.println("      No files were moved.");
            }
            for step in &journal.completed {
                ui.println(format!("      {} {}", ui.icon_ok(), step));
            }
            ui.println(ui.dim(
                "      Repair the layout by hand, then run 'tbm doctor --clear-journal'.",
            ));
            false
        }
        Err(e) => {
            ui.println(format!("  {} {}", ui.icon_err(), e));
            false
        }
    }
}

fn check_profiles(paths: &Paths, ui: &Ui) -> bool {
    let entries = match list_profiles(paths) {
        Ok(entries) => entries,
        Err(e) => {
            ui.println(format!("  {} Failed to list profiles: {}", ui.icon_err(), e));
            return false;
        }
    };

    let parked: Vec<&str> = entries
        .iter()
        .filter_map(|entry| entry.strip_suffix(".json"))
        .filter(|stem| *stem != STORAGE_SLOT)
        .collect();

    if parked.is_empty() {
        ui.println(format!("  {} No other profiles found", ui.icon_warn()));
        return true;
    }

    ui.println(format!("  Found {} other profiles:", parked.len()));
    for name in parked {
        if paths.archive_file(name).exists() {
            ui.println(format!("    {} {}", ui.icon_ok(), name));
        } else {
            ui.println(format!("    {} {} (no archive)", ui.icon_warn(), name));
        }
    }
    true
}

fn check_step<F>(ui: &Ui, name: &str, check_fn: F) -> bool
where
    F: FnOnce() -> bool,
{
    ui.println(ui.bold(format!("Checking {}...", name)));
    let success = check_fn();
    if !success {
        ui.println(ui.colored("  Issues detected!", AnsiColor::Red));
    }
    ui.newline();
    success
}
