//! Profile switching logic.
//!
//! This module implements the core mechanism of `tbm`: moving one profile's
//! data out of the active slot and another profile's data into it.
//!
//! A switch is four renames followed by a pointer write:
//! 1. `storage/storage.json` -> `storage/<current>.json`
//! 2. `archive/archive.json` -> `archive/<current>.json` (if present)
//! 3. `storage/<target>.json` -> `storage/storage.json`
//! 4. `archive/<target>.json` -> `archive/archive.json` (if present)
//! 5. `tbm.profile` <- `<target>`
//!
//! Storage files are load-bearing: a missing one aborts the switch before
//! anything moves. Archive files are best-effort and only produce warnings.
//! There is no rollback; a failure part way leaves the completed renames in
//! place and the switch journal on disk for `tbm doctor` to report.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, TbmError};
use crate::fs_utils::rename_file;
use crate::journal::{SwitchJournal, SwitchStep};
use crate::lock::RootLock;
use crate::paths::Paths;
use crate::pointer::{current_profile_name, write_pointer};
use crate::profiles::is_reserved;
use crate::ui::Ui;

/// Which parts of the taskbook layout exist right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotStatus {
    pub storage_dir: bool,
    pub active_storage: bool,
    pub archive_dir: bool,
    pub active_archive: bool,
}

impl SlotStatus {
    pub fn detect(paths: &Paths) -> Self {
        Self {
            storage_dir: paths.storage_dir.is_dir(),
            active_storage: paths.active_storage().exists(),
            archive_dir: paths.archive_dir.is_dir(),
            active_archive: paths.active_archive().exists(),
        }
    }
}

/// An archive step that was skipped because its source file is absent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveSkip {
    /// `archive/<target>.json` is missing, so no archive is promoted
    TargetMissing(PathBuf),
    /// `archive/archive.json` is missing, so nothing is parked
    ActiveMissing(PathBuf),
}

impl fmt::Display for ArchiveSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetMissing(path) => {
                write!(f, "Archive ({}) does not exist, continuing.", path.display())
            }
            Self::ActiveMissing(path) => {
                write!(f, "Archive ({}) doesn't exist, skip.", path.display())
            }
        }
    }
}

/// Everything a switch needs to know, gathered before the first rename
#[derive(Debug, Clone, PartialEq, Eq)]
struct SwitchPlan {
    /// Profile currently in the active slot (from the pointer)
    pub current: String,
    pub target: String,
    /// `archive/<target>.json` exists
    pub promote_archive: bool,
    /// `archive/archive.json` exists
    pub park_archive: bool,
}

impl SwitchPlan {
    fn skipped(&self, paths: &Paths) -> Vec<ArchiveSkip> {
        let mut skipped = Vec::new();
        if !self.promote_archive {
            skipped.push(ArchiveSkip::TargetMissing(paths.archive_file(&self.target)));
        }
        if !self.park_archive {
            skipped.push(ArchiveSkip::ActiveMissing(paths.active_archive()));
        }
        skipped
    }
}

/// Result of a completed switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    /// Profile that was parked
    pub from: String,
    /// Profile now in the active slot
    pub to: String,
    pub skipped: Vec<ArchiveSkip>,
}

/// Run the existence checks and build a plan; nothing is moved
///
/// The pointer is only read (and, when missing, created) after the checks
/// that can fail closed, so a refused switch leaves every file untouched.
fn plan_switch(paths: &Paths, target: &str, ui: &Ui) -> Result<SwitchPlan> {
    let target_storage = paths.storage_file(target);
    if !target_storage.exists() {
        return Err(TbmError::ProfileNotFound {
            name: target.to_string(),
            path: target_storage,
        });
    }

    let promote_archive = paths.archive_file(target).exists();

    let active_storage = paths.active_storage();
    if !active_storage.exists() {
        return Err(TbmError::NoActiveProfile {
            path: active_storage,
        });
    }
    let park_archive = paths.active_archive().exists();

    let current = current_profile_name(paths, ui)?;

    // Parking must never overwrite another copy of the outgoing profile
    let park_storage_to = paths.storage_file(&current);
    if park_storage_to.exists() {
        return Err(TbmError::SlotOccupied {
            name: current,
            path: park_storage_to,
        });
    }
    let park_archive_to = paths.archive_file(&current);
    if park_archive && park_archive_to.exists() {
        return Err(TbmError::SlotOccupied {
            name: current,
            path: park_archive_to,
        });
    }

    Ok(SwitchPlan {
        current,
        target: target.to_string(),
        promote_archive,
        park_archive,
    })
}

/// Switch the active slot to `target`
pub fn activate(paths: &Paths, target: &str, ui: &Ui) -> Result<SwitchOutcome> {
    if is_reserved(target) {
        return Err(TbmError::ReservedName {
            name: target.to_string(),
        });
    }

    let _lock = RootLock::acquire(paths)?;

    if let Some(stale) = SwitchJournal::load(paths)? {
        return Err(TbmError::InterruptedSwitch {
            from: stale.from,
            to: stale.to,
        });
    }

    let plan = plan_switch(paths, target, ui)?;
    // Printed before the first rename, independent of how the switch ends
    let skipped = plan.skipped(paths);
    for skip in &skipped {
        ui.warn(skip.to_string());
    }
    execute(paths, &plan, ui)?;

    Ok(SwitchOutcome {
        from: plan.current,
        to: plan.target,
        skipped,
    })
}

fn execute(paths: &Paths, plan: &SwitchPlan, ui: &Ui) -> Result<()> {
    let mut journal = SwitchJournal::begin(paths, &plan.current, &plan.target)?;

    move_step(
        &mut journal,
        SwitchStep::ParkStorage,
        &paths.active_storage(),
        &paths.storage_file(&plan.current),
        ui,
    )?;

    if plan.park_archive {
        move_step(
            &mut journal,
            SwitchStep::ParkArchive,
            &paths.active_archive(),
            &paths.archive_file(&plan.current),
            ui,
        )?;
    }

    move_step(
        &mut journal,
        SwitchStep::PromoteStorage,
        &paths.storage_file(&plan.target),
        &paths.active_storage(),
        ui,
    )?;

    if plan.promote_archive {
        move_step(
            &mut journal,
            SwitchStep::PromoteArchive,
            &paths.archive_file(&plan.target),
            &paths.active_archive(),
            ui,
        )?;
    }

    ui.debug(format!(
        "writing '{}' to {}",
        plan.target,
        paths.pointer_file.display()
    ));
    write_pointer(paths, &plan.target)?;
    journal.finish()
}

fn move_step(
    journal: &mut SwitchJournal,
    step: SwitchStep,
    from: &Path,
    to: &Path,
    ui: &Ui,
) -> Result<()> {
    ui.debug(format!("{}: {} -> {}", step, from.display(), to.display()));
    rename_file(from, to)?;
    journal.record(step)
}
