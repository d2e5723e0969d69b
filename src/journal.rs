//! Switch intent journal (`tbm.switch`).
//!
//! Written before the first rename of a switch and rewritten after every
//! completed step, then removed once the pointer is updated. A journal found on
//! disk outside a running switch means a previous switch was interrupted; the
//! completed steps tell the user which files already moved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, TbmError};
use crate::fs_utils::write_file_atomic;
use crate::paths::Paths;

/// One filesystem step of a switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchStep {
    /// storage.json -> <from>.json
    ParkStorage,
    /// archive.json -> <from>.json
    ParkArchive,
    /// <to>.json -> storage.json
    PromoteStorage,
    /// <to>.json -> archive.json
    PromoteArchive,
}

impl fmt::Display for SwitchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ParkStorage => "park storage.json",
            Self::ParkArchive => "park archive.json",
            Self::PromoteStorage => "promote storage",
            Self::PromoteArchive => "promote archive",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchJournal {
    /// Profile being parked
    pub from: String,
    /// Profile being activated
    pub to: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: Vec<SwitchStep>,

    #[serde(skip)]
    path: PathBuf,
}

impl SwitchJournal {
    /// Durably record the intent to switch from `from` to `to`
    pub fn begin(paths: &Paths, from: &str, to: &str) -> Result<Self> {
        let journal = Self {
            from: from.to_string(),
            to: to.to_string(),
            started_at: Utc::now(),
            completed: Vec::new(),
            path: paths.journal_file.clone(),
        };
        journal.save()?;
        Ok(journal)
    }

    /// Mark `step` as done
    pub fn record(&mut self, step: SwitchStep) -> Result<()> {
        self.completed.push(step);
        self.save()
    }

    /// The switch finished; drop the journal
    pub fn finish(self) -> Result<()> {
        remove_if_exists(&self.path).map(|_| ())
    }

    /// Load a journal left behind by an earlier invocation
    pub fn load(paths: &Paths) -> Result<Option<Self>> {
        let path = &paths.journal_file;
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TbmError::read(path, e)),
        };

        let mut journal: Self =
            serde_json::from_str(&content).map_err(|e| TbmError::Journal {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        journal.path = path.clone();
        Ok(Some(journal))
    }

    /// Remove a stale journal; returns whether one was present
    pub fn clear(paths: &Paths) -> Result<bool> {
        remove_if_exists(&paths.journal_file)
    }

    fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| TbmError::Journal {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        write_file_atomic(&self.path, &content)
    }
}

fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(TbmError::write(path, e)),
    }
}
