//! Typed errors for the profile switchboard.
//!
//! Every variant that stems from a filesystem call carries the offending path
//! and the underlying `io::Error`, so the CLI can print a message that embeds
//! both.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = TbmError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TbmError {
    /// A required file or directory is missing
    #[error("Path ({}) does not exist", .path.display())]
    PathNotFound { path: PathBuf },

    #[error("Profile '{name}' does not exist ({} is missing)", .path.display())]
    ProfileNotFound { name: String, path: PathBuf },

    #[error("No active profile: {} does not exist", .path.display())]
    NoActiveProfile { path: PathBuf },

    #[error("'{name}' is reserved for the active slot and cannot be used as a profile name")]
    ReservedName { name: String },

    /// Parking the outgoing profile would overwrite an existing file
    #[error(
        "Cannot park profile '{name}': {} already exists\nHint: run 'tbm doctor' to inspect the layout.",
        .path.display()
    )]
    SlotOccupied { name: String, path: PathBuf },

    #[error("Failed to rename {} -> {}: {cause}", .from.display(), .to.display())]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        cause: io::Error,
    },

    #[error("Could not write {}: {cause}", .path.display())]
    WriteFailed {
        path: PathBuf,
        cause: io::Error,
    },

    #[error("Could not read {}: {cause}", .path.display())]
    ReadFailed {
        path: PathBuf,
        cause: io::Error,
    },

    #[error("Another tbm invocation holds the lock on {}", .path.display())]
    Locked { path: PathBuf },

    #[error(
        "A previous switch from '{from}' to '{to}' was interrupted\nHint: run 'tbm doctor' to see which steps completed."
    )]
    InterruptedSwitch { from: String, to: String },

    #[error("Switch journal {} is unreadable: {reason}", .path.display())]
    Journal { path: PathBuf, reason: String },
}

impl TbmError {
    pub(crate) fn read(path: impl Into<PathBuf>, cause: io::Error) -> Self {
        Self::ReadFailed {
            path: path.into(),
            cause,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, cause: io::Error) -> Self {
        Self::WriteFailed {
            path: path.into(),
            cause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_embed_path_and_cause() {
        let err = TbmError::RenameFailed {
            from: PathBuf::from("/tb/storage/storage.json"),
            to: PathBuf::from("/tb/storage/home.json"),
            cause: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tb/storage/storage.json"));
        assert!(msg.contains("/tb/storage/home.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_profile_not_found_message() {
        let err = TbmError::ProfileNotFound {
            name: "ghost".to_string(),
            path: PathBuf::from("/tb/storage/ghost.json"),
        };
        assert!(err.to_string().contains("'ghost'"));
    }
}
