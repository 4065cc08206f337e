//! Error taxonomy for per-file failures, non-fatal attribute warnings, and
//! the few run-level errors that abort a batch.

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Per-file failure. A failure on one file never aborts the batch.
#[derive(Error, Debug)]
pub enum CleanError {
    /// The invoking user cannot open the file for both reading and writing.
    #[error("access denied: {path}: {source}")]
    AccessDenied { path: PathBuf, source: io::Error },

    /// File is larger than the configured ceiling and is left untouched.
    #[error("file too large: {path} ({size} bytes, limit {limit})")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// The path is missing, not a regular file, or could not be read.
    #[error("cannot read {path}: {source}")]
    Unreadable { path: PathBuf, source: io::Error },

    /// Backup copy of the original could not be written.
    #[error("backup failed for {path}: {source}")]
    BackupFailed { path: PathBuf, source: io::Error },

    /// Corrected content could not be written to the scratch file.
    #[error("write failed for {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Swapping the scratch file into place failed. The original is intact
    /// unless `rollback` is set, in which case its bytes live in the kept
    /// backup.
    #[error("replace failed for {path}: {source}{}", rollback_note(.rollback))]
    ReplaceFailed {
        path: PathBuf,
        source: io::Error,
        rollback: Option<RollbackError>,
    },
}

/// Restoring a damaged target from its backup failed. The backup is kept.
#[derive(Error, Debug)]
#[error("rollback failed: {source}; original content kept at {backup}")]
pub struct RollbackError {
    pub backup: PathBuf,
    pub source: io::Error,
}

fn rollback_note(rollback: &Option<RollbackError>) -> String {
    match rollback {
        Some(r) => format!("; {}", r),
        None => String::new(),
    }
}

impl CleanError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CleanError::AccessDenied { .. } => FailureKind::AccessDenied,
            CleanError::TooLarge { .. } => FailureKind::TooLarge,
            CleanError::Unreadable { .. } => FailureKind::Unreadable,
            CleanError::BackupFailed { .. } => FailureKind::BackupFailed,
            CleanError::WriteFailed { .. } => FailureKind::WriteFailed,
            CleanError::ReplaceFailed { .. } => FailureKind::ReplaceFailed,
        }
    }

    /// Classify an error from opening `path`.
    pub(crate) fn from_open(path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            CleanError::AccessDenied { path, source }
        } else {
            CleanError::Unreadable { path, source }
        }
    }
}

/// Countable failure category, used for the per-kind breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    AccessDenied,
    TooLarge,
    Unreadable,
    BackupFailed,
    WriteFailed,
    ReplaceFailed,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::AccessDenied => "access-denied",
            FailureKind::TooLarge => "too-large",
            FailureKind::Unreadable => "unreadable",
            FailureKind::BackupFailed => "backup-failed",
            FailureKind::WriteFailed => "write-failed",
            FailureKind::ReplaceFailed => "replace-failed",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which snapshotted attribute could not be put back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Owner,
    Mode,
    Mtime,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Owner => f.write_str("owner"),
            Attribute::Mode => f.write_str("mode"),
            Attribute::Mtime => f.write_str("mtime"),
        }
    }
}

/// Non-fatal: the file was fixed but an attribute could not be restored,
/// typically because the invoking user lacks the privilege to chown.
#[derive(Error, Debug)]
#[error("could not restore {attribute} on {path}: {source}")]
pub struct AttributeWarning {
    pub path: PathBuf,
    pub attribute: Attribute,
    pub source: io::Error,
}

/// Errors that abort the whole run.
#[derive(Error, Debug)]
pub enum RunError {
    /// No atomicity guarantee is possible without scratch space.
    #[error("scratch area {dir} is not usable: {source}")]
    ScratchUnavailable { dir: PathBuf, source: io::Error },

    #[error("sweep of {dir} failed: {source}")]
    Sweep { dir: PathBuf, source: io::Error },
}
