//! Atomic in-place rewrite of a single file.
//!
//! The corrected content is written to a scratch file, the original is
//! copied to a backup, and the scratch file is renamed over the original.
//! Any failure before or during the swap leaves the original as it was;
//! if a damaged original cannot be restored, the backup is kept on disk and
//! named in the error.
//! Owner, group, mode and modification time are put back afterwards.
//! Scratch and backup files are `NamedTempFile` guards, so every exit path
//! removes them.

use crate::detect::{self, IssueSet};
use crate::error::{Attribute, AttributeWarning, CleanError, RollbackError};
use crate::scratch::ScratchArea;
use crate::transform;
use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::NamedTempFile;

/// Attributes of the original file captured before any mutation.
#[derive(Debug, Clone)]
pub struct FileTarget {
    pub path: PathBuf,
    pub size: u64,
    /// `(uid, gid)`; `None` where ownership is not exposed.
    pub owner: Option<(u32, u32)>,
    pub permissions: Permissions,
    pub mtime: SystemTime,
}

impl FileTarget {
    pub fn snapshot(path: &Path, file: &File) -> io::Result<Self> {
        let meta = file.metadata()?;
        Ok(FileTarget {
            path: path.to_path_buf(),
            size: meta.len(),
            owner: owner_of(&meta),
            permissions: meta.permissions(),
            mtime: meta.modified()?,
        })
    }
}

#[cfg(unix)]
fn owner_of(meta: &fs::Metadata) -> Option<(u32, u32)> {
    use std::os::unix::fs::MetadataExt;
    Some((meta.uid(), meta.gid()))
}

#[cfg(not(unix))]
fn owner_of(_meta: &fs::Metadata) -> Option<(u32, u32)> {
    None
}

/// Result of a successful `clean` call.
#[derive(Debug)]
pub enum CleanOutcome {
    /// Nothing detected; the file was not touched.
    SkippedClean,
    /// The file was rewritten. `warnings` lists attributes that could not be
    /// restored; they do not make the operation fail.
    Processed {
        issues: IssueSet,
        warnings: Vec<AttributeWarning>,
    },
}

/// The swap step: move a fully written file onto `target`.
pub trait Replace {
    fn replace(&self, staged: NamedTempFile, target: &Path) -> io::Result<()>;
}

/// Single `rename(2)` through `NamedTempFile::persist`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameReplace;

impl Replace for RenameReplace {
    fn replace(&self, staged: NamedTempFile, target: &Path) -> io::Result<()> {
        staged.persist(target).map(drop).map_err(|e| e.error)
    }
}

pub struct Rewriter<R = RenameReplace> {
    scratch: ScratchArea,
    max_size: u64,
    replace: R,
}

impl Rewriter {
    pub fn new(scratch: ScratchArea, max_size: u64) -> Self {
        Rewriter::with_replace(scratch, max_size, RenameReplace)
    }
}

impl<R: Replace> Rewriter<R> {
    pub fn with_replace(scratch: ScratchArea, max_size: u64, replace: R) -> Self {
        Rewriter {
            scratch,
            max_size,
            replace,
        }
    }

    pub fn scratch(&self) -> &ScratchArea {
        &self.scratch
    }

    /// Detection only; never mutates anything.
    pub fn inspect(&self, path: &Path) -> Result<IssueSet, CleanError> {
        reject_symlink(path)?;
        detect::detect(path, self.max_size)
    }

    /// Remove a leading BOM and every CRLF from the file at `path`.
    pub fn clean(&self, path: &Path) -> Result<CleanOutcome, CleanError> {
        reject_symlink(path)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| CleanError::from_open(path.to_path_buf(), e))?;

        let issues = detect::detect_open(path, &file, self.max_size)?;
        if issues.is_empty() {
            return Ok(CleanOutcome::SkippedClean);
        }

        let target = FileTarget::snapshot(path, &file).map_err(|source| CleanError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let scratch = self
            .write_scratch(&file, path)
            .map_err(|source| CleanError::WriteFailed {
                path: path.to_path_buf(),
                source,
            })?;
        let backup = self
            .write_backup(&file, path)
            .map_err(|source| CleanError::BackupFailed {
                path: path.to_path_buf(),
                source,
            })?;
        drop(file);

        let replace_failed = |source, rollback| CleanError::ReplaceFailed {
            path: path.to_path_buf(),
            source,
            rollback,
        };
        let staged = if self.scratch.needs_staging(path) {
            self.stage_beside(&scratch, path)
                .map_err(|source| replace_failed(source, None))?
        } else {
            scratch
        };
        if let Err(source) = self.replace.replace(staged, path) {
            return Err(replace_failed(source, rollback(&target, backup).err()));
        }

        let warnings = restore_attributes(&target);
        Ok(CleanOutcome::Processed { issues, warnings })
    }

    fn write_scratch(&self, mut file: &File, path: &Path) -> io::Result<NamedTempFile> {
        let mut scratch = self.scratch.scratch_file(path)?;
        file.seek(SeekFrom::Start(0))?;
        transform::strip(BufReader::new(file), BufWriter::new(scratch.as_file_mut()))?;
        scratch.as_file().sync_all()?;
        Ok(scratch)
    }

    fn write_backup(&self, mut file: &File, path: &Path) -> io::Result<NamedTempFile> {
        let mut backup = self.scratch.backup_file(path)?;
        file.seek(SeekFrom::Start(0))?;
        io::copy(&mut file, backup.as_file_mut())?;
        backup.as_file().sync_all()?;
        Ok(backup)
    }

    /// Copy the scratch file into a hidden sibling of `path` so the final
    /// rename stays on one filesystem.
    fn stage_beside(&self, scratch: &NamedTempFile, path: &Path) -> io::Result<NamedTempFile> {
        let mut staged = self.scratch.staging_file(path)?;
        let mut src = File::open(scratch.path())?;
        io::copy(&mut src, staged.as_file_mut())?;
        staged.as_file().sync_all()?;
        Ok(staged)
    }
}

fn reject_symlink(path: &Path) -> Result<(), CleanError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => Err(CleanError::Unreadable {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "is a symbolic link"),
        }),
        Ok(_) => Ok(()),
        Err(e) => Err(CleanError::from_open(path.to_path_buf(), e)),
    }
}

/// Put the original back when the swap failed after touching the target.
/// A target that still matches the backup is left alone so its mtime is
/// not disturbed. When the copy back fails the backup is kept on disk.
fn rollback(target: &FileTarget, backup: NamedTempFile) -> Result<(), RollbackError> {
    if same_contents(&target.path, backup.path()).unwrap_or(false) {
        return Ok(());
    }
    match fs::copy(backup.path(), &target.path) {
        Ok(_) => {
            restore_attributes(target);
            Ok(())
        }
        Err(source) => {
            let backup = match backup.into_temp_path().keep() {
                Ok(kept) => kept,
                Err(e) => e.path.to_path_buf(),
            };
            Err(RollbackError { backup, source })
        }
    }
}

fn same_contents(a: &Path, b: &Path) -> io::Result<bool> {
    let (fa, fb) = (File::open(a)?, File::open(b)?);
    if fa.metadata()?.len() != fb.metadata()?.len() {
        return Ok(false);
    }
    let (mut ra, mut rb) = (BufReader::new(fa), BufReader::new(fb));
    let mut ba = [0u8; 8192];
    let mut bb = [0u8; 8192];
    loop {
        let n = ra.read(&mut ba)?;
        if n == 0 {
            return Ok(true);
        }
        rb.read_exact(&mut bb[..n])?;
        if ba[..n] != bb[..n] {
            return Ok(false);
        }
    }
}

/// Reapply owner, group, mode and mtime from the snapshot. Failures are
/// returned as warnings, never as errors.
fn restore_attributes(target: &FileTarget) -> Vec<AttributeWarning> {
    let warn = |attribute, source| AttributeWarning {
        path: target.path.clone(),
        attribute,
        source,
    };
    let file = match open_for_attributes(&target.path) {
        Ok(f) => f,
        Err(e) => {
            return [Attribute::Owner, Attribute::Mode, Attribute::Mtime]
                .into_iter()
                .map(|a| warn(a, io::Error::new(e.kind(), e.to_string())))
                .collect();
        }
    };

    let mut warnings = Vec::new();
    if let Err(e) = set_owner(&file, target.owner) {
        warnings.push(warn(Attribute::Owner, e));
    }
    if let Err(e) = file.set_permissions(target.permissions.clone()) {
        warnings.push(warn(Attribute::Mode, e));
    }
    if let Err(e) = file.set_modified(target.mtime) {
        warnings.push(warn(Attribute::Mtime, e));
    }
    warnings
}

#[cfg(unix)]
fn open_for_attributes(path: &Path) -> io::Result<File> {
    File::open(path)
}

#[cfg(not(unix))]
fn open_for_attributes(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).open(path)
}

#[cfg(unix)]
fn set_owner(file: &File, owner: Option<(u32, u32)>) -> io::Result<()> {
    match owner {
        Some((uid, gid)) => std::os::unix::fs::fchown(file, Some(uid), Some(gid)),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn set_owner(_file: &File, _owner: Option<(u32, u32)>) -> io::Result<()> {
    Ok(())
}
