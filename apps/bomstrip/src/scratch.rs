//! Scratch area for the temporary artifacts of a clean operation.
//!
//! Every artifact name embeds the run id (the process id) and the target's
//! file name: `bomstrip-<run>-<name>.tmp` for the corrected content and
//! `bomstrip-<run>-<name>.bak` for the backup. Artifacts are `NamedTempFile`s,
//! so they are removed when the owning operation drops them. If the process
//! is killed first, `sweep` finds them by name, and `sweep_staging` finds
//! the hidden `.bomstrip-<run>-<name>.swap` files staged beside targets.

use crate::error::RunError;
use glob::{glob_with, MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

pub const ARTIFACT_PREFIX: &str = "bomstrip-";
const SCRATCH_SUFFIX: &str = ".tmp";
const BACKUP_SUFFIX: &str = ".bak";
const STAGING_SUFFIX: &str = ".swap";
const PROBE_NAME: &str = "probe";

/// Identifier of one run, embedded in every artifact it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunId(pub u32);

impl RunId {
    pub fn current() -> Self {
        RunId(std::process::id())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ScratchArea {
    dir: PathBuf,
    run: RunId,
    always_stage: bool,
}

impl ScratchArea {
    pub fn new(dir: impl Into<PathBuf>, run: RunId) -> Self {
        ScratchArea {
            dir: dir.into(),
            run,
            always_stage: false,
        }
    }

    /// Stage every replacement in a sibling of the target, as if the
    /// scratch area were on another device.
    pub fn with_sibling_staging(mut self) -> Self {
        self.always_stage = true;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn run(&self) -> RunId {
        self.run
    }

    /// Check once, before any file is touched, that artifacts can be created
    /// and removed in the scratch area.
    pub fn preflight(&self) -> Result<(), RunError> {
        let unavailable = |source| RunError::ScratchUnavailable {
            dir: self.dir.clone(),
            source,
        };
        let meta = fs::metadata(&self.dir).map_err(unavailable)?;
        if !meta.is_dir() {
            return Err(unavailable(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a directory",
            )));
        }
        let mut probe = self
            .create(&self.dir, PROBE_NAME, SCRATCH_SUFFIX)
            .map_err(unavailable)?;
        probe.write_all(b"ok").map_err(unavailable)?;
        probe.close().map_err(unavailable)
    }

    /// Private file for the corrected content of `target`.
    pub fn scratch_file(&self, target: &Path) -> io::Result<NamedTempFile> {
        self.create(&self.dir, &target_name(target), SCRATCH_SUFFIX)
    }

    /// Private file for the backup copy of `target`.
    pub fn backup_file(&self, target: &Path) -> io::Result<NamedTempFile> {
        self.create(&self.dir, &target_name(target), BACKUP_SUFFIX)
    }

    /// Hidden sibling of `target`, used when the scratch area sits on
    /// another device and a direct rename is impossible.
    pub fn staging_file(&self, target: &Path) -> io::Result<NamedTempFile> {
        let parent = parent_dir(target);
        let prefix = format!(".{}{}-{}", ARTIFACT_PREFIX, self.run, target_name(target));
        create_named(parent, &prefix, STAGING_SUFFIX)
    }

    /// Whether a rename from the scratch area onto `target` stays on one
    /// filesystem.
    pub fn same_device(&self, target: &Path) -> bool {
        same_device(&self.dir, parent_dir(target))
    }

    /// Whether the corrected content must be copied beside `target` before
    /// the final rename.
    pub fn needs_staging(&self, target: &Path) -> bool {
        self.always_stage || !self.same_device(target)
    }

    fn create(&self, dir: &Path, name: &str, suffix: &str) -> io::Result<NamedTempFile> {
        let prefix = format!("{}{}-{}", ARTIFACT_PREFIX, self.run, name);
        create_named(dir, &prefix, suffix)
    }
}

/// Create `dir/<prefix><suffix>` with no random part. A file already holding
/// that name can only be a leftover of a dead run that reused our pid, so
/// it is replaced.
fn create_named(dir: &Path, prefix: &str, suffix: &str) -> io::Result<NamedTempFile> {
    let build = || {
        Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .rand_bytes(0)
            .tempfile_in(dir)
    };
    match build() {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            fs::remove_file(dir.join(format!("{prefix}{suffix}")))?;
            build()
        }
        other => other,
    }
}

/// Longest target-name part of an artifact name, in bytes. Prefix, run id
/// and suffix must still fit in a 255-byte file name.
const MAX_NAME_PART: usize = 200;

fn target_name(target: &Path) -> String {
    let mut name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    if name.len() > MAX_NAME_PART {
        let mut end = MAX_NAME_PART;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);
    }
    name
}

fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn same_device(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(ma), Ok(mb)) => ma.dev() == mb.dev(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_device(a: &Path, b: &Path) -> bool {
    let root = |p: &Path| {
        fs::canonicalize(p)
            .ok()
            .and_then(|c| c.components().next().map(|c| c.as_os_str().to_owned()))
    };
    matches!((root(a), root(b)), (Some(x), Some(y)) if x == y)
}

/// Whether `name` is an artifact, optionally restricted to one run. Hidden
/// `.swap` staging files count as well as scratch and backup files.
pub fn is_artifact(name: &OsStr, run: Option<RunId>) -> bool {
    let Some(name) = name.to_str() else {
        return false;
    };
    let (name, suffixes): (&str, &[&str]) = match name.strip_prefix('.') {
        Some(hidden) => (hidden, &[STAGING_SUFFIX]),
        None => (name, &[SCRATCH_SUFFIX, BACKUP_SUFFIX]),
    };
    let Some(rest) = name.strip_prefix(ARTIFACT_PREFIX) else {
        return false;
    };
    if !suffixes.iter().any(|s| rest.ends_with(s)) {
        return false;
    }
    let Some((id, _)) = rest.split_once('-') else {
        return false;
    };
    match run {
        Some(run) => id == run.to_string(),
        None => id.parse::<u32>().is_ok(),
    }
}

/// Remove artifacts left in `dir`, either every run's or only `run`'s.
/// Returns the removed paths in sorted order.
pub fn sweep(dir: &Path, run: Option<RunId>) -> Result<Vec<PathBuf>, RunError> {
    let failed = |source| RunError::Sweep {
        dir: dir.to_path_buf(),
        source,
    };
    let mut removed = Vec::new();
    for entry in fs::read_dir(dir).map_err(failed)? {
        let entry = entry.map_err(failed)?;
        if !is_artifact(&entry.file_name(), run) {
            continue;
        }
        if !entry.file_type().map_err(failed)?.is_file() {
            continue;
        }
        let path = entry.path();
        match fs::remove_file(&path) {
            Ok(()) => removed.push(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(failed(e)),
        }
    }
    removed.sort();
    Ok(removed)
}

/// Remove staging files left beside targets. Directories in `roots` are
/// searched recursively; for a file root only its own directory is looked at.
pub fn sweep_staging(roots: &[PathBuf], run: Option<RunId>) -> Result<Vec<PathBuf>, RunError> {
    let opts = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let mut removed = BTreeSet::new();
    for root in roots {
        let (dir, depth) = if root.is_dir() {
            (root.as_path(), "**/")
        } else {
            (parent_dir(root), "")
        };
        let failed = |source| RunError::Sweep {
            dir: dir.to_path_buf(),
            source,
        };
        let pattern = format!(
            "{}/{}.{}*{}",
            Pattern::escape(&dir.to_string_lossy()),
            depth,
            ARTIFACT_PREFIX,
            STAGING_SUFFIX
        );
        let entries = glob_with(&pattern, opts)
            .map_err(|e| failed(io::Error::new(io::ErrorKind::InvalidInput, e.to_string())))?;
        for path in entries.flatten() {
            let selected = path.file_name().is_some_and(|n| is_artifact(n, run));
            let is_file = fs::symlink_metadata(&path)
                .map(|m| m.file_type().is_file())
                .unwrap_or(false);
            if !selected || !is_file {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    removed.insert(path);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(failed(e)),
            }
        }
    }
    Ok(removed.into_iter().collect())
}
