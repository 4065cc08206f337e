//! Bounded-prefix detection of a leading UTF-8 BOM and CRLF line endings.
//!
//! Only the first [`SCAN_WINDOW`] bytes are inspected, so the cost per file
//! is constant regardless of size. A file whose only CRLF sits past the
//! window is reported clean; the rewriter still fixes every CRLF once a file
//! has been flagged.

use crate::error::CleanError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Number of leading bytes searched for `\r\n`.
pub const SCAN_WINDOW: usize = 1024;

/// Default size ceiling: 100 MiB.
pub const DEFAULT_MAX_SIZE: u64 = 100 * 1024 * 1024;

/// Which defects were found: none, bom, crlf, or both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IssueSet {
    pub bom: bool,
    pub crlf: bool,
}

impl IssueSet {
    pub const NONE: IssueSet = IssueSet { bom: false, crlf: false };

    pub fn is_empty(self) -> bool {
        !self.bom && !self.crlf
    }

    pub fn as_str(self) -> &'static str {
        match (self.bom, self.crlf) {
            (false, false) => "none",
            (true, false) => "bom",
            (false, true) => "crlf",
            (true, true) => "bom+crlf",
        }
    }
}

impl fmt::Display for IssueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for IssueSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Classify an in-memory prefix of a file.
pub fn classify(prefix: &[u8]) -> IssueSet {
    let window = &prefix[..prefix.len().min(SCAN_WINDOW)];
    IssueSet {
        bom: window.starts_with(&BOM),
        crlf: window.windows(2).any(|w| w == b"\r\n"),
    }
}

/// Detect issues in the file at `path` without reading past the scan window.
///
/// Fails with `TooLarge` when the file exceeds `max_size` and with
/// `Unreadable`/`AccessDenied` when it cannot be opened.
pub fn detect(path: &Path, max_size: u64) -> Result<IssueSet, CleanError> {
    let file = File::open(path).map_err(|e| CleanError::from_open(path.to_path_buf(), e))?;
    detect_open(path, &file, max_size)
}

/// Detection against an already opened handle; the handle's cursor must be
/// at the start of the file.
pub(crate) fn detect_open(path: &Path, file: &File, max_size: u64) -> Result<IssueSet, CleanError> {
    let unreadable = |source| CleanError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let meta = file.metadata().map_err(unreadable)?;
    if !meta.is_file() {
        return Err(unreadable(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    if meta.len() > max_size {
        return Err(CleanError::TooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            limit: max_size,
        });
    }
    let mut prefix = Vec::with_capacity(SCAN_WINDOW);
    file.take(SCAN_WINDOW as u64)
        .read_to_end(&mut prefix)
        .map_err(unreadable)?;
    Ok(classify(&prefix))
}
