//! Per-file reports and the aggregate summary consumed by printers.

use crate::detect::IssueSet;
use crate::error::FailureKind;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    /// Nothing to fix.
    Clean,
    /// Rewritten in place.
    Fixed,
    /// Preview mode: would be rewritten.
    WouldFix,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
/// Outcome for a single candidate file.
pub struct FileReport {
    pub file: String,
    pub status: FileStatus,
    pub issues: Option<IssueSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Aggregated counters for one run.
pub struct Summary {
    pub files: usize,
    pub clean: usize,
    pub fixed: usize,
    pub fixed_bom: usize,
    pub fixed_crlf: usize,
    pub fixed_both: usize,
    pub would_fix: usize,
    pub failed: usize,
    pub failures: BTreeMap<FailureKind, usize>,
    pub warnings: usize,
}

impl Summary {
    pub fn record(&mut self, report: &FileReport) {
        self.files += 1;
        self.warnings += report.warnings.len();
        match report.status {
            FileStatus::Clean => self.clean += 1,
            FileStatus::WouldFix => self.would_fix += 1,
            FileStatus::Fixed => {
                self.fixed += 1;
                match report.issues.map(|i| (i.bom, i.crlf)) {
                    Some((true, false)) => self.fixed_bom += 1,
                    Some((false, true)) => self.fixed_crlf += 1,
                    Some((true, true)) => self.fixed_both += 1,
                    _ => {}
                }
            }
            FileStatus::Failed => {
                self.failed += 1;
                if let Some(kind) = report.failure {
                    *self.failures.entry(kind).or_default() += 1;
                }
            }
        }
    }

    pub fn failures_of(&self, kind: FailureKind) -> usize {
        self.failures.get(&kind).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
/// Everything a run produced, in processing order.
pub struct RunReport {
    pub results: Vec<FileReport>,
    pub summary: Summary,
    pub preview: bool,
    pub interrupted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(status: FileStatus, issues: Option<IssueSet>, failure: Option<FailureKind>) -> FileReport {
        FileReport {
            file: "f".into(),
            status,
            issues,
            failure,
            message: None,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn summary_breaks_down_fixes_and_failures() {
        let mut s = Summary::default();
        s.record(&report(FileStatus::Fixed, Some(IssueSet { bom: true, crlf: false }), None));
        s.record(&report(FileStatus::Fixed, Some(IssueSet { bom: true, crlf: true }), None));
        s.record(&report(FileStatus::Fixed, Some(IssueSet { bom: false, crlf: true }), None));
        s.record(&report(FileStatus::Clean, Some(IssueSet::NONE), None));
        s.record(&report(FileStatus::Failed, None, Some(FailureKind::TooLarge)));
        s.record(&report(FileStatus::Failed, None, Some(FailureKind::TooLarge)));
        assert_eq!(s.files, 6);
        assert_eq!((s.fixed, s.fixed_bom, s.fixed_crlf, s.fixed_both), (3, 1, 1, 1));
        assert_eq!(s.clean, 1);
        assert_eq!(s.failed, 2);
        assert_eq!(s.failures_of(FailureKind::TooLarge), 2);
        assert_eq!(s.failures_of(FailureKind::WriteFailed), 0);
    }
}
