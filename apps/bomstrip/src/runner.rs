//! Sequential batch driver: one file is fully detected and cleaned before
//! the next begins. Counters live here, never in the rewriter.

use crate::models::{FileReport, FileStatus, RunReport};
use crate::rewrite::{CleanOutcome, Replace, Rewriter};
use crate::utils;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process `targets` in order. In preview mode only detection runs.
///
/// `stop` is polled between files; once set, the current file finishes and
/// the remaining ones are left out of the report.
pub fn run<R: Replace>(
    rewriter: &Rewriter<R>,
    targets: &[PathBuf],
    preview: bool,
    stop: &AtomicBool,
) -> RunReport {
    let mut report = RunReport {
        preview,
        ..RunReport::default()
    };
    for path in targets {
        if stop.load(Ordering::SeqCst) {
            report.interrupted = true;
            break;
        }
        let file = utils::rel_to_wd(path);
        let entry = if preview {
            match rewriter.inspect(path) {
                Ok(issues) => FileReport {
                    file,
                    status: if issues.is_empty() {
                        FileStatus::Clean
                    } else {
                        FileStatus::WouldFix
                    },
                    issues: Some(issues),
                    failure: None,
                    message: None,
                    warnings: Vec::new(),
                },
                Err(e) => failed(file, &e),
            }
        } else {
            match rewriter.clean(path) {
                Ok(CleanOutcome::SkippedClean) => FileReport {
                    file,
                    status: FileStatus::Clean,
                    issues: Some(Default::default()),
                    failure: None,
                    message: None,
                    warnings: Vec::new(),
                },
                Ok(CleanOutcome::Processed { issues, warnings }) => FileReport {
                    file,
                    status: FileStatus::Fixed,
                    issues: Some(issues),
                    failure: None,
                    message: None,
                    warnings: warnings.iter().map(|w| w.to_string()).collect(),
                },
                Err(e) => failed(file, &e),
            }
        };
        report.summary.record(&entry);
        report.results.push(entry);
    }
    report
}

fn failed(file: String, err: &crate::error::CleanError) -> FileReport {
    FileReport {
        file,
        status: FileStatus::Failed,
        issues: None,
        failure: Some(err.kind()),
        message: Some(err.to_string()),
        warnings: Vec::new(),
    }
}
