//! Output rendering for fix, scan and sweep.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-file fields and a top-level summary. Failures and attribute warnings
//! are also logged to stderr with their prefixes in human mode.

use crate::models::{FileReport, FileStatus, RunReport, Summary};
use crate::utils;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::PathBuf;

/// Print a run report in the requested format.
pub fn print_run(report: &RunReport, output: &str, verbose: bool, color: bool) {
    match output {
        "json" => println!("{}", to_pretty(&compose_run_json(report))),
        _ => {
            for r in &report.results {
                print_file_line(r, verbose, color);
                for w in &r.warnings {
                    eprintln!("{} {}", utils::warn_prefix(), w);
                }
            }
            let summary = summary_line(&report.summary, report.preview);
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
            let breakdown = failure_breakdown(&report.summary);
            if !breakdown.is_empty() {
                eprintln!("{} failures: {}", utils::error_prefix(), breakdown);
            }
            if report.interrupted {
                eprintln!(
                    "{} interrupted; remaining files were not processed",
                    utils::note_prefix()
                );
            }
        }
    }
}

fn print_file_line(r: &FileReport, verbose: bool, color: bool) {
    let issues = r.issues.map(|i| i.as_str()).unwrap_or("-");
    match r.status {
        FileStatus::Fixed => {
            if color {
                println!("{} {} ({})", "✏️  fixed:".green().bold(), r.file.bold(), issues);
            } else {
                println!("✏️  fixed: {} ({})", r.file, issues);
            }
        }
        FileStatus::WouldFix => {
            if color {
                println!("{} {} ({})", "--- would fix:".cyan().bold(), r.file.bold(), issues);
            } else {
                println!("--- would fix: {} ({})", r.file, issues);
            }
        }
        FileStatus::Clean => {
            if verbose {
                if color {
                    println!("{} {}", "no changes:".bright_black(), r.file);
                } else {
                    println!("no changes: {}", r.file);
                }
            }
        }
        FileStatus::Failed => {
            let kind = r.failure.map(|k| k.as_str()).unwrap_or("failed");
            let msg = r.message.as_deref().unwrap_or("");
            eprintln!("{} [{}] {}", utils::error_prefix(), kind, msg);
        }
    }
}

fn summary_line(s: &Summary, preview: bool) -> String {
    if preview {
        format!(
            "— Summary — files={} would_fix={} clean={} failed={}",
            s.files, s.would_fix, s.clean, s.failed
        )
    } else {
        format!(
            "— Summary — files={} fixed={} (bom={} crlf={} both={}) clean={} failed={}",
            s.files, s.fixed, s.fixed_bom, s.fixed_crlf, s.fixed_both, s.clean, s.failed
        )
    }
}

fn failure_breakdown(s: &Summary) -> String {
    s.failures
        .iter()
        .map(|(k, n)| format!("{}={}", k, n))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Print the paths removed by a sweep.
pub fn print_sweep(removed: &[PathBuf], output: &str) {
    match output {
        "json" => println!("{}", to_pretty(&compose_sweep_json(removed))),
        _ => {
            for p in removed {
                println!("removed: {}", p.to_string_lossy());
            }
            println!("— Summary — removed={}", removed.len());
        }
    }
}

/// Compose run JSON object (pure) for testing purposes.
pub fn compose_run_json(report: &RunReport) -> JsonVal {
    serde_json::to_value(report).unwrap_or(JsonVal::Null)
}

/// Compose sweep JSON object (pure) for testing purposes.
pub fn compose_sweep_json(removed: &[PathBuf]) -> JsonVal {
    let items: Vec<_> = removed.iter().map(|p| p.to_string_lossy()).collect();
    json!({"removed": items, "summary": {"removed": removed.len()}})
}

fn to_pretty(v: &JsonVal) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::IssueSet;
    use crate::error::FailureKind;

    fn sample() -> RunReport {
        let mut report = RunReport::default();
        for r in [
            FileReport {
                file: "a.php".into(),
                status: FileStatus::Fixed,
                issues: Some(IssueSet { bom: true, crlf: true }),
                failure: None,
                message: None,
                warnings: vec!["could not restore owner on a.php: denied".into()],
            },
            FileReport {
                file: "big.sql".into(),
                status: FileStatus::Failed,
                issues: None,
                failure: Some(FailureKind::TooLarge),
                message: Some("file too large".into()),
                warnings: Vec::new(),
            },
        ] {
            report.summary.record(&r);
            report.results.push(r);
        }
        report
    }

    #[test]
    fn compose_run_json_shape() {
        let out = compose_run_json(&sample());
        assert_eq!(out["results"][0]["status"], "fixed");
        assert_eq!(out["results"][0]["issues"], "bom+crlf");
        assert!(out["results"][0]["failure"].is_null());
        assert_eq!(out["results"][1]["failure"], "too-large");
        assert!(out["results"][1]["issues"].is_null());
        assert_eq!(out["summary"]["fixed_both"], 1);
        assert_eq!(out["summary"]["failures"]["too-large"], 1);
        assert_eq!(out["summary"]["warnings"], 1);
        assert_eq!(out["interrupted"], false);
    }

    #[test]
    fn summary_line_variants() {
        let s = sample().summary;
        assert_eq!(
            summary_line(&s, false),
            "— Summary — files=2 fixed=1 (bom=0 crlf=0 both=1) clean=0 failed=1"
        );
        assert!(summary_line(&s, true).contains("would_fix=0"));
        assert_eq!(failure_breakdown(&s), "too-large=1");
    }

    #[test]
    fn compose_sweep_json_counts() {
        let out = compose_sweep_json(&[PathBuf::from("/tmp/bomstrip-1-a.tmp")]);
        assert_eq!(out["summary"]["removed"], 1);
        assert_eq!(out["removed"][0], "/tmp/bomstrip-1-a.tmp");
    }
}
