//! Effective settings resolution.
//!
//! There is no configuration file; CLI flags are merged with the
//! environment and built-in defaults to produce an `Effective` config.
//! Defaults:
//! - `paths`: `.`
//! - `extensions`: `discover::DEFAULT_EXTENSIONS`
//! - `excludes`: `discover::DEFAULT_EXCLUDES` (CLI values are added)
//! - `max_size`: 100 MiB
//! - `temp_dir`: `std::env::temp_dir()` (honors `TMPDIR`)
//! - `output`: `human`
//! - color: on for human output on a terminal unless `--no-color` or
//!   `NO_COLOR` is set; stderr prefixes check stderr instead of stdout
//!
//! Overrides precedence: CLI > environment > defaults.

use crate::cli::{ReportArgs, TargetArgs};
use crate::detect::DEFAULT_MAX_SIZE;
use crate::discover::{self, DEFAULT_EXCLUDES, DEFAULT_EXTENSIONS};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub paths: Vec<PathBuf>,
    pub extensions: Vec<String>,
    pub excludes: Vec<String>,
    pub max_size: u64,
    pub temp_dir: PathBuf,
    pub output: String,
    pub verbose: bool,
    pub color: bool,
    /// Color for the `error:`/`warn:` prefixes written to stderr.
    pub stderr_color: bool,
    pub preview: bool,
}

/// Resolve `Effective` by merging CLI flags, environment, and defaults.
pub fn resolve_effective(
    targets: &TargetArgs,
    report: &ReportArgs,
    cli_temp_dir: Option<&str>,
    preview: bool,
) -> Effective {
    let paths = if targets.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        targets.paths.iter().map(PathBuf::from).collect()
    };

    let extensions = {
        let parsed = discover::parse_extensions(&targets.ext);
        if parsed.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
        } else {
            parsed
        }
    };

    let mut excludes: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
    for x in &targets.exclude {
        if !excludes.contains(x) {
            excludes.push(x.clone());
        }
    }

    let output = report
        .output
        .clone()
        .unwrap_or_else(|| "human".to_string());
    let color = output != "json"
        && !report.no_color
        && std::env::var_os("NO_COLOR").is_none()
        && std::io::stdout().is_terminal();

    Effective {
        paths,
        extensions,
        excludes,
        max_size: targets.max_size.unwrap_or(DEFAULT_MAX_SIZE),
        temp_dir: resolve_temp_dir(cli_temp_dir),
        output,
        verbose: report.verbose,
        color,
        stderr_color: stderr_color(report.no_color),
        preview,
    }
}

/// Whether stderr prefixes may be colored: stderr is a terminal and neither
/// `--no-color` nor `NO_COLOR` is set.
pub fn stderr_color(no_color: bool) -> bool {
    !no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
}

pub fn resolve_temp_dir(cli_temp_dir: Option<&str>) -> PathBuf {
    cli_temp_dir
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

/// Parse a byte count with an optional binary `K`, `M` or `G` suffix
/// (`KiB`/`MiB`/`GiB` and `KB`/`MB`/`GB` are accepted as the same).
pub fn parse_size(s: &str) -> Result<u64, String> {
    let t = s.trim();
    let split = t
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(t.len());
    let (num, unit) = t.split_at(split);
    let n: u64 = num
        .parse()
        .map_err(|_| format!("invalid size '{}'", s))?;
    let mult: u64 = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" | "KIB" => 1024,
        "M" | "MB" | "MIB" => 1024 * 1024,
        "G" | "GB" | "GIB" => 1024 * 1024 * 1024,
        other => return Err(format!("unknown size unit '{}'", other)),
    };
    n.checked_mul(mult)
        .ok_or_else(|| format!("size '{}' is too large", s))
}
