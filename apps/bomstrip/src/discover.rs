//! Candidate discovery: explicit files plus recursive extension globs.

use glob::{glob_with, MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "php", "phtml", "inc", "html", "htm", "css", "scss", "js", "mjs", "ts", "json", "xml", "svg",
    "txt", "md", "csv", "ini", "yml", "yaml", "sql", "sh", "py", "twig", "tpl",
];

pub const DEFAULT_EXCLUDES: &[&str] = &[".git", ".svn", ".hg", "node_modules"];

/// Files to process plus non-fatal problems met while walking.
#[derive(Debug, Default)]
pub struct Discovered {
    pub files: Vec<PathBuf>,
    pub errors: Vec<String>,
}

/// Expand `roots` into a sorted, de-duplicated list of candidate files.
///
/// - A file argument is kept as-is, whatever its extension.
/// - A directory is searched for `**/*.<ext>` for every extension.
/// - A missing path is kept so the caller reports it as unreadable.
/// - Symlinks, empty files and anything under an excluded directory name
///   are dropped.
pub fn discover(roots: &[PathBuf], extensions: &[String], excludes: &[String]) -> Discovered {
    let mut out = Discovered::default();
    let mut files = BTreeSet::new();
    let opts = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    for root in roots {
        let meta = match fs::symlink_metadata(root) {
            Ok(m) => m,
            Err(_) => {
                files.insert(root.clone());
                continue;
            }
        };
        if !meta.is_dir() {
            files.insert(root.clone());
            continue;
        }
        let base = Pattern::escape(&root.to_string_lossy());
        for ext in extensions {
            let pattern = format!("{}/**/*.{}", base, Pattern::escape(ext));
            let entries = match glob_with(&pattern, opts) {
                Ok(e) => e,
                Err(e) => {
                    out.errors.push(format!("bad pattern {}: {}", pattern, e));
                    continue;
                }
            };
            for entry in entries {
                match entry {
                    Ok(path) => {
                        if is_candidate(&path) && !is_excluded(root, &path, excludes) {
                            files.insert(path);
                        }
                    }
                    Err(e) => out.errors.push(e.to_string()),
                }
            }
        }
    }
    out.files = files.into_iter().collect();
    out
}

fn is_candidate(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_file() && m.len() > 0)
        .unwrap_or(false)
}

fn is_excluded(root: &Path, path: &Path, excludes: &[String]) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.parent()
        .map(|dirs| {
            dirs.components().any(|c| match c {
                Component::Normal(name) => excludes.iter().any(|x| name == x.as_str()),
                _ => false,
            })
        })
        .unwrap_or(false)
}

/// Normalize `--ext` values: split on commas, trim, drop leading dots.
pub fn parse_extensions(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        for ext in v.split(',') {
            let ext = ext.trim().trim_start_matches('.');
            if !ext.is_empty() && !out.iter().any(|e| e == ext) {
                out.push(ext.to_string());
            }
        }
    }
    out
}
