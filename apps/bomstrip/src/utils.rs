//! Diagnostic prefixes and path display helpers.

use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

static COLOR: AtomicBool = AtomicBool::new(true);

/// Enable or disable colored prefixes for the rest of the process.
pub fn set_color(enabled: bool) {
    COLOR.store(enabled, Ordering::Relaxed);
}

fn color() -> bool {
    COLOR.load(Ordering::Relaxed) && std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if color() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn warn_prefix() -> String {
    if color() {
        "warn:".yellow().bold().to_string()
    } else {
        "warn:".to_string()
    }
}

pub fn note_prefix() -> String {
    if color() {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

pub fn info_prefix() -> String {
    if color() {
        "info:".blue().bold().to_string()
    } else {
        "info:".to_string()
    }
}

/// Render `p` relative to the working directory when it lies below it.
pub fn rel_to_wd(p: &Path) -> String {
    let rel = std::env::current_dir()
        .ok()
        .and_then(|wd| {
            if p.is_absolute() && p.starts_with(&wd) {
                pathdiff::diff_paths(p, &wd)
            } else {
                None
            }
        });
    match rel {
        Some(r) if !r.as_os_str().is_empty() => r.to_string_lossy().to_string(),
        _ => p.to_string_lossy().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_prefixes_without_color() {
        set_color(false);
        assert_eq!(error_prefix(), "error:");
        assert_eq!(warn_prefix(), "warn:");
        assert_eq!(note_prefix(), "note:");
        assert_eq!(info_prefix(), "info:");
    }

    #[test]
    fn rel_to_wd_shortens_paths_under_cwd() {
        let wd = std::env::current_dir().unwrap();
        assert_eq!(rel_to_wd(&wd.join("src").join("a.php")), format!("src{}a.php", std::path::MAIN_SEPARATOR));
        assert_eq!(rel_to_wd(Path::new("relative/x.txt")), "relative/x.txt");
    }
}
