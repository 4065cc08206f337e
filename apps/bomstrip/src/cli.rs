//! CLI argument parsing via `clap`.

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bomstrip",
    version,
    about = "Strip UTF-8 BOMs and CRLF line endings in place",
    long_about = "bomstrip — scan a tree or a list of files for a leading UTF-8 byte-order mark and Windows CRLF line endings, and rewrite affected files atomically.\n\nUntouched files stay byte-identical. Rewritten files keep their owner, group, mode and modification time.",
    after_help = "Examples:\n  bomstrip fix src/\n  bomstrip fix --ext php,inc --exclude vendor .\n  bomstrip scan --check --output json .\n  bomstrip sweep --run 4242",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current bomstrip version.")]
    Version,
    /// Rewrite files in place
    #[command(
        about = "Remove BOMs and CRLF line endings",
        long_about = "Detect a leading BOM and CRLF in the first 1024 bytes of each candidate; rewrite flagged files through a scratch file and an atomic rename. With --dry-run nothing is written.",
        after_help = "Examples:\n  bomstrip fix .\n  bomstrip fix --dry-run --verbose public/ index.php"
    )]
    Fix {
        #[command(flatten)]
        targets: TargetArgs,
        #[command(flatten)]
        report: ReportArgs,
        #[arg(long, help = "Directory for scratch and backup files (default: system temp dir)")]
        temp_dir: Option<String>,
        #[arg(long, short = 'n', action = clap::ArgAction::SetTrue, help = "Preview only; do not modify files")]
        dry_run: bool,
    },
    /// Report files that would change
    #[command(
        about = "Preview files with a BOM or CRLF",
        long_about = "Run detection only and list files that would be rewritten. Never modifies anything.",
        after_help = "Examples:\n  bomstrip scan .\n  bomstrip scan --check src/"
    )]
    Scan {
        #[command(flatten)]
        targets: TargetArgs,
        #[command(flatten)]
        report: ReportArgs,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if any file would change")]
        check: bool,
    },
    /// Remove leftover scratch and backup files
    #[command(
        about = "Remove leftover artifacts",
        long_about = "Delete bomstrip-<run>-*.tmp and *.bak files left in the scratch area by an interrupted run. Given PATHS, also delete hidden .bomstrip-<run>-*.swap staging files left beside the targets.",
        after_help = "Examples:\n  bomstrip sweep\n  bomstrip sweep --run 4242 src/"
    )]
    Sweep {
        #[arg(help = "Trees to search for staging files left beside targets")]
        paths: Vec<String>,
        #[arg(long, help = "Scratch directory to sweep (default: system temp dir)")]
        temp_dir: Option<String>,
        #[arg(long, help = "Only remove artifacts of this run id")]
        run: Option<u32>,
        #[arg(long, value_parser = ["human", "json"], help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}

#[derive(Args, Debug, Clone, Default)]
/// Which files to look at.
pub struct TargetArgs {
    #[arg(help = "Files or directories to process (default: .)")]
    pub paths: Vec<String>,
    #[arg(long, short = 'e', help = "Comma-separated extensions searched in directories (repeatable)")]
    pub ext: Vec<String>,
    #[arg(long, help = "Directory name to skip while searching (repeatable)")]
    pub exclude: Vec<String>,
    #[arg(long, value_parser = crate::config::parse_size, help = "Skip files larger than this (bytes, or with K/M/G suffix; default 100M)")]
    pub max_size: Option<u64>,
}

#[derive(Args, Debug, Clone, Default)]
/// How results are reported.
pub struct ReportArgs {
    #[arg(long, value_parser = ["human", "json"], help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, short = 'v', action = clap::ArgAction::SetTrue, help = "Also list clean files")]
    pub verbose: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Disable colored output")]
    pub no_color: bool,
}
