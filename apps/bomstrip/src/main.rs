//! bomstrip CLI binary entry point.
//! Delegates to the library for discovery, cleaning and printing.

use bomstrip::cli::{Cli, Commands, ReportArgs, TargetArgs};
use bomstrip::models::RunReport;
use bomstrip::{config, discover, output, runner, scratch, utils};
use bomstrip::{Rewriter, RunId, ScratchArea};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const EXIT_FAILED: i32 = 1;
const EXIT_FATAL: i32 = 2;
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    let cli = Cli::parse();
    let code = match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            0
        }
        Commands::Fix {
            targets,
            report,
            temp_dir,
            dry_run,
        } => run_batch(&targets, &report, temp_dir.as_deref(), dry_run, false),
        Commands::Scan {
            targets,
            report,
            check,
        } => run_batch(&targets, &report, None, true, check),
        Commands::Sweep {
            paths,
            temp_dir,
            run,
            output,
        } => {
            utils::set_color(config::stderr_color(false));
            let dir = config::resolve_temp_dir(temp_dir.as_deref());
            let roots: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
            let run = run.map(RunId);
            let swept = scratch::sweep(&dir, run).and_then(|mut removed| {
                removed.extend(scratch::sweep_staging(&roots, run)?);
                Ok(removed)
            });
            match swept {
                Ok(removed) => {
                    output::print_sweep(&removed, output.as_deref().unwrap_or("human"));
                    0
                }
                Err(e) => {
                    eprintln!("{} {}", utils::error_prefix(), e);
                    EXIT_FATAL
                }
            }
        }
    };
    std::process::exit(code);
}

/// Discover, detect and (unless previewing) clean; returns the exit code.
fn run_batch(
    targets: &TargetArgs,
    report_args: &ReportArgs,
    temp_dir: Option<&str>,
    preview: bool,
    check: bool,
) -> i32 {
    let eff = config::resolve_effective(targets, report_args, temp_dir, preview);
    utils::set_color(eff.stderr_color);

    let area = ScratchArea::new(&eff.temp_dir, RunId::current());
    if !eff.preview {
        // No atomicity guarantee without scratch space; nothing is touched.
        if let Err(e) = area.preflight() {
            eprintln!("{} {}", utils::error_prefix(), e);
            return EXIT_FATAL;
        }
    }

    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        eprintln!(
            "{} cannot install interrupt handler: {}",
            utils::warn_prefix(),
            e
        );
    }

    let found = discover::discover(&eff.paths, &eff.extensions, &eff.excludes);
    for err in &found.errors {
        eprintln!("{} {}", utils::warn_prefix(), err);
    }
    if eff.verbose && eff.output != "json" {
        eprintln!(
            "{} {} candidate file(s), run id {}",
            utils::info_prefix(),
            found.files.len(),
            area.run()
        );
    }

    let rewriter = Rewriter::new(area, eff.max_size);
    let report = runner::run(&rewriter, &found.files, eff.preview, &stop);

    if report.interrupted {
        sweep_own_artifacts(rewriter.scratch(), &eff.paths);
    }
    output::print_run(&report, &eff.output, eff.verbose, eff.color);
    exit_code(&report, check)
}

/// Remove anything this run left in the scratch area or beside its targets
/// after an interrupt.
fn sweep_own_artifacts(area: &ScratchArea, roots: &[PathBuf]) {
    let run = Some(area.run());
    let swept = scratch::sweep(area.dir(), run).and_then(|mut removed| {
        removed.extend(scratch::sweep_staging(roots, run)?);
        Ok(removed)
    });
    match swept {
        Ok(removed) if !removed.is_empty() => eprintln!(
            "{} removed {} leftover artifact(s)",
            utils::note_prefix(),
            removed.len()
        ),
        Ok(_) => {}
        Err(e) => eprintln!("{} {}", utils::warn_prefix(), e),
    }
}

fn exit_code(report: &RunReport, check: bool) -> i32 {
    if report.interrupted {
        EXIT_INTERRUPTED
    } else if report.summary.failed > 0 {
        EXIT_FAILED
    } else if check && report.summary.would_fix > 0 {
        EXIT_FAILED
    } else {
        0
    }
}
