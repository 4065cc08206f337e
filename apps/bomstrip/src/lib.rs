//! bomstrip core library.
//!
//! This crate exposes programmatic APIs for detecting and removing a leading
//! UTF-8 BOM and CRLF line endings from text files, rewriting each file
//! atomically and preserving its owner, group, mode and modification time.
//!
//! High-level modules:
//! - `detect`: Bounded-prefix detection producing an `IssueSet`.
//! - `transform`: Streaming BOM/CRLF removal.
//! - `rewrite`: The atomic single-file `clean` operation with rollback.
//! - `scratch`: Scratch area, per-run artifact naming, preflight and sweep.
//! - `error`: Failure taxonomy and non-fatal attribute warnings.
//! - `discover`: Candidate discovery by extension.
//! - `runner`: Sequential batch driver and statistics.
//! - `models`: Per-file reports and summary structs.
//! - `output`: Human/JSON printers.
//! - `cli`, `config`: Argument parsing and effective settings.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod config;
pub mod detect;
pub mod discover;
pub mod error;
pub mod models;
pub mod output;
pub mod rewrite;
pub mod runner;
pub mod scratch;
pub mod transform;
pub mod utils;

pub use detect::{detect, IssueSet};
pub use error::{AttributeWarning, CleanError, FailureKind, RollbackError, RunError};
pub use rewrite::{CleanOutcome, Rewriter};
pub use scratch::{RunId, ScratchArea};
