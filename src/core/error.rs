//! Error types for the planner and driver: small `thiserror`-derived enums
//! per subsystem, `#[from]` for wrapped I/O, rather than a single catch-all
//! error.

use std::path::PathBuf;

use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised while parsing driver CLI arguments. Raw argument text is
/// kept as a [`SmolStr`] rather than a `String`: these are short, short-lived
/// flag names and values, not interned identifiers shared across a
/// translation unit's graph.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("unknown flag: {0}")]
    UnknownFlag(SmolStr),

    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: &'static str, value: SmolStr },

    #[error("unknown fusion heuristic: {0} (expected \"greedy\" or \"solely-parallel\")")]
    UnknownHeuristic(SmolStr),
}

/// Errors that abort an entire translation unit before any writeback: the
/// run aborts for that unit with no files written.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("translation unit {0} failed to compile")]
    CompileFailed(PathBuf),
}

/// Errors surfaced by the synthesizer for IR shapes it cannot emit: an
/// unreachable-class error, reported per-candidate rather than panicking
/// the whole driver run.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("call statement is neither a free call nor a member call")]
    UnrecognizedCallShape,

    #[error("candidate has no participating callees")]
    EmptyCandidate,

    #[error("virtual dispatch requested but record {0:?} has no derived types")]
    NoDerivedTypes(crate::base::RecordId),
}

/// Top-level error aggregating every stage's error kind, for the driver.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Cli(#[from] CliError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}
