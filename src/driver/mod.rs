//! The external-collaborator surface made concrete: CLI argument parsing
//! ([`cli`]) and per-translation-unit orchestration ([`pipeline`]),
//! standing in for `ToolMain.cpp`'s `main` and the `ClangTool` front end it
//! drives.

pub mod cli;
pub mod pipeline;

pub use cli::{parse_args, Args};
pub use pipeline::{run, run_translation_unit, DerivedStub, FusedCandidate, TranslationUnit, TuPlan};
