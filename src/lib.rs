//! # tree-fuser
//!
//! Source-to-source fusion of consecutive tree-traversal calls into one
//! combined, parallel-friendly traversal.
//!
//! ## Module structure (dependency order)
//!
//! ```text
//! driver         → CLI + per-translation-unit orchestration
//!   ↓
//! synth          → traversal synthesizer (fused bodies, virtual stubs)
//!   ↓
//! scheduler      → greedy fusion, parallel layered schedule
//!   ↓
//! dependence     → dependence graph + analyzer
//!   ↓
//! statement_info → per-statement footprints widened across calls
//!   ↓
//! candidates     → fusable call-run discovery
//!   ↓
//! functions, records → per-function/per-record analysis
//!   ↓
//! fsm            → finite-state representation of access paths
//!   ↓
//! ir             → typed statement/expression IR, black-box printer
//!   ↓
//! core           → config, errors, text utilities
//!   ↓
//! base           → arena ids, string interning, spans
//! ```

/// Foundation types: arena ids, string interning, spans.
pub mod base;

/// Planner configuration, error types, small text utilities.
pub mod core;

/// Typed input IR standing in for an external parser/AST layer.
pub mod ir;

/// Record classification: tree-edge fields and subtype relations.
pub mod records;

/// Per-function, per-statement footprint analysis.
pub mod functions;

/// Finite-state representation of access paths.
pub mod fsm;

/// Fusable call-run discovery.
pub mod candidates;

/// Per-statement footprints widened across callee bodies.
pub mod statement_info;

/// The dependence graph and the analysis that builds one.
pub mod dependence;

/// Greedy fusion and parallel layered scheduling.
pub mod scheduler;

/// Traversal synthesizer: fused bodies and virtual-dispatch stubs.
pub mod synth;

/// CLI parsing and per-translation-unit orchestration.
pub mod driver;

pub use core::{FusionConfig, Heuristic};
