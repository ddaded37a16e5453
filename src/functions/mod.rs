//! Per-function, per-statement footprint analysis.

pub mod analyzer;
pub mod footprint;

pub use analyzer::{FunctionAnalysis, FunctionAnalyzer, StmtInfo};
pub use footprint::{footprint_of, Footprint};
