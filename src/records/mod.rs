//! Record classification: tree-edge fields and subtype relations.

pub mod analyzer;

pub use analyzer::{RecordAnalyzer, RecordInfo};
