//! The dependence graph: the arena-backed data structure ([`graph`]) plus
//! the analysis that populates one from a fusion candidate ([`analyzer`]).

pub mod analyzer;
pub mod graph;

pub use analyzer::{build_dependence_graph, DependenceAnalysis, NodeStatement};
pub use graph::{DependenceGraph, DependenceKind, Edge, MergeGroup, Node};
