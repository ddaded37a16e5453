//! Foundation types shared across the whole planner.
//!
//! - [`ids`] - arena index newtypes (`TuId`, `RecordId`, `FunctionId`,
//!   `TraversalId`, `NodeId`, `MergeGroupId`)
//! - [`intern`] - string interning (`Interner`, `IStr`)
//! - [`span`] - source byte ranges, used only by the driver's writeback
//!
//! This module has no dependency on any other `tree_fuser` module.

pub mod ids;
pub mod intern;
pub mod span;

pub use ids::{FunctionId, MergeGroupId, NodeId, RecordId, TraversalId, TuId};
pub use intern::{IStr, Interner};
pub use span::Span;
