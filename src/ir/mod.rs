//! Typed IR consumed by the planner, standing in for an external
//! parser/AST layer.
//!
//! - [`path`] - `AccessPath`, the unit every footprint is built from
//! - [`expr`] - a small expression language
//! - [`stmt`] - a tagged-variant statement IR, `Function`, `Record`
//! - [`printer`] - the black-box AST-printing helper the synthesizer depends on
//! - [`desugar`] - illustrative, non-core input transformation

pub mod desugar;
pub mod expr;
pub mod path;
pub mod printer;
pub mod stmt;

pub use expr::{BinOp, Expr};
pub use path::{AccessPath, PathKind, PathRoot};
pub use printer::{DefaultPrinter, Printer};
pub use stmt::{CallForm, CallStmt, Field, Function, Param, Record, Stmt};
