//! Compatibility test between two call statements: whether they could be
//! fused if found next to each other.

use crate::ir::{AccessPath, CallStmt};

/// Two calls are compatible when both resolve to an analyzable function and
/// they descend into the tree through the same field chain — e.g. two
/// consecutive calls both visiting `node->left`.
pub fn are_compatible_calls(
    a: &CallStmt,
    b: &CallStmt,
    is_valid_for_fuse: impl Fn(&str) -> bool,
) -> bool {
    if !is_valid_for_fuse(&a.callee) || !is_valid_for_fuse(&b.callee) {
        return false;
    }
    match (&a.child, &b.child) {
        (Some(child_a), Some(child_b)) => same_shape(child_a, child_b),
        (None, None) => a.strict_annotation == b.strict_annotation,
        _ => false,
    }
}

/// Structural equality of the field chain two access paths select, ignoring
/// the scalar-vs-pointer distinction a single path carries on its own.
fn same_shape(a: &AccessPath, b: &AccessPath) -> bool {
    a.kind == b.kind && a.root == b.root && a.steps == b.steps
}
