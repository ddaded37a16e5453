//! Desugaring of increment statements into plain assignment. A convenience
//! a host project's lowering pass might run before handing a translation
//! unit to the fusion planner; nothing in [`crate::records`],
//! [`crate::functions`], [`crate::fsm`], [`crate::dependence`], or
//! [`crate::scheduler`] depends on this module.

use crate::ir::expr::{BinOp, Expr};
use crate::ir::stmt::Stmt;

/// Rewrite `x++` / `x += 1`-shaped statements into a plain assignment
/// `x = x + 1`, recursing into nested blocks.
pub fn desugar_increment(stmt: &Stmt) -> Stmt {
    match stmt {
        Stmt::Increment(target) => Stmt::Assign {
            target: target.clone(),
            value: Expr::binary(BinOp::Add, Expr::Path(target.clone()), Expr::IntLiteral(1)),
        },
        Stmt::Block(stmts) => Stmt::Block(stmts.iter().map(desugar_increment).collect()),
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => Stmt::If {
            cond: cond.clone(),
            then_branch: then_branch.iter().map(desugar_increment).collect(),
            else_branch: else_branch.iter().map(desugar_increment).collect(),
        },
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::IStr;
    use crate::ir::path::AccessPath;

    #[test]
    fn rewrites_increment_to_assignment() {
        let x = AccessPath::local(IStr::from("x"), vec![], true);
        let desugared = desugar_increment(&Stmt::Increment(x.clone()));
        match desugared {
            Stmt::Assign { target, value } => {
                assert_eq!(target, x);
                assert_eq!(
                    value,
                    Expr::binary(BinOp::Add, Expr::Path(x), Expr::IntLiteral(1))
                );
            }
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn recurses_into_nested_blocks() {
        let x = AccessPath::local(IStr::from("x"), vec![], true);
        let block = Stmt::Block(vec![Stmt::Increment(x.clone())]);
        let desugared = desugar_increment(&block);
        match desugared {
            Stmt::Block(stmts) => assert!(matches!(stmts[0], Stmt::Assign { .. })),
            other => panic!("expected Block, got {other:?}"),
        }
    }
}
