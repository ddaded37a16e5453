//! Expression IR. Kept deliberately small: the planner only needs enough of
//! an expression language to classify reads, not a general evaluator.
//! Parsing source text into this IR is out of scope — callers construct
//! `Expr`/`Stmt` values directly.

use crate::ir::path::AccessPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    /// Bitwise and, used by the synthesizer to test and clear truncate-flag
    /// bits; never produced by ordinary traversal bodies.
    BitAnd,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A read of an access path (a field chain, a local, or a global).
    Path(AccessPath),
    IntLiteral(i64),
    BoolLiteral(bool),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Every `AccessPath` read while evaluating this expression, in
    /// left-to-right order.
    pub fn reads(&self) -> Vec<&AccessPath> {
        let mut out = Vec::new();
        self.collect_reads(&mut out);
        out
    }

    fn collect_reads<'a>(&'a self, out: &mut Vec<&'a AccessPath>) {
        match self {
            Expr::Path(p) => out.push(p),
            Expr::IntLiteral(_) | Expr::BoolLiteral(_) => {}
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_reads(out);
                rhs.collect_reads(out);
            }
        }
    }
}
