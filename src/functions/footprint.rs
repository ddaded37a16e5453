//! Per-statement read/write/replace footprints: the raw material the
//! dependence analyzer compares pairwise to decide whether two statements
//! may be fused.

use crate::ir::{AccessPath, Expr, Stmt};

/// The access paths one statement reads, writes, and destructively replaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Footprint {
    pub reads: Vec<AccessPath>,
    pub writes: Vec<AccessPath>,
    pub replaces: Vec<AccessPath>,
}

impl Footprint {
    fn merge(mut self, other: Footprint) -> Self {
        self.reads.extend(other.reads);
        self.writes.extend(other.writes);
        self.replaces.extend(other.replaces);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty() && self.writes.is_empty() && self.replaces.is_empty()
    }
}

/// Computes the footprint of a single statement, recursing into nested
/// blocks and branches but *not* into a call's callee body — extending a
/// call's footprint with its callee's effects is [`crate::statement_info`]'s
/// job, since it requires resolving the callee and may be recursive.
pub fn footprint_of(stmt: &Stmt) -> Footprint {
    match stmt {
        Stmt::Call(call) => {
            let mut reads = Vec::new();
            if let Some(child) = &call.child {
                reads.push(child.clone());
            }
            reads.extend(call.extra_args.iter().cloned());
            // A strict-annotated call declares its effects abstractly rather
            // than exposing a body to analyze; its opaque footprint is
            // folded into every lane downstream (see `classify_into`), but
            // it's recorded here as a read since the call itself only
            // consumes whatever that annotation stands for.
            if let Some(annotation_id) = call.strict_annotation {
                reads.push(AccessPath::strict(annotation_id));
            }
            Footprint {
                reads,
                writes: Vec::new(),
                replaces: Vec::new(),
            }
        }
        Stmt::Assign { target, value } => Footprint {
            reads: reads_of(value),
            writes: vec![target.clone()],
            replaces: Vec::new(),
        },
        Stmt::Replace { target, value } => Footprint {
            reads: reads_of(value),
            writes: Vec::new(),
            replaces: vec![target.clone()],
        },
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            let mut fp = Footprint {
                reads: reads_of(cond),
                writes: Vec::new(),
                replaces: Vec::new(),
            };
            for s in then_branch.iter().chain(else_branch.iter()) {
                fp = fp.merge(footprint_of(s));
            }
            fp
        }
        Stmt::Decl { init, .. } => Footprint {
            reads: init.as_ref().map(reads_of).unwrap_or_default(),
            writes: Vec::new(),
            replaces: Vec::new(),
        },
        Stmt::Return(value) => Footprint {
            reads: value.as_ref().map(reads_of).unwrap_or_default(),
            writes: Vec::new(),
            replaces: Vec::new(),
        },
        Stmt::Increment(target) => Footprint {
            reads: vec![target.clone()],
            writes: vec![target.clone()],
            replaces: Vec::new(),
        },
        Stmt::Block(stmts) => {
            let mut fp = Footprint::default();
            for s in stmts {
                fp = fp.merge(footprint_of(s));
            }
            fp
        }
        Stmt::Expr(expr) => Footprint {
            reads: reads_of(expr),
            writes: Vec::new(),
            replaces: Vec::new(),
        },
    }
}

fn reads_of(expr: &Expr) -> Vec<AccessPath> {
    expr.reads().into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::IStr;
    use crate::ir::{BinOp, CallForm, CallStmt};

    fn path(name: &str) -> AccessPath {
        AccessPath::local(IStr::from(name), vec![], true)
    }

    #[test]
    fn assign_reads_value_writes_target() {
        let stmt = Stmt::Assign {
            target: path("a"),
            value: Expr::binary(BinOp::Add, Expr::Path(path("b")), Expr::IntLiteral(1)),
        };
        let fp = footprint_of(&stmt);
        assert_eq!(fp.writes, vec![path("a")]);
        assert_eq!(fp.reads, vec![path("b")]);
        assert!(fp.replaces.is_empty());
    }

    #[test]
    fn call_reads_child_and_args_writes_nothing() {
        let child = AccessPath::on_tree(vec![IStr::from("left")], false);
        let arg = path("n");
        let stmt = Stmt::Call(CallStmt {
            callee: IStr::from("visit"),
            form: CallForm::Free,
            child: Some(child.clone()),
            extra_args: vec![arg.clone()],
            strict_annotation: None,
        });
        let fp = footprint_of(&stmt);
        assert_eq!(fp.reads, vec![child, arg]);
        assert!(fp.writes.is_empty());
    }

    #[test]
    fn strict_annotated_call_reads_its_opaque_footprint() {
        let child = AccessPath::on_tree(vec![IStr::from("left")], false);
        let stmt = Stmt::Call(CallStmt {
            callee: IStr::from("visit"),
            form: CallForm::Free,
            child: Some(child.clone()),
            extra_args: Vec::new(),
            strict_annotation: Some(7),
        });
        let fp = footprint_of(&stmt);
        assert_eq!(fp.reads, vec![child, AccessPath::strict(7)]);
        assert!(fp.writes.is_empty());
    }

    #[test]
    fn if_merges_branch_footprints() {
        let stmt = Stmt::If {
            cond: Expr::Path(path("c")),
            then_branch: vec![Stmt::Assign {
                target: path("a"),
                value: Expr::IntLiteral(1),
            }],
            else_branch: vec![Stmt::Replace {
                target: path("b"),
                value: Expr::IntLiteral(2),
            }],
        };
        let fp = footprint_of(&stmt);
        assert_eq!(fp.reads, vec![path("c")]);
        assert_eq!(fp.writes, vec![path("a")]);
        assert_eq!(fp.replaces, vec![path("b")]);
    }
}
