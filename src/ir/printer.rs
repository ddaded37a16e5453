//! The AST-printing helper the synthesizer consumes as a black box.
//! `tree_fuser::synth` depends only on the [`Printer`] trait; swapping in a
//! project's real pretty-printer requires no change to the planner.

use crate::ir::expr::Expr;
use crate::ir::path::{AccessPath, PathRoot};
use crate::ir::stmt::{CallForm, Stmt};

/// Renders IR nodes back to a concrete textual form.
///
/// `tree_fuser` ships [`DefaultPrinter`], a minimal C-like renderer adequate
/// for golden-output tests. Production use is expected to supply the host
/// project's real printer.
pub trait Printer {
    fn print_expr(&self, expr: &Expr) -> String;
    fn print_path(&self, path: &AccessPath) -> String;
    fn print_stmt(&self, stmt: &Stmt, indent_level: usize) -> String;

    fn print_block(&self, stmts: &[Stmt], indent_level: usize) -> String {
        stmts
            .iter()
            .map(|s| self.print_stmt(s, indent_level))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A minimal, dependency-free printer used by tests and as a reference
/// implementation of [`Printer`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPrinter;

impl Printer for DefaultPrinter {
    fn print_path(&self, path: &AccessPath) -> String {
        let root = match &path.root {
            PathRoot::TraversalRoot => "_r".to_string(),
            PathRoot::Local(name) => name.to_string(),
            PathRoot::Global(name) => name.to_string(),
        };
        let mut out = root;
        for step in &path.steps {
            out.push_str("->");
            out.push_str(step);
        }
        out
    }

    fn print_expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Path(p) => self.print_path(p),
            Expr::IntLiteral(v) => v.to_string(),
            Expr::BoolLiteral(v) => v.to_string(),
            Expr::Binary { op, lhs, rhs } => format!(
                "({} {} {})",
                self.print_expr(lhs),
                op.symbol(),
                self.print_expr(rhs)
            ),
        }
    }

    fn print_stmt(&self, stmt: &Stmt, indent_level: usize) -> String {
        let pad = "    ".repeat(indent_level);
        let line = match stmt {
            Stmt::Call(c) => {
                let args: Vec<String> = c
                    .extra_args
                    .iter()
                    .map(|a| self.print_path(a))
                    .collect();
                let child = c.child.as_ref().map(|p| self.print_path(p));
                match (c.form, child) {
                    (CallForm::Free, Some(child)) => {
                        let mut all = vec![child];
                        all.extend(args);
                        format!("{}({});", c.callee, all.join(", "))
                    }
                    (CallForm::Member, Some(child)) => {
                        format!("{}->{}({});", child, c.callee, args.join(", "))
                    }
                    (_, None) => format!("{}(/* strict */);", c.callee),
                }
            }
            Stmt::Assign { target, value } => {
                format!("{} = {};", self.print_path(target), self.print_expr(value))
            }
            Stmt::Replace { target, value } => {
                format!(
                    "*{} = {};",
                    self.print_path(target),
                    self.print_expr(value)
                )
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let mut out = format!(
                    "if ({}) {{\n{}\n{pad}}}",
                    self.print_expr(cond),
                    self.print_block(then_branch, indent_level + 1)
                );
                if !else_branch.is_empty() {
                    out.push_str(&format!(
                        " else {{\n{}\n{pad}}}",
                        self.print_block(else_branch, indent_level + 1)
                    ));
                }
                return format!("{pad}{out}");
            }
            Stmt::Decl { name, init } => match init {
                Some(expr) => format!("auto {} = {};", name, self.print_expr(expr)),
                None => format!("auto {};", name),
            },
            Stmt::Return(value) => match value {
                Some(expr) => format!("return {};", self.print_expr(expr)),
                None => "return;".to_string(),
            },
            Stmt::Increment(target) => format!("{}++;", self.print_path(target)),
            Stmt::Block(stmts) => {
                return format!(
                    "{pad}{{\n{}\n{pad}}}",
                    self.print_block(stmts, indent_level + 1)
                );
            }
            Stmt::Expr(expr) => format!("{};", self.print_expr(expr)),
        };
        format!("{pad}{line}")
    }
}
