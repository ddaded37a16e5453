//! Statement IR. A tagged variant: the synthesizer's statement-printer is a
//! total match on this enum, with no open inheritance to extend.

use crate::base::IStr;
use crate::ir::expr::Expr;
use crate::ir::path::AccessPath;

/// How a call statement was written: a free function taking the traversed
/// node as its first argument, or a method call on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallForm {
    Free,
    Member,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallStmt {
    pub callee: IStr,
    pub form: CallForm,
    /// The access path naming the traversed child, i.e. the receiver
    /// (member call) or first argument (free call). `None` for a
    /// strict-annotated call whose effects are opaque.
    pub child: Option<AccessPath>,
    /// Remaining arguments, each itself an access path read.
    pub extra_args: Vec<AccessPath>,
    /// Present when this call's effects are declared via an annotation
    /// rather than inferred from its body ("strict-annotated").
    pub strict_annotation: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Call(CallStmt),
    /// An ordinary write: `target = value`.
    Assign { target: AccessPath, value: Expr },
    /// A destructive on-tree mutation; replaces are always on-tree.
    Replace { target: AccessPath, value: Expr },
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },
    Decl {
        name: IStr,
        init: Option<Expr>,
    },
    Return(Option<Expr>),
    /// `x += 1` / `x++`, as produced by a surface grammar; see
    /// [`crate::ir::desugar`] for the lowering into plain assignment.
    Increment(AccessPath),
    Block(Vec<Stmt>),
    Expr(Expr),
}

impl Stmt {
    pub fn is_call(&self) -> bool {
        matches!(self, Stmt::Call(_))
    }

    pub fn as_call(&self) -> Option<&CallStmt> {
        match self {
            Stmt::Call(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: IStr,
    pub type_name: Option<IStr>,
}

impl Param {
    pub fn new(name: impl Into<IStr>, type_name: impl Into<IStr>) -> Self {
        Self {
            name: name.into(),
            type_name: Some(type_name.into()),
        }
    }
}

/// A traversal function: a function that visits one tree node and recurses
/// on its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: IStr,
    /// Record this is a method of, if it is a member/virtual function.
    pub owner_record: Option<IStr>,
    pub is_virtual: bool,
    /// Parameters excluding the implicit receiver for member functions.
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

impl Function {
    pub fn statements(&self) -> &[Stmt] {
        &self.body
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: IStr,
    pub type_name: IStr,
}

/// A user-defined record type: input to the record analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: IStr,
    pub fields: Vec<Field>,
    pub base: Option<IStr>,
}
