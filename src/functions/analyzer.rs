//! Function analyzer: per-statement footprints and call recognition, over
//! the top-level statements of a traversal function's body.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::{FunctionId, IStr};
use crate::functions::footprint::{footprint_of, Footprint};
use crate::ir::{Function, Stmt};

/// Analysis of a single top-level statement within a function body.
#[derive(Debug, Clone)]
pub struct StmtInfo {
    pub stmt: Stmt,
    pub footprint: Footprint,
    /// Whether this statement is a recognized call statement and therefore
    /// a candidate for fusion. A statement that isn't a call — an
    /// assignment, a bare `if`, a return — can never be merged with a
    /// neighboring call, and always terminates a run of fusable calls.
    pub is_call: bool,
}

impl StmtInfo {
    pub fn as_call(&self) -> Option<&crate::ir::CallStmt> {
        self.stmt.as_call()
    }
}

#[derive(Debug, Clone)]
pub struct FunctionAnalysis {
    pub id: FunctionId,
    pub name: IStr,
    pub owner_record: Option<IStr>,
    pub is_virtual_flag: bool,
    /// False for a declaration-only stub with no body to analyze, or for a
    /// function whose call graph leads back to itself (directly or through
    /// intermediate callees) — neither can ever be the callee of a fusion
    /// candidate: the first has nothing to synthesize a body from, the
    /// second could never be inlined to a fixed size.
    pub is_valid_for_fuse: bool,
    /// One entry per top-level statement in the function body, in order.
    pub stmts: Vec<StmtInfo>,
}

#[derive(Debug, Default)]
pub struct FunctionAnalyzer {
    analyses: Vec<FunctionAnalysis>,
    by_name: FxHashMap<IStr, FunctionId>,
    /// Methods keyed by `(owning record, method name)`, for resolving one
    /// specific override of a virtual call.
    by_owner_and_name: FxHashMap<(IStr, IStr), FunctionId>,
}

impl FunctionAnalyzer {
    pub fn analyze(functions: &[Function]) -> Self {
        let mut by_name = FxHashMap::default();
        let mut by_owner_and_name = FxHashMap::default();
        let mut analyses = Vec::with_capacity(functions.len());

        // A function's direct callees by name, used below to flag a callee
        // that's only unsafe to fuse through an indirect cycle (A calls B
        // calls A) — direct self-recursion already falls out of this same
        // graph as a one-hop cycle, so it doesn't need its own case.
        let mut callees_of: FxHashMap<IStr, Vec<IStr>> = FxHashMap::default();
        for function in functions {
            let mut callees = Vec::new();
            collect_callees(&function.body, &mut callees);
            callees_of.insert(function.name.clone(), callees);
        }

        for (idx, function) in functions.iter().enumerate() {
            let id = FunctionId::new(idx);
            by_name.insert(function.name.clone(), id);
            if let Some(owner) = &function.owner_record {
                by_owner_and_name.insert((owner.clone(), function.name.clone()), id);
            }
            let stmts = function
                .body
                .iter()
                .map(|stmt| StmtInfo {
                    stmt: stmt.clone(),
                    footprint: footprint_of(stmt),
                    is_call: matches!(stmt, Stmt::Call(_)),
                })
                .collect();

            let is_declaration_only = function.body.is_empty();
            let is_recursive = !is_declaration_only && reaches_itself(&function.name, &callees_of);
            let is_valid_for_fuse = !is_declaration_only && !is_recursive;
            if is_declaration_only {
                tracing::warn!(
                    function = %function.name,
                    id = ?id,
                    "declaration-only function, excluding from fusion"
                );
            } else if is_recursive {
                tracing::warn!(
                    function = %function.name,
                    id = ?id,
                    "indirectly recursive at top level, excluding from fusion"
                );
            }

            analyses.push(FunctionAnalysis {
                id,
                name: function.name.clone(),
                owner_record: function.owner_record.clone(),
                is_virtual_flag: function.is_virtual,
                is_valid_for_fuse,
                stmts,
            });
        }

        Self {
            analyses,
            by_name,
            by_owner_and_name,
        }
    }

    pub fn analysis(&self, id: FunctionId) -> &FunctionAnalysis {
        &self.analyses[id.index()]
    }

    pub fn find(&self, name: &str) -> Option<FunctionId> {
        self.by_name.get(name).copied()
    }

    /// Looks up a specific record's override of a virtual method by name.
    pub fn find_method(&self, owner: &IStr, name: &IStr) -> Option<FunctionId> {
        self.by_owner_and_name
            .get(&(owner.clone(), name.clone()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.analyses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }
}

/// Every callee named by a `Call` statement anywhere in `body`, including
/// inside nested `if` branches — a call doesn't have to be a top-level
/// statement to make its enclosing function recursive.
fn collect_callees(body: &[Stmt], out: &mut Vec<IStr>) {
    for stmt in body {
        match stmt {
            Stmt::Call(call) => out.push(call.callee.clone()),
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                collect_callees(then_branch, out);
                collect_callees(else_branch, out);
            }
            Stmt::Block(stmts) => collect_callees(stmts, out),
            Stmt::Assign { .. }
            | Stmt::Replace { .. }
            | Stmt::Decl { .. }
            | Stmt::Return(_)
            | Stmt::Increment(_)
            | Stmt::Expr(_) => {}
        }
    }
}

/// Whether following `start`'s callees transitively ever leads back to
/// `start` — a direct self-call is caught on the first hop, a mutual cycle
/// through any number of intermediate functions on a later one.
fn reaches_itself(start: &IStr, callees_of: &FxHashMap<IStr, Vec<IStr>>) -> bool {
    let mut stack: Vec<IStr> = callees_of.get(start).cloned().unwrap_or_default();
    let mut seen = FxHashSet::default();
    while let Some(name) = stack.pop() {
        if name == *start {
            return true;
        }
        if !seen.insert(name.clone()) {
            continue;
        }
        if let Some(next) = callees_of.get(&name) {
            stack.extend(next.iter().cloned());
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::IStr;
    use crate::ir::{CallForm, CallStmt, Param};

    fn traversal(name: &str, body: Vec<Stmt>) -> Function {
        Function {
            name: IStr::from(name),
            owner_record: None,
            is_virtual: false,
            params: vec![Param::new("n", "Node*")],
            body,
        }
    }

    #[test]
    fn marks_call_statements() {
        let call = Stmt::Call(CallStmt {
            callee: IStr::from("visit"),
            form: CallForm::Free,
            child: None,
            extra_args: Vec::new(),
            strict_annotation: None,
        });
        let functions = vec![traversal("f", vec![call, Stmt::Return(None)])];
        let analyzer = FunctionAnalyzer::analyze(&functions);
        let info = analyzer.analysis(analyzer.find("f").unwrap());
        assert!(info.stmts[0].is_call);
        assert!(!info.stmts[1].is_call);
    }

    #[test]
    fn declaration_only_function_is_invalid_for_fuse() {
        let functions = vec![traversal("stub", vec![])];
        let analyzer = FunctionAnalyzer::analyze(&functions);
        let info = analyzer.analysis(analyzer.find("stub").unwrap());
        assert!(!info.is_valid_for_fuse);
    }

    fn call_stmt(callee: &str) -> Stmt {
        Stmt::Call(CallStmt {
            callee: IStr::from(callee),
            form: CallForm::Free,
            child: None,
            extra_args: Vec::new(),
            strict_annotation: None,
        })
    }

    #[test]
    fn directly_self_recursive_function_is_invalid_for_fuse() {
        let functions = vec![traversal("visit", vec![call_stmt("visit")])];
        let analyzer = FunctionAnalyzer::analyze(&functions);
        let info = analyzer.analysis(analyzer.find("visit").unwrap());
        assert!(!info.is_valid_for_fuse);
    }

    #[test]
    fn indirectly_recursive_function_is_invalid_for_fuse() {
        let functions = vec![
            traversal("a", vec![call_stmt("b")]),
            traversal("b", vec![call_stmt("a")]),
        ];
        let analyzer = FunctionAnalyzer::analyze(&functions);
        assert!(!analyzer.analysis(analyzer.find("a").unwrap()).is_valid_for_fuse);
        assert!(!analyzer.analysis(analyzer.find("b").unwrap()).is_valid_for_fuse);
    }

    #[test]
    fn non_recursive_function_with_calls_is_valid_for_fuse() {
        let functions = vec![
            traversal("parent", vec![call_stmt("child")]),
            traversal("child", vec![Stmt::Return(None)]),
        ];
        let analyzer = FunctionAnalyzer::analyze(&functions);
        assert!(analyzer.analysis(analyzer.find("parent").unwrap()).is_valid_for_fuse);
        assert!(analyzer.analysis(analyzer.find("child").unwrap()).is_valid_for_fuse);
    }

    #[test]
    fn resolves_per_record_method_overrides() {
        let base = Function {
            name: IStr::from("accept"),
            owner_record: Some(IStr::from("Shape")),
            is_virtual: true,
            params: Vec::new(),
            body: vec![Stmt::Return(None)],
        };
        let derived = Function {
            name: IStr::from("accept"),
            owner_record: Some(IStr::from("Circle")),
            is_virtual: true,
            params: Vec::new(),
            body: vec![Stmt::Return(None)],
        };
        let analyzer = FunctionAnalyzer::analyze(&[base, derived]);
        let circle_accept = analyzer
            .find_method(&IStr::from("Circle"), &IStr::from("accept"))
            .unwrap();
        assert_eq!(
            analyzer.analysis(circle_accept).owner_record,
            Some(IStr::from("Circle"))
        );
    }
}
