//! Turns a layered schedule back into an emitted function body: each
//! schedulable unit becomes one guarded statement — the original call
//! verbatim if it was never merged, a freshly named recursive dispatch if
//! the scheduler fused it with others, or the original non-call statement
//! with any `Return` rewritten into a truncate-flag clear.
//!
//! Ported from the `truncate_flags`/`AdjustedTruncateFlags`/depth-gated
//! dispatch logic in `TraversalSynthesizer::setCallPart`, adapted to the
//! typed IR of [`crate::ir`] instead of string-concatenated source text.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::{FunctionId, IStr, NodeId};
use crate::dependence::analyzer::NodeStatement;
use crate::dependence::graph::DependenceGraph;
use crate::ir::{AccessPath, BinOp, CallForm, CallStmt, Expr, Stmt};
use crate::synth::names::NameRegistry;
use crate::synth::signature::{Variant, DEPTH_PARAM, MAX_DEPTH_PARAM, TRUNCATE_FLAGS_PARAM};

fn truncate_flags_path() -> AccessPath {
    AccessPath::local(IStr::from(TRUNCATE_FLAGS_PARAM), Vec::new(), true)
}

fn guard_expr(bits: u32) -> Expr {
    Expr::binary(
        BinOp::Ne,
        Expr::binary(BinOp::BitAnd, Expr::Path(truncate_flags_path()), Expr::IntLiteral(bits as i64)),
        Expr::IntLiteral(0),
    )
}

fn clear_bit_stmt(bit: u32) -> Stmt {
    let mask = !bit;
    Stmt::Assign {
        target: truncate_flags_path(),
        value: Expr::binary(BinOp::BitAnd, Expr::Path(truncate_flags_path()), Expr::IntLiteral(mask as i64)),
    }
}

/// Replaces every `Return` reachable within a statement (including nested
/// inside `if`/block bodies) with a clear of that traversal's truncate-flag
/// bit — the typed-IR stand-in for the original's `goto exit` plus
/// `truncate_flags &= ...`.
fn rewrite_for_truncate(stmt: &Stmt, bit: u32) -> Stmt {
    match stmt {
        Stmt::Return(_) => clear_bit_stmt(bit),
        Stmt::If { cond, then_branch, else_branch } => Stmt::If {
            cond: cond.clone(),
            then_branch: then_branch.iter().map(|s| rewrite_for_truncate(s, bit)).collect(),
            else_branch: else_branch.iter().map(|s| rewrite_for_truncate(s, bit)).collect(),
        },
        Stmt::Block(stmts) => Stmt::Block(stmts.iter().map(|s| rewrite_for_truncate(s, bit)).collect()),
        other => other.clone(),
    }
}

/// Canonicalizes one schedule layer (possibly several independent units
/// flattened together by [`crate::scheduler::parallel_schedule`]) back into
/// its distinct units: a merge group's full membership, or a lone node.
fn units_within(graph: &DependenceGraph, layer: &[NodeId]) -> Vec<Vec<NodeId>> {
    let mut seen = FxHashSet::default();
    let mut units = Vec::new();
    for &id in layer {
        let key = graph.node(id).group().map(|g| g.index() as i64).unwrap_or(-(id.index() as i64) - 1);
        if !seen.insert(key) {
            continue;
        }
        let unit = match graph.node(id).group() {
            Some(gid) => {
                let mut members: Vec<NodeId> = graph.group(gid).members.iter().copied().collect();
                members.sort();
                members
            }
            None => vec![id],
        };
        units.push(unit);
    }
    units
}

/// Builds one fused function's body — parallel or serial variant — from a
/// layered schedule over `graph`.
pub fn emit_fused_body(
    schedule: &[Vec<NodeId>],
    graph: &DependenceGraph,
    statements: &FxHashMap<NodeId, NodeStatement>,
    names: &mut NameRegistry,
    variant: Variant,
) -> Vec<Stmt> {
    let mut body = Vec::new();
    for layer in schedule {
        for unit in units_within(graph, layer) {
            body.push(emit_unit(&unit, graph, statements, names, variant));
        }
    }
    body
}

fn emit_unit(
    unit: &[NodeId],
    graph: &DependenceGraph,
    statements: &FxHashMap<NodeId, NodeStatement>,
    names: &mut NameRegistry,
    variant: Variant,
) -> Stmt {
    let bits: u32 = unit
        .iter()
        .fold(0, |acc, &n| acc | (1u32 << graph.node(n).traversal_id.index()));

    let is_call_unit = unit.iter().all(|&n| graph.node(n).is_call);
    let inner = if !is_call_unit {
        let n = unit[0];
        vec![rewrite_for_truncate(&statements[&n].stmt, bits)]
    } else if unit.len() == 1 {
        vec![statements[&unit[0]].stmt.clone()]
    } else {
        vec![emit_merged_dispatch(unit, statements, names, variant)]
    };

    Stmt::If {
        cond: guard_expr(bits),
        then_branch: inner,
        else_branch: Vec::new(),
    }
}

/// A merge group of two or more call nodes becomes one dispatch into a
/// freshly named fused function for their combined callees.
fn emit_merged_dispatch(
    unit: &[NodeId],
    statements: &FxHashMap<NodeId, NodeStatement>,
    names: &mut NameRegistry,
    variant: Variant,
) -> Stmt {
    let callees: Vec<FunctionId> = unit.iter().filter_map(|&n| statements[&n].callee).collect();
    let base_name = names.fused_base_name(&callees);
    let shared_child = statements[&unit[0]]
        .stmt
        .as_call()
        .and_then(|c| c.child.clone())
        .expect("merge groups only ever combine call nodes with a concrete child path");
    let truncate_flags_arg = truncate_flags_path();

    match variant {
        Variant::Serial => dispatch_call(&format!("{base_name}_serial"), shared_child, vec![truncate_flags_arg]),
        Variant::Parallel => {
            let depth_path = AccessPath::local(IStr::from(DEPTH_PARAM), Vec::new(), true);
            let max_depth_path = AccessPath::local(IStr::from(MAX_DEPTH_PARAM), Vec::new(), true);
            let next_depth_name: IStr = IStr::from("_depth_next");

            Stmt::If {
                cond: Expr::binary(BinOp::Lt, Expr::Path(depth_path.clone()), Expr::Path(max_depth_path.clone())),
                then_branch: vec![
                    Stmt::Decl {
                        name: next_depth_name.clone(),
                        init: Some(Expr::binary(BinOp::Add, Expr::Path(depth_path), Expr::IntLiteral(1))),
                    },
                    dispatch_call(
                        &format!("{base_name}_parallel"),
                        shared_child.clone(),
                        vec![
                            truncate_flags_arg.clone(),
                            AccessPath::local(next_depth_name, Vec::new(), true),
                            max_depth_path,
                        ],
                    ),
                ],
                else_branch: vec![dispatch_call(&format!("{base_name}_serial"), shared_child, vec![truncate_flags_arg])],
            }
        }
    }
}

fn dispatch_call(callee: &str, child: AccessPath, extra_args: Vec<AccessPath>) -> Stmt {
    Stmt::Call(CallStmt {
        callee: IStr::from(callee),
        form: CallForm::Free,
        child: Some(child),
        extra_args,
        strict_annotation: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::find_candidates;
    use crate::dependence::build_dependence_graph;
    use crate::fsm::SymbolTable;
    use crate::functions::FunctionAnalyzer;
    use crate::ir::{AccessPath as Path, DefaultPrinter, Function, Param, Printer};
    use crate::records::RecordAnalyzer;
    use crate::scheduler::{parallel_schedule, run_greedy_fusion};
    use crate::statement_info::StatementInfoCache;
    use crate::core::FusionConfig;

    fn call_stmt(callee: &str, field: &str) -> Stmt {
        Stmt::Call(CallStmt {
            callee: IStr::from(callee),
            form: CallForm::Free,
            child: Some(Path::on_tree(vec![IStr::from(field)], false)),
            extra_args: Vec::new(),
            strict_annotation: None,
        })
    }

    fn traversal(name: &str, body: Vec<Stmt>) -> Function {
        Function {
            name: IStr::from(name),
            owner_record: None,
            is_virtual: false,
            params: vec![Param::new("n", "Node*")],
            body,
        }
    }

    fn build(functions_src: Vec<Function>) -> (Vec<Vec<Stmt>>, Vec<Vec<Stmt>>) {
        let functions = FunctionAnalyzer::analyze(&functions_src);
        let records = RecordAnalyzer::analyze(&[]);
        let host_analysis = functions.analysis(functions.find("traverse").unwrap());
        let candidates = find_candidates(host_analysis, &functions);
        assert_eq!(candidates.len(), 1);

        let mut table = SymbolTable::new();
        let mut cache = StatementInfoCache::new();
        let mut analysis = build_dependence_graph(
            &candidates[0],
            host_analysis,
            &functions,
            &records,
            &mut table,
            &mut cache,
        );
        run_greedy_fusion(&mut analysis.graph, &FusionConfig::default());
        let schedule = parallel_schedule(&analysis.graph);

        let mut names = NameRegistry::new();
        let parallel = emit_fused_body(&schedule, &analysis.graph, &analysis.statements, &mut names, Variant::Parallel);
        let mut names = NameRegistry::new();
        let serial = emit_fused_body(&schedule, &analysis.graph, &analysis.statements, &mut names, Variant::Serial);
        (vec![parallel], vec![serial])
    }

    #[test]
    fn unmerged_calls_are_emitted_verbatim_behind_their_own_guard() {
        let count_left = traversal(
            "countLeft",
            vec![Stmt::Assign { target: Path::on_tree(vec![IStr::from("leftCount")], false), value: Expr::IntLiteral(1) }],
        );
        let sum_left = traversal(
            "sumLeft",
            vec![Stmt::Assign { target: Path::on_tree(vec![IStr::from("leftSum")], false), value: Expr::IntLiteral(1) }],
        );
        let host = traversal("traverse", vec![call_stmt("countLeft", "left"), call_stmt("sumLeft", "left")]);
        let (parallel, _) = build(vec![count_left, sum_left, host]);

        let rendered = DefaultPrinter.print_block(&parallel[0], 0);
        assert!(rendered.contains("leftCount = 1"));
        assert!(rendered.contains("leftSum = 1"));
        assert!(rendered.contains("truncate_flags & 1"));
        assert!(rendered.contains("truncate_flags & 2"));
    }

    #[test]
    fn merged_call_group_dispatches_to_a_freshly_named_fused_function() {
        let visit_left_a = traversal("visitLeftA", vec![call_stmt("markVisited", "sub")]);
        let visit_left_b = traversal("visitLeftB", vec![call_stmt("markVisited", "sub")]);
        let mark_visited = traversal(
            "markVisited",
            vec![Stmt::Assign { target: Path::on_tree(vec![IStr::from("visited")], false), value: Expr::BoolLiteral(true) }],
        );
        let host = traversal("traverse", vec![call_stmt("visitLeftA", "left"), call_stmt("visitLeftB", "left")]);
        let (parallel, serial) = build(vec![visit_left_a, visit_left_b, mark_visited, host]);

        let parallel_rendered = DefaultPrinter.print_block(&parallel[0], 0);
        assert!(parallel_rendered.contains("_fuse_F"));
        assert!(parallel_rendered.contains("_parallel("));
        assert!(parallel_rendered.contains("depth < max_depth"));

        let serial_rendered = DefaultPrinter.print_block(&serial[0], 0);
        assert!(serial_rendered.contains("_fuse_F"));
        assert!(serial_rendered.contains("_serial("));
        assert!(!serial_rendered.contains("depth"));
    }

    #[test]
    fn early_return_becomes_a_truncate_flag_clear() {
        let returns_early = traversal(
            "returnsEarly",
            vec![Stmt::Return(None)],
        );
        let other = traversal(
            "other",
            vec![Stmt::Assign { target: Path::on_tree(vec![IStr::from("x")], false), value: Expr::IntLiteral(1) }],
        );
        let host = traversal("traverse", vec![call_stmt("returnsEarly", "left"), call_stmt("other", "left")]);
        let (parallel, _) = build(vec![returns_early, other, host]);

        let rendered = DefaultPrinter.print_block(&parallel[0], 0);
        assert!(!rendered.contains("return;"));
        assert!(rendered.contains("truncate_flags = (truncate_flags & "));
    }
}
