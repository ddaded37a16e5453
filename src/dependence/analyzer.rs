//! Builds a [`DependenceGraph`] for one fusion candidate: one node per
//! top-level statement of each participating call's callee body, `Control`
//! edges for program order within an instance, and `Global`/`Local`/
//! `OnTree`/`OnTreeFusable` edges for every footprint conflict across
//! instances.

use rustc_hash::FxHashMap;

use crate::base::{FunctionId, NodeId, TraversalId};
use crate::candidates::Candidate;
use crate::dependence::graph::{DependenceGraph, DependenceKind};
use crate::fsm::SymbolTable;
use crate::functions::{FunctionAnalysis, FunctionAnalyzer, StmtInfo};
use crate::ir::Stmt;
use crate::records::RecordAnalyzer;
use crate::statement_info::{ExtendedFootprint, StatementInfoCache};

struct Instance {
    nodes: Vec<NodeId>,
    called_children: Vec<Option<crate::base::IStr>>,
    footprints: Vec<ExtendedFootprint>,
}

/// The source statement and (if it's a call) resolved callee behind one
/// dependence-graph node — kept alongside the graph itself so the
/// synthesizer can walk the schedule back to concrete IR without
/// recomputing the candidate's instances from scratch.
#[derive(Debug, Clone)]
pub struct NodeStatement {
    pub stmt: Stmt,
    pub callee: Option<FunctionId>,
}

/// A built dependence graph plus the per-node statement data the
/// synthesizer needs to turn a schedule back into emitted code.
#[derive(Debug)]
pub struct DependenceAnalysis {
    pub graph: DependenceGraph,
    pub statements: FxHashMap<NodeId, NodeStatement>,
}

/// Builds the dependence graph for one candidate's participating calls.
///
/// Virtual calls are resolved to their statically declared callee's body
/// rather than widened per derived override here — [`StatementInfoCache`]
/// already folds every override's effects into the footprint used for
/// conflict detection, so the simplification only affects which concrete
/// statements get their own graph nodes (and therefore which statements the
/// scheduler can independently reorder within one instance).
pub fn build_dependence_graph(
    candidate: &Candidate,
    host: &FunctionAnalysis,
    functions: &FunctionAnalyzer,
    records: &RecordAnalyzer,
    table: &mut SymbolTable,
    cache: &mut StatementInfoCache,
) -> DependenceAnalysis {
    let mut graph = DependenceGraph::new();
    let mut statements = FxHashMap::default();
    let mut instances = Vec::with_capacity(candidate.stmt_indices.len());

    for (instance_idx, &stmt_idx) in candidate.stmt_indices.iter().enumerate() {
        let call = host.stmts[stmt_idx]
            .as_call()
            .expect("candidate indices always name call statements");
        let callee_id = functions
            .find(&call.callee)
            .expect("candidate finder only admits calls to a known, fusable callee");
        let callee_analysis = functions.analysis(callee_id);
        let traversal_id = TraversalId::new(instance_idx);

        let mut nodes = Vec::with_capacity(callee_analysis.stmts.len());
        let mut called_children = Vec::with_capacity(callee_analysis.stmts.len());
        let mut footprints = Vec::with_capacity(callee_analysis.stmts.len());
        for (stmt_pos, stmt_info) in callee_analysis.stmts.iter().enumerate() {
            let called_child = called_child_of(stmt_info);
            let callee_name = stmt_info.as_call().map(|c| c.callee.clone());
            let resolved_callee = stmt_info.as_call().and_then(|c| functions.find(&c.callee));
            let node_id = graph.create_node(
                traversal_id,
                stmt_pos,
                called_child.clone(),
                callee_name,
                stmt_info.is_call,
            );
            let fp = cache.statement_footprint(stmt_info, functions, records, table);
            statements.insert(
                node_id,
                NodeStatement {
                    stmt: stmt_info.stmt.clone(),
                    callee: resolved_callee,
                },
            );
            nodes.push(node_id);
            called_children.push(called_child);
            footprints.push(fp);
        }

        for pair in nodes.windows(2) {
            graph.add_dependency(DependenceKind::Control, pair[0], pair[1]);
        }

        instances.push(Instance {
            nodes,
            called_children,
            footprints,
        });
        link_intra_instance(&mut graph, instances.last().unwrap());
    }

    for earlier in 0..instances.len() {
        for later in (earlier + 1)..instances.len() {
            link_cross_instance(&mut graph, &instances[earlier], &instances[later]);
        }
    }

    DependenceAnalysis { graph, statements }
}

/// Adds a `Global`/`Local`/`OnTree` edge for every conflicting pair of
/// statements *within* one callee body, not just adjacent ones — a local
/// variable written at statement 1 and read again at statement 3 still
/// needs an edge even though `Control` edges only chain adjacent
/// statements. Conflicts here are always a plain `OnTree`, never
/// `OnTreeFusable`: that distinction only applies to two separate calls
/// through the same child field, and these are two statements inside a
/// single call's own body.
fn link_intra_instance(graph: &mut DependenceGraph, instance: &Instance) {
    for i in 0..instance.nodes.len() {
        for j in (i + 1)..instance.nodes.len() {
            let conflicts = instance.footprints[i].conflicts_with(&instance.footprints[j]);
            if conflicts.global {
                graph.add_dependency(DependenceKind::Global, instance.nodes[i], instance.nodes[j]);
            }
            if conflicts.local {
                graph.add_dependency(DependenceKind::Local, instance.nodes[i], instance.nodes[j]);
            }
            if conflicts.on_tree {
                graph.add_dependency(DependenceKind::OnTree, instance.nodes[i], instance.nodes[j]);
            }
        }
    }
}

fn called_child_of(stmt_info: &StmtInfo) -> Option<crate::base::IStr> {
    stmt_info
        .as_call()
        .and_then(|call| call.child.as_ref())
        .and_then(|path| path.called_child())
        .cloned()
}

/// Adds one edge, directed from the earlier instance's node to the later
/// instance's node, for every footprint conflict between two instances'
/// statements. Direction is otherwise arbitrary between two fused calls
/// that had no prior ordering of their own — instance declaration order
/// gives the scheduler a stable, deterministic DAG to work from.
///
/// A `Local` conflict only ever holds between statements of the *same*
/// traversal instance — two different instances are two different stack
/// frames, so a shared local-variable name between them can never alias.
/// `earlier` and `later` are always distinct instances here (the caller
/// only ever pairs different indices), so this branch can never actually
/// fire; the instance-id check documents that invariant rather than
/// relying on it implicitly. Same-instance local conflicts are instead
/// caught by [`link_intra_instance`].
///
/// An on-tree conflict is only ever `OnTreeFusable` when both conflicting
/// statements are calls through the very same child field — that's the one
/// case where the overlap is an artifact of the two calls walking the same
/// edge rather than a genuine aliasing hazard, so the pair is still safe to
/// co-schedule into one fused callee. Every other on-tree conflict,
/// including two non-calls that happen to both have no called child, stays
/// a plain `OnTree` edge.
fn link_cross_instance(graph: &mut DependenceGraph, earlier: &Instance, later: &Instance) {
    let earlier_iter = earlier.nodes.iter().zip(&earlier.called_children).zip(&earlier.footprints);
    for ((a_node, a_child), a_fp) in earlier_iter {
        let later_iter = later.nodes.iter().zip(&later.called_children).zip(&later.footprints);
        for ((b_node, b_child), b_fp) in later_iter {
            let conflicts = a_fp.conflicts_with(b_fp);
            if conflicts.global {
                graph.add_dependency(DependenceKind::Global, *a_node, *b_node);
            }
            if conflicts.local && graph.node(*a_node).traversal_id == graph.node(*b_node).traversal_id {
                graph.add_dependency(DependenceKind::Local, *a_node, *b_node);
            }
            if conflicts.on_tree {
                let same_called_child = matches!((a_child, b_child), (Some(x), Some(y)) if x == y);
                let kind = if same_called_child {
                    DependenceKind::OnTreeFusable
                } else {
                    DependenceKind::OnTree
                };
                graph.add_dependency(kind, *a_node, *b_node);
            }
        }
    }
}
