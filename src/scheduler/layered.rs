//! Parallel layered schedule: a topological order over the dependence graph
//! where every merge group is scheduled as a single atomic unit (its
//! members are always emitted together, as one fused call), non-call
//! statements are flushed one at a time as soon as they're ready, and every
//! batch of calls that becomes ready at once is grouped into one layer
//! meant to run in parallel.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::base::NodeId;
use crate::dependence::graph::DependenceGraph;

/// One schedulable unit: a lone node, or the full membership of a merge
/// group when the node belongs to one.
type Unit = Vec<NodeId>;

fn collect_units(graph: &DependenceGraph) -> Vec<Unit> {
    let mut ids: Vec<NodeId> = graph.nodes().iter().map(|n| n.id).collect();
    ids.sort();

    let mut seen_canonical = FxHashSet::default();
    let mut units = Vec::new();
    for id in ids {
        let unit = match graph.node(id).group() {
            Some(gid) => {
                let mut members: Unit = graph.group(gid).members.iter().copied().collect();
                members.sort();
                members
            }
            None => vec![id],
        };
        if seen_canonical.insert(unit[0]) {
            units.push(unit);
        }
    }
    units
}

fn is_ready(graph: &DependenceGraph, unit: &[NodeId], visited: &FxHashSet<NodeId>) -> bool {
    unit.iter().all(|&n| {
        graph
            .node(n)
            .predecessors
            .keys()
            .all(|p| unit.contains(p) || visited.contains(p))
    })
}

fn is_call_unit(graph: &DependenceGraph, unit: &[NodeId]) -> bool {
    unit.iter().any(|&n| graph.node(n).is_call)
}

/// Builds the layered schedule: a sequence of layers, each either a single
/// non-call statement or a batch of call units ready to run in parallel.
pub fn parallel_schedule(graph: &DependenceGraph) -> Vec<Vec<NodeId>> {
    let units = collect_units(graph);
    let mut visited: FxHashSet<NodeId> = FxHashSet::default();
    let mut order: Vec<Vec<NodeId>> = Vec::new();

    let mut ready: VecDeque<Unit> = units
        .iter()
        .filter(|u| is_ready(graph, u, &visited))
        .cloned()
        .collect();

    while !ready.is_empty() {
        let mut pending_calls: Vec<Unit> = Vec::new();

        while let Some(unit) = ready.pop_front() {
            if is_call_unit(graph, &unit) {
                pending_calls.push(unit);
                continue;
            }
            order.push(unit.clone());
            visited.extend(unit.iter().copied());
            newly_ready(graph, &units, &visited, &ready, &pending_calls)
                .into_iter()
                .for_each(|u| ready.push_back(u));
        }

        if pending_calls.is_empty() {
            continue;
        }

        let parallel_layer: Vec<NodeId> = pending_calls.iter().flatten().copied().collect();
        visited.extend(parallel_layer.iter().copied());
        order.push(parallel_layer);

        newly_ready(graph, &units, &visited, &ready, &[])
            .into_iter()
            .for_each(|u| ready.push_back(u));
    }

    order
}

fn newly_ready(
    graph: &DependenceGraph,
    units: &[Unit],
    visited: &FxHashSet<NodeId>,
    already_ready: &VecDeque<Unit>,
    already_pending: &[Unit],
) -> Vec<Unit> {
    units
        .iter()
        .filter(|u| !visited.contains(&u[0]))
        .filter(|u| !already_ready.contains(u) && !already_pending.contains(u))
        .filter(|u| is_ready(graph, u, visited))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{IStr, TraversalId};
    use crate::dependence::graph::DependenceKind;

    fn call_node(graph: &mut DependenceGraph, traversal: u32) -> NodeId {
        graph.create_node(
            TraversalId::new(traversal),
            0,
            Some(IStr::from("left")),
            Some(IStr::from("visit")),
            true,
        )
    }

    fn plain_node(graph: &mut DependenceGraph, traversal: u32) -> NodeId {
        graph.create_node(TraversalId::new(traversal), 1, None, None, false)
    }

    #[test]
    fn independent_calls_share_one_parallel_layer() {
        let mut graph = DependenceGraph::new();
        let a = call_node(&mut graph, 0);
        let b = call_node(&mut graph, 1);

        let order = parallel_schedule(&graph);
        assert_eq!(order.len(), 1);
        let mut layer = order[0].clone();
        layer.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(layer, expected);
    }

    #[test]
    fn a_merged_group_is_scheduled_as_one_layer() {
        let mut graph = DependenceGraph::new();
        let a = call_node(&mut graph, 0);
        let b = call_node(&mut graph, 1);
        graph.merge(a, b);

        let order = parallel_schedule(&graph);
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].len(), 2);
    }

    #[test]
    fn a_control_dependency_forces_separate_layers() {
        let mut graph = DependenceGraph::new();
        let first = plain_node(&mut graph, 0);
        let second = plain_node(&mut graph, 0);
        graph.add_dependency(DependenceKind::Control, first, second);

        let order = parallel_schedule(&graph);
        assert_eq!(order, vec![vec![first], vec![second]]);
    }

    #[test]
    fn a_call_waits_for_its_predecessor_statement() {
        let mut graph = DependenceGraph::new();
        let setup = plain_node(&mut graph, 0);
        let call = call_node(&mut graph, 0);
        graph.add_dependency(DependenceKind::Control, setup, call);

        let order = parallel_schedule(&graph);
        assert_eq!(order, vec![vec![setup], vec![call]]);
    }
}
