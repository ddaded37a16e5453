//! Greedy fusion: pairwise-merges call nodes that descend through the same
//! field, rolling a merge back the moment it produces a group bigger than
//! the configured cap, a group with too many instances of the same callee,
//! a cycle, or a mix of different called children.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::base::{IStr, MergeGroupId, NodeId};
use crate::core::FusionConfig;
use crate::dependence::graph::DependenceGraph;

/// Runs one greedy fusion pass over every call node in `graph`, mutating it
/// in place. Call nodes are bucketed by the field they call through, in
/// first-seen bucket order (an `IndexMap`, not a `HashMap` — the synthesized
/// name a fused group later gets depends on merge order, which must stay
/// deterministic run to run); within each bucket, every pair is tentatively
/// merged in declaration order and kept only if the merge stays within
/// `config`'s caps and doesn't introduce a cycle or a wrong fuse.
pub fn run_greedy_fusion(graph: &mut DependenceGraph, config: &FusionConfig) {
    let mut by_child: IndexMap<Option<IStr>, Vec<NodeId>> = IndexMap::new();
    for node in graph.nodes() {
        if node.is_call {
            by_child.entry(node.called_child.clone()).or_default().push(node.id);
        }
    }

    for call_nodes in by_child.values() {
        for i in 0..call_nodes.len() {
            if graph.node(call_nodes[i]).is_merged() {
                continue;
            }
            for j in (i + 1)..call_nodes.len() {
                if graph.node(call_nodes[j]).is_merged() {
                    continue;
                }

                graph.merge(call_nodes[i], call_nodes[j]);
                let group_id = graph
                    .node(call_nodes[i])
                    .group()
                    .expect("just merged two nodes");

                let group_size = graph.group(group_id).members.len() as u32;
                if group_size > config.max_merged_nodes
                    || exceeds_max_merged_instances(graph, group_id, config.max_merged_instances)
                    || graph.has_cycle()
                    || graph.has_wrong_fuse()
                {
                    tracing::debug!(
                        a = ?call_nodes[i],
                        b = ?call_nodes[j],
                        group_size,
                        "rolling back merge"
                    );
                    graph.unmerge(call_nodes[j]);
                } else {
                    tracing::trace!(a = ?call_nodes[i], b = ?call_nodes[j], "merged");
                }
            }
        }
    }

    debug_assert!(
        !graph.has_illegal_merge(),
        "greedy fusion must never leave the graph in an illegal merge state"
    );
}

/// Whether any callee within the group already occurs more than `cap` times.
fn exceeds_max_merged_instances(graph: &DependenceGraph, group_id: MergeGroupId, cap: u32) -> bool {
    let mut counts: FxHashMap<Option<IStr>, u32> = FxHashMap::default();
    for member in &graph.group(group_id).members {
        let callee = graph.node(*member).callee.clone();
        let count = counts.entry(callee).or_insert(0);
        *count += 1;
        if *count > cap {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TraversalId;
    use crate::core::Heuristic;

    fn node(graph: &mut DependenceGraph, traversal: u32, child: &str, callee: &str) -> NodeId {
        graph.create_node(
            TraversalId::new(traversal),
            0,
            Some(IStr::from(child)),
            Some(IStr::from(callee)),
            true,
        )
    }

    fn config(max_merged_nodes: u32, max_merged_instances: u32) -> FusionConfig {
        FusionConfig {
            max_merged_nodes,
            max_merged_instances,
            heuristic: Heuristic::Greedy,
            max_recursion_depth: 1024,
        }
    }

    #[test]
    fn merges_every_call_through_the_same_child() {
        let mut graph = DependenceGraph::new();
        let a = node(&mut graph, 0, "left", "countLeft");
        let b = node(&mut graph, 1, "left", "sumLeft");
        let c = node(&mut graph, 2, "left", "maxLeft");
        run_greedy_fusion(&mut graph, &config(5, 5));

        let gid = graph.node(a).group().unwrap();
        assert_eq!(graph.group(gid).members.len(), 3);
        assert_eq!(graph.node(b).group(), Some(gid));
        assert_eq!(graph.node(c).group(), Some(gid));
    }

    #[test]
    fn never_merges_calls_through_different_children() {
        let mut graph = DependenceGraph::new();
        let a = node(&mut graph, 0, "left", "countLeft");
        let b = node(&mut graph, 1, "right", "countRight");
        run_greedy_fusion(&mut graph, &config(5, 5));
        assert!(!graph.node(a).is_merged());
        assert!(!graph.node(b).is_merged());
    }

    #[test]
    fn rolls_back_once_max_merged_nodes_is_exceeded() {
        let mut graph = DependenceGraph::new();
        let mut ids = Vec::new();
        for i in 0..4 {
            ids.push(node(&mut graph, i, "left", "visit"));
        }
        run_greedy_fusion(&mut graph, &config(2, 5));

        let group_sizes: Vec<usize> = ids
            .iter()
            .filter_map(|id| graph.node(*id).group())
            .map(|gid| graph.group(gid).members.len())
            .collect();
        assert!(group_sizes.iter().all(|&size| size <= 2));
    }

    #[test]
    fn rolls_back_once_max_merged_instances_of_same_callee_is_exceeded() {
        let mut graph = DependenceGraph::new();
        let a = node(&mut graph, 0, "left", "visit");
        let b = node(&mut graph, 1, "left", "visit");
        let c = node(&mut graph, 2, "left", "visit");
        run_greedy_fusion(&mut graph, &config(5, 1));

        // Cap of 1 instance of "visit" per group: no two "visit" calls
        // should ever end up merged together.
        if let (Some(ga), Some(gb)) = (graph.node(a).group(), graph.node(b).group()) {
            assert_ne!(ga, gb);
        }
        let _ = c;
    }

    #[test]
    fn never_merges_across_a_cycle() {
        let mut graph = DependenceGraph::new();
        let a = node(&mut graph, 0, "left", "visit");
        let b = node(&mut graph, 1, "left", "visit");
        graph.add_dependency(crate::dependence::graph::DependenceKind::OnTree, a, b);
        graph.add_dependency(crate::dependence::graph::DependenceKind::OnTree, b, a);
        run_greedy_fusion(&mut graph, &config(5, 5));
        assert!(!graph.node(a).is_merged());
    }
}
