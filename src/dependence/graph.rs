//! The dependence graph: one node per statement participating in a fusion
//! candidate, edges recording why two statements can't be reordered past
//! each other, and merge groups recording which nodes the scheduler has
//! tentatively fused into one combined traversal.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::{IStr, MergeGroupId, NodeId, TraversalId};

/// Why an edge exists between two statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependenceKind {
    /// Both touch the same global variable.
    Global,
    /// Both touch the same local variable.
    Local,
    /// Both touch overlapping tree structure, in a way that forbids fusing
    /// the two calls that produced them.
    OnTree,
    /// Both touch overlapping tree structure, but only because they were
    /// fused together — permitted, since the order between them is fixed
    /// by construction rather than by a real conflict.
    OnTreeFusable,
    /// Sequencing imposed by control flow (e.g. a statement after an `if`
    /// that assigned a value the `if` reads).
    Control,
}

/// The set of dependence kinds recorded between one ordered pair of nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Edge {
    pub global: bool,
    pub local: bool,
    pub on_tree: bool,
    pub on_tree_fusable: bool,
    pub control: bool,
}

impl Edge {
    fn set(&mut self, kind: DependenceKind) {
        match kind {
            DependenceKind::Global => self.global = true,
            DependenceKind::Local => self.local = true,
            DependenceKind::OnTree => self.on_tree = true,
            DependenceKind::OnTreeFusable => self.on_tree_fusable = true,
            DependenceKind::Control => self.control = true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub traversal_id: TraversalId,
    /// Position of the source statement within its enclosing function body.
    pub stmt_index: usize,
    /// The field this node's statement calls through, if it's a call.
    pub called_child: Option<IStr>,
    /// The callee this node's statement invokes, if it's a call — used to
    /// cap how many instances of the same callee one merge group may hold.
    pub callee: Option<IStr>,
    pub is_call: bool,
    pub successors: FxHashMap<NodeId, Edge>,
    pub predecessors: FxHashMap<NodeId, Edge>,
    group: Option<MergeGroupId>,
}

impl Node {
    pub fn is_merged(&self) -> bool {
        self.group.is_some()
    }

    pub fn group(&self) -> Option<MergeGroupId> {
        self.group
    }

    /// A node with no incoming dependence edges at all: the scheduler's
    /// layering starts from these.
    pub fn is_root(&self) -> bool {
        self.predecessors.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MergeGroup {
    pub members: FxHashSet<NodeId>,
}

/// An arena of nodes plus an arena of merge groups, addressed by id rather
/// than pointer so the scheduler's rollback (`merge` followed by `unmerge`)
/// never needs unsafe aliasing.
#[derive(Debug, Default)]
pub struct DependenceGraph {
    nodes: Vec<Node>,
    groups: Vec<Option<MergeGroup>>,
}

impl DependenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_node(
        &mut self,
        traversal_id: TraversalId,
        stmt_index: usize,
        called_child: Option<IStr>,
        callee: Option<IStr>,
        is_call: bool,
    ) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node {
            id,
            traversal_id,
            stmt_index,
            called_child,
            callee,
            is_call,
            successors: FxHashMap::default(),
            predecessors: FxHashMap::default(),
            group: None,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn group(&self, id: MergeGroupId) -> &MergeGroup {
        self.groups[id.index()].as_ref().expect("group was freed")
    }

    pub fn add_dependency(&mut self, kind: DependenceKind, src: NodeId, dest: NodeId) {
        assert_ne!(src, dest);
        self.nodes[src.index()]
            .successors
            .entry(dest)
            .or_default()
            .set(kind);
        self.nodes[dest.index()]
            .predecessors
            .entry(src)
            .or_default()
            .set(kind);
    }

    /// Tentatively fuses two nodes into the same merge group.
    pub fn merge(&mut self, a: NodeId, b: NodeId) {
        match (self.nodes[a.index()].group, self.nodes[b.index()].group) {
            (Some(ga), Some(gb)) if ga != gb => {
                let moved: Vec<NodeId> = self.groups[gb.index()]
                    .take()
                    .expect("group was freed")
                    .members
                    .into_iter()
                    .collect();
                for node in &moved {
                    self.nodes[node.index()].group = Some(ga);
                }
                let group_a = self.groups[ga.index()].as_mut().expect("group was freed");
                group_a.members.extend(moved);
            }
            (Some(_), Some(_)) => {
                // Already in the same group: nothing to do.
            }
            (Some(ga), None) => {
                self.nodes[b.index()].group = Some(ga);
                self.groups[ga.index()]
                    .as_mut()
                    .expect("group was freed")
                    .members
                    .insert(b);
            }
            (None, Some(gb)) => {
                self.nodes[a.index()].group = Some(gb);
                self.groups[gb.index()]
                    .as_mut()
                    .expect("group was freed")
                    .members
                    .insert(a);
            }
            (None, None) => {
                let gid = MergeGroupId::new(self.groups.len());
                let mut members = FxHashSet::default();
                members.insert(a);
                members.insert(b);
                self.groups.push(Some(MergeGroup { members }));
                self.nodes[a.index()].group = Some(gid);
                self.nodes[b.index()].group = Some(gid);
            }
        }
    }

    /// Reverses a single node's participation in fusion — the scheduler's
    /// rollback when merging it turned out to create a cycle or an illegal
    /// fuse.
    pub fn unmerge(&mut self, node: NodeId) {
        let gid = self.nodes[node.index()].group.take().expect("node was not merged");
        let group = self.groups[gid.index()].as_mut().expect("group was freed");
        group.members.remove(&node);

        if group.members.len() == 1 {
            let remaining = *group.members.iter().next().unwrap();
            self.nodes[remaining.index()].group = None;
            self.groups[gid.index()] = None;
        }
    }

    /// Whether any merge group mixes calls through different fields — a
    /// fusion step is only legal when every participant visits the same
    /// child.
    pub fn has_wrong_fuse(&self) -> bool {
        let mut checked = FxHashSet::default();
        for node in &self.nodes {
            let Some(gid) = node.group else { continue };
            if !checked.insert(gid) {
                continue;
            }
            let group = self.groups[gid.index()].as_ref().expect("group was freed");
            let mut members = group.members.iter();
            let Some(first) = members.next() else { continue };
            let expected = &self.nodes[first.index()].called_child;
            for other in members {
                if &self.nodes[other.index()].called_child != expected {
                    return true;
                }
            }
        }
        false
    }

    /// Three-color DFS over the "quotient graph" where each merge group
    /// contracts to a single vertex (edges between members of the same
    /// group are internal and don't count toward a cycle).
    pub fn has_cycle(&self) -> bool {
        let mut color: FxHashMap<NodeId, u8> = FxHashMap::default();
        for node in &self.nodes {
            if color.get(&node.id).copied().unwrap_or(0) == 0 && self.has_cycle_from(node.id, &mut color) {
                return true;
            }
        }
        false
    }

    fn has_cycle_from(&self, id: NodeId, color: &mut FxHashMap<NodeId, u8>) -> bool {
        match color.get(&id).copied().unwrap_or(0) {
            2 => return false,
            1 => return true,
            _ => {}
        }

        match self.nodes[id.index()].group {
            None => {
                color.insert(id, 1);
                for succ in self.nodes[id.index()].successors.keys() {
                    if self.has_cycle_from(*succ, color) {
                        return true;
                    }
                }
                color.insert(id, 2);
                false
            }
            Some(gid) => {
                let members: Vec<NodeId> = self.groups[gid.index()]
                    .as_ref()
                    .expect("group was freed")
                    .members
                    .iter()
                    .copied()
                    .collect();
                for m in &members {
                    color.insert(*m, 1);
                }
                for m in &members {
                    for succ in self.nodes[m.index()].successors.keys() {
                        if members.contains(succ) {
                            continue;
                        }
                        if self.has_cycle_from(*succ, color) {
                            return true;
                        }
                    }
                }
                for m in &members {
                    color.insert(*m, 2);
                }
                false
            }
        }
    }

    pub fn has_illegal_merge(&self) -> bool {
        self.has_cycle() || self.has_wrong_fuse()
    }
}
