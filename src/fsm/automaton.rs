//! A small nondeterministic finite automaton over [`Label`]s, used to test
//! whether two access-path footprints can alias.
//!
//! Language emptiness reduces to plain reachability: since every arc in
//! these automata already encodes a legal single-symbol transition, a
//! final state is reachable from the start state if and only if some
//! string is accepted — the concrete symbols on the path never need to be
//! replayed to decide emptiness.

use rustc_hash::FxHashSet;

use crate::base::IStr;
use crate::fsm::symbol_table::{Label, SymbolTable};
use crate::ir::{AccessPath, PathRoot};

pub type StateId = usize;

#[derive(Debug, Clone)]
pub struct Fsm {
    start: StateId,
    finals: FxHashSet<StateId>,
    arcs: Vec<Vec<(Label, StateId)>>,
}

impl Fsm {
    pub fn new() -> Self {
        let mut fsm = Self {
            start: 0,
            finals: FxHashSet::default(),
            arcs: Vec::new(),
        };
        fsm.start = fsm.add_state();
        fsm
    }

    pub fn add_state(&mut self) -> StateId {
        self.arcs.push(Vec::new());
        self.arcs.len() - 1
    }

    pub fn set_start(&mut self, state: StateId) {
        self.start = state;
    }

    pub fn set_final(&mut self, state: StateId) {
        self.finals.insert(state);
    }

    pub fn add_arc(&mut self, src: StateId, label: Label, dest: StateId) {
        self.arcs[src].push((label, dest));
    }

    pub fn add_eps_transition(&mut self, src: StateId, dest: StateId) {
        self.add_arc(src, Label::EPS, dest);
    }

    pub fn add_traversed_node_transition(&mut self, src: StateId, dest: StateId) {
        self.add_arc(src, Label::ROOT, dest);
    }

    /// Every label the symbol table has allocated so far, as a self-loop-free
    /// parallel arc set from `src` to `dest` — one arc per known symbol.
    pub fn add_any_transition(&mut self, src: StateId, dest: StateId, table: &SymbolTable) {
        for label in table.known_labels() {
            self.add_arc(src, label, dest);
        }
    }

    /// Builds the chain automaton that accepts exactly this one access path
    /// — only the full path is final, nothing shorter or longer. This is
    /// the shape a write or replace always uses; see
    /// [`Fsm::from_access_path_for`] for the read/write asymmetry.
    pub fn from_access_path(path: &AccessPath, table: &mut SymbolTable) -> Self {
        Self::from_access_path_for(path, table, false)
    }

    /// Builds the chain automaton for one access path, shaped according to
    /// whether it's a read or a write/replace (spec's read/write
    /// asymmetry). A write or replace accepts only the exact, full path —
    /// the statement touches precisely that location. A read accepts every
    /// non-initial prefix of the path too, since a write anywhere along the
    /// way to the read's target also aliases it, plus, once the full path
    /// is reached, a trailing `Σ*` self-loop when the path doesn't
    /// terminate at a scalar (`!has_value_part`) — reading a
    /// pointer/reference also aliases a write to anything further beneath
    /// it.
    pub fn from_access_path_for(path: &AccessPath, table: &mut SymbolTable, is_read: bool) -> Self {
        let mut fsm = Fsm::new();
        let mut cur = fsm.start;

        match &path.root {
            PathRoot::TraversalRoot => {
                let next = fsm.add_state();
                fsm.add_traversed_node_transition(cur, next);
                cur = next;
            }
            PathRoot::Local(name) | PathRoot::Global(name) => {
                let label = table.label_for(name);
                let next = fsm.add_state();
                fsm.add_arc(cur, label, next);
                cur = next;
            }
        }
        if is_read {
            fsm.set_final(cur);
        }

        for step in &path.steps {
            let label = table.label_for(step);
            let next = fsm.add_state();
            fsm.add_arc(cur, label, next);
            cur = next;
            if is_read {
                fsm.set_final(cur);
            }
        }

        if is_read {
            if !path.has_value_part {
                fsm.add_any_transition(cur, cur, table);
            }
        } else {
            fsm.set_final(cur);
        }
        fsm
    }

    /// The automaton accepting any single-symbol string, zero or more times
    /// (i.e. every string over the currently known alphabet, including the
    /// empty string) — the closure of an "accept anything" transition.
    pub fn any_closure(table: &SymbolTable) -> Self {
        let mut fsm = Fsm::new();
        let state = fsm.start;
        fsm.set_final(state);
        for label in table.known_labels() {
            fsm.add_arc(state, label, state);
        }
        fsm
    }

    /// The union of two automata: a fresh start with epsilon transitions
    /// into each operand's start state.
    pub fn union(a: &Fsm, b: &Fsm) -> Self {
        let offset = a.arcs.len();
        let mut out = Fsm {
            start: 0,
            finals: FxHashSet::default(),
            arcs: Vec::with_capacity(a.arcs.len() + b.arcs.len() + 1),
        };
        out.arcs.extend(a.arcs.iter().cloned());
        out.arcs.extend(b.arcs.iter().map(|arcs| {
            arcs.iter()
                .map(|(l, d)| (*l, d + offset))
                .collect::<Vec<_>>()
        }));
        for f in &a.finals {
            out.finals.insert(*f);
        }
        for f in &b.finals {
            out.finals.insert(*f + offset);
        }
        let new_start = out.add_state();
        out.add_eps_transition(new_start, a.start);
        out.add_eps_transition(new_start, b.start + offset);
        out.start = new_start;
        out
    }

    /// A copy of `self` with every traversed-node (root) arc converted to an
    /// epsilon transition, so later intersection no longer requires the
    /// other operand to also consume a root step at that point.
    pub fn copy_root_removed(&self) -> Self {
        let mut out = self.clone();
        for arcs in &mut out.arcs {
            for (label, _) in arcs.iter_mut() {
                if *label == Label::ROOT {
                    *label = Label::EPS;
                }
            }
        }
        out
    }

    /// The product automaton: epsilon moves on either side are free, a
    /// labeled move requires both sides to make a matching move.
    pub fn intersect(a: &Fsm, b: &Fsm) -> Self {
        let mut out = Fsm {
            start: 0,
            finals: FxHashSet::default(),
            arcs: Vec::new(),
        };
        let mut index = rustc_hash::FxHashMap::default();
        let mut queue = std::collections::VecDeque::new();

        let start_pair = (a.start, b.start);
        let start_id = out.add_state();
        index.insert(start_pair, start_id);
        out.start = start_id;
        queue.push_back(start_pair);

        while let Some((qa, qb)) = queue.pop_front() {
            let cur = index[&(qa, qb)];
            if a.finals.contains(&qa) && b.finals.contains(&qb) {
                out.set_final(cur);
            }

            for (label, na) in &a.arcs[qa] {
                if *label == Label::EPS {
                    let key = (*na, qb);
                    let dest = *index.entry(key).or_insert_with(|| {
                        let id = out.add_state();
                        queue.push_back(key);
                        id
                    });
                    out.add_eps_transition(cur, dest);
                }
            }
            for (label, nb) in &b.arcs[qb] {
                if *label == Label::EPS {
                    let key = (qa, *nb);
                    let dest = *index.entry(key).or_insert_with(|| {
                        let id = out.add_state();
                        queue.push_back(key);
                        id
                    });
                    out.add_eps_transition(cur, dest);
                }
            }
            for (la, na) in &a.arcs[qa] {
                if *la == Label::EPS {
                    continue;
                }
                for (lb, nb) in &b.arcs[qb] {
                    if la == lb {
                        let key = (*na, *nb);
                        let dest = *index.entry(key).or_insert_with(|| {
                            let id = out.add_state();
                            queue.push_back(key);
                            id
                        });
                        out.add_arc(cur, *la, dest);
                    }
                }
            }
        }

        out
    }

    /// Whether no string is accepted: no final state is reachable from the
    /// start state.
    pub fn is_empty(&self) -> bool {
        let mut seen = FxHashSet::default();
        let mut stack = vec![self.start];
        seen.insert(self.start);
        while let Some(state) = stack.pop() {
            if self.finals.contains(&state) {
                return false;
            }
            for (_, dest) in &self.arcs[state] {
                if seen.insert(*dest) {
                    stack.push(*dest);
                }
            }
        }
        true
    }

    pub fn has_nonempty_intersection(a: &Fsm, b: &Fsm) -> bool {
        !Fsm::intersect(a, b).is_empty()
    }
}

impl Default for Fsm {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience used by higher layers that already know they're folding a
/// named local/global variable rather than a whole `AccessPath`.
pub fn label_of(table: &mut SymbolTable, name: &IStr) -> Label {
    table.label_for(name)
}
