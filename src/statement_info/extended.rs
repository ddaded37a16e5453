//! Extended footprints: a statement's own reads/writes/replaces, widened to
//! include everything its callees might touch — recursively, with virtual
//! dispatch spread across every override and with recursive cycles broken
//! by falling back to the universal footprint. Kept separate per root
//! classification (on-tree / local / global) so the dependence analyzer can
//! tell a same-child tree overlap apart from an aliasing local variable.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::FunctionId;
use crate::fsm::{Fsm, SymbolTable};
use crate::functions::{footprint_of, Footprint, FunctionAnalyzer};
use crate::ir::{AccessPath, CallStmt, PathKind, Stmt};
use crate::records::RecordAnalyzer;

/// Reads/writes/replaces lowered to automata for one root classification.
#[derive(Debug, Clone)]
pub struct Lane {
    pub reads: Fsm,
    pub writes: Fsm,
    pub replaces: Fsm,
}

impl Lane {
    fn empty() -> Self {
        Self {
            reads: Fsm::new(),
            writes: Fsm::new(),
            replaces: Fsm::new(),
        }
    }

    fn universal(table: &SymbolTable) -> Self {
        let any = Fsm::any_closure(table);
        Self {
            reads: any.clone(),
            writes: any.clone(),
            replaces: any,
        }
    }

    fn union(a: &Lane, b: &Lane) -> Self {
        Self {
            reads: Fsm::union(&a.reads, &b.reads),
            writes: Fsm::union(&a.writes, &b.writes),
            replaces: Fsm::union(&a.replaces, &b.replaces),
        }
    }

    /// Whether a read, write, or replace in `self` could alias a read,
    /// write, or replace in `other` (any conflicting pair implies the two
    /// statements can't be reordered).
    fn conflicts_with(&self, other: &Lane) -> bool {
        Fsm::has_nonempty_intersection(&self.writes, &other.reads)
            || Fsm::has_nonempty_intersection(&self.reads, &other.writes)
            || Fsm::has_nonempty_intersection(&self.writes, &other.writes)
            || Fsm::has_nonempty_intersection(&self.replaces, &other.reads)
            || Fsm::has_nonempty_intersection(&self.replaces, &other.writes)
            || Fsm::has_nonempty_intersection(&self.replaces, &other.replaces)
            || Fsm::has_nonempty_intersection(&self.reads, &other.replaces)
            || Fsm::has_nonempty_intersection(&self.writes, &other.replaces)
    }
}

/// Which lanes two statements' footprints conflict in. Whether an on-tree
/// conflict is classified `OnTree` or `OnTreeFusable` depends on whether the
/// two statements share a called child, which the footprint alone doesn't
/// carry — see [`crate::dependence::analyzer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Conflicts {
    pub on_tree: bool,
    pub local: bool,
    pub global: bool,
}

impl Conflicts {
    pub fn any(self) -> bool {
        self.on_tree || self.local || self.global
    }
}

/// A footprint split by root classification, ready for the emptiness
/// checks the dependence analyzer runs between statement pairs.
#[derive(Debug, Clone)]
pub struct ExtendedFootprint {
    pub on_tree: Lane,
    pub local: Lane,
    pub global: Lane,
}

impl ExtendedFootprint {
    fn empty() -> Self {
        Self {
            on_tree: Lane::empty(),
            local: Lane::empty(),
            global: Lane::empty(),
        }
    }

    fn from_footprint(fp: &Footprint, table: &mut SymbolTable) -> Self {
        let mut out = Self::empty();
        classify_into(&fp.reads, table, Component::Reads, &mut out);
        classify_into(&fp.writes, table, Component::Writes, &mut out);
        classify_into(&fp.replaces, table, Component::Replaces, &mut out);
        out
    }

    /// A footprint that may touch anything in every lane: used as a
    /// conservative stand-in when a call's effects can't be resolved
    /// (unbounded recursion, a virtual call to an unknown callee).
    fn universal(table: &SymbolTable) -> Self {
        Self {
            on_tree: Lane::universal(table),
            local: Lane::universal(table),
            global: Lane::universal(table),
        }
    }

    fn union(a: &ExtendedFootprint, b: &ExtendedFootprint) -> Self {
        Self {
            on_tree: Lane::union(&a.on_tree, &b.on_tree),
            local: Lane::union(&a.local, &b.local),
            global: Lane::union(&a.global, &b.global),
        }
    }

    pub fn conflicts_with(&self, other: &ExtendedFootprint) -> Conflicts {
        Conflicts {
            on_tree: self.on_tree.conflicts_with(&other.on_tree),
            local: self.local.conflicts_with(&other.local),
            global: self.global.conflicts_with(&other.global),
        }
    }
}

/// Which of a lane's three footprint components a path belongs in.
#[derive(Clone, Copy)]
enum Component {
    Reads,
    Writes,
    Replaces,
}

fn fold_into_lane(lane: &mut Lane, component: Component, fsm: &Fsm) {
    let slot = match component {
        Component::Reads => &mut lane.reads,
        Component::Writes => &mut lane.writes,
        Component::Replaces => &mut lane.replaces,
    };
    *slot = Fsm::union(slot, fsm);
}

/// Splits a list of access paths by root classification and folds each
/// into the matching lane's `component`. A strict-annotated path's effects
/// are opaque, so it's folded into every lane conservatively.
fn classify_into(
    paths: &[AccessPath],
    table: &mut SymbolTable,
    component: Component,
    out: &mut ExtendedFootprint,
) {
    let is_read = matches!(component, Component::Reads);
    for path in paths {
        let fsm = Fsm::from_access_path_for(path, table, is_read);
        match path.kind {
            PathKind::OnTree => fold_into_lane(&mut out.on_tree, component, &fsm),
            PathKind::Local => fold_into_lane(&mut out.local, component, &fsm),
            PathKind::Global => fold_into_lane(&mut out.global, component, &fsm),
            PathKind::StrictAnnotated => {
                fold_into_lane(&mut out.on_tree, component, &fsm);
                fold_into_lane(&mut out.local, component, &fsm);
                fold_into_lane(&mut out.global, component, &fsm);
            }
        }
    }
}

/// Memoizes each function's extended footprint across one planner run, and
/// breaks recursive cycles by substituting the universal footprint for any
/// function still being computed.
#[derive(Default)]
pub struct StatementInfoCache {
    memo: FxHashMap<FunctionId, ExtendedFootprint>,
    in_progress: FxHashSet<FunctionId>,
}

impl StatementInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The union of every statement's footprint in a function body,
    /// including the transitive effects of whatever it calls.
    pub fn function_footprint(
        &mut self,
        id: FunctionId,
        functions: &FunctionAnalyzer,
        records: &RecordAnalyzer,
        table: &mut SymbolTable,
    ) -> ExtendedFootprint {
        if let Some(fp) = self.memo.get(&id) {
            return fp.clone();
        }
        if !self.in_progress.insert(id) {
            // Already on the call stack: resolving the cycle exactly would
            // need a fixed-point iteration, so assume it may touch anything.
            return ExtendedFootprint::universal(table);
        }

        let analysis = functions.analysis(id);
        let mut fp = ExtendedFootprint::empty();
        for stmt_info in &analysis.stmts {
            fp = ExtendedFootprint::union(&fp, &self.statement_footprint(stmt_info, functions, records, table));
        }

        self.in_progress.remove(&id);
        self.memo.insert(id, fp.clone());
        fp
    }

    /// One top-level statement's footprint, widened with its call's
    /// transitive effects when it is a call.
    pub fn statement_footprint(
        &mut self,
        stmt_info: &crate::functions::StmtInfo,
        functions: &FunctionAnalyzer,
        records: &RecordAnalyzer,
        table: &mut SymbolTable,
    ) -> ExtendedFootprint {
        let own = ExtendedFootprint::from_footprint(&stmt_info.footprint, table);
        match stmt_info.as_call() {
            Some(call) => {
                let call = call.clone();
                let call_fp = self.call_footprint(&call, functions, records, table);
                ExtendedFootprint::union(&own, &call_fp)
            }
            None => own,
        }
    }

    /// The footprint of one call statement: its own argument reads, plus
    /// everything the callee (and, for virtual calls, every override) might
    /// do.
    pub fn call_footprint(
        &mut self,
        call: &CallStmt,
        functions: &FunctionAnalyzer,
        records: &RecordAnalyzer,
        table: &mut SymbolTable,
    ) -> ExtendedFootprint {
        let own = ExtendedFootprint::from_footprint(&footprint_of(&Stmt::Call(call.clone())), table);

        let Some(callee_id) = functions.find(&call.callee) else {
            return ExtendedFootprint::union(&own, &ExtendedFootprint::universal(table));
        };

        let callee_fp = self.function_footprint(callee_id, functions, records, table);
        let analysis = functions.analysis(callee_id);

        let dispatch_fp = match analysis.owner_record.clone() {
            Some(owner_name) if analysis.is_virtual_flag => {
                let mut combined = callee_fp;
                if let Some(owner_id) = records.find(&owner_name) {
                    for derived in records.derived_of(owner_id) {
                        let derived_name = records.record(*derived).name.clone();
                        if let Some(override_id) =
                            functions.find_method(&derived_name, &analysis.name)
                        {
                            let override_fp =
                                self.function_footprint(override_id, functions, records, table);
                            combined = ExtendedFootprint::union(&combined, &override_fp);
                        }
                    }
                }
                combined
            }
            _ => callee_fp,
        };

        ExtendedFootprint::union(&own, &dispatch_fp)
    }
}
