//! Deterministic naming for synthesized fused functions: a process-run
//! monotonic function-to-id map, shared across translation units by the
//! driver, modeled on `FunDeclToNameId`/`createName` in the traversal
//! synthesizer this module stands in for.

use indexmap::IndexMap;

use crate::base::FunctionId;

/// Assigns each distinct callee a small monotonic integer the first time
/// it's named, and builds `_fuse_F{i1}F{i2}...` names out of those
/// integers. Names are plain `String`s rather than interned `IStr`s: they
/// are driver-owned writeback text, not part of any one translation unit's
/// interned graph, so a registry shared across translation units doesn't
/// need to share an `Rc`-backed interner across threads. `ids` is an
/// [`IndexMap`] rather than a plain hash map so a finished run can be
/// replayed back in first-seen order for a stable writeback log, without a
/// separate side table.
#[derive(Debug, Default)]
pub struct NameRegistry {
    ids: IndexMap<FunctionId, u32>,
    next: u32,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self { ids: IndexMap::new(), next: 1 }
    }

    fn id_for(&mut self, function: FunctionId) -> u32 {
        *self.ids.entry(function).or_insert_with(|| {
            let id = self.next;
            self.next += 1;
            id
        })
    }

    /// The fused function's base name (before the `_parallel`/`_serial`
    /// suffix) for a set of participating callees, in candidate order.
    pub fn fused_base_name(&mut self, participating: &[FunctionId]) -> String {
        let mut out = String::from("_fuse_");
        for &f in participating {
            out.push('F');
            out.push_str(&self.id_for(f).to_string());
        }
        out
    }
}
