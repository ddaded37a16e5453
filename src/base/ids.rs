//! Lightweight arena index types.
//!
//! Every analyzed entity (translation unit, function, record, dependence-graph
//! node, merge group) is addressed by a `u32` index into a `Vec`-backed arena
//! rather than by pointer, so the planner never needs unsafe self-referential
//! structures. See [`crate::dependence::graph`] for the arena itself.

/// Declares a `Copy` newtype wrapping a `u32` arena index, with the usual
/// `new`/`index` pair.
macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// Identifies one translation unit processed by the driver.
    TuId
);
arena_id!(
    /// Identifies a user-defined record type analyzed by [`crate::records`].
    RecordId
);
arena_id!(
    /// Identifies a traversal function analyzed by [`crate::functions`].
    FunctionId
);
arena_id!(
    /// Index of a participating callee within one fusion candidate.
    TraversalId
);
arena_id!(
    /// Identifies one node in a [`crate::dependence::DependenceGraph`].
    NodeId
);
arena_id!(
    /// Identifies one merge group in a [`crate::dependence::DependenceGraph`].
    MergeGroupId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_index() {
        let id = RecordId::new(7);
        assert_eq!(id.index(), 7);
    }

    #[test]
    fn distinct_ids_are_not_equal() {
        assert_ne!(FunctionId::new(0), FunctionId::new(1));
    }
}
