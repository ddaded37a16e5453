//! [`AccessPath`]: the data-model type the whole dependence analysis is
//! built on top of.

use crate::base::IStr;

/// Where an access path starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathRoot {
    /// The node currently being traversed (the implicit receiver / first
    /// parameter of a traversal function).
    TraversalRoot,
    /// A parameter or local variable.
    Local(IStr),
    /// A global (file- or program-scope) variable.
    Global(IStr),
}

/// Classification of an [`AccessPath`]'s starting root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    OnTree,
    Local,
    Global,
    /// Effects declared abstractly via an annotation id, for calls whose
    /// body isn't visible to the analyzer.
    StrictAnnotated,
}

/// An ordered sequence of field-selection steps from a root.
///
/// Invariant: an on-tree path's first step is the traversal root; a local
/// path's first step is a parameter/local.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessPath {
    pub kind: PathKind,
    pub root: PathRoot,
    /// Field names selected after `root`, in order.
    pub steps: Vec<IStr>,
    /// True when the path terminates at a scalar value rather than a
    /// pointer/reference to further structure.
    pub has_value_part: bool,
    /// Set only when `kind == StrictAnnotated`.
    pub annotation_id: Option<u32>,
}

impl AccessPath {
    pub fn on_tree(steps: Vec<IStr>, has_value_part: bool) -> Self {
        Self {
            kind: PathKind::OnTree,
            root: PathRoot::TraversalRoot,
            steps,
            has_value_part,
            annotation_id: None,
        }
    }

    pub fn local(name: IStr, steps: Vec<IStr>, has_value_part: bool) -> Self {
        Self {
            kind: PathKind::Local,
            root: PathRoot::Local(name),
            steps,
            has_value_part,
            annotation_id: None,
        }
    }

    pub fn global(name: IStr, steps: Vec<IStr>, has_value_part: bool) -> Self {
        Self {
            kind: PathKind::Global,
            root: PathRoot::Global(name),
            steps,
            has_value_part,
            annotation_id: None,
        }
    }

    /// A strict-annotated call's opaque footprint under the current subtree.
    pub fn strict(annotation_id: u32) -> Self {
        Self {
            kind: PathKind::StrictAnnotated,
            root: PathRoot::TraversalRoot,
            steps: Vec::new(),
            has_value_part: false,
            annotation_id: Some(annotation_id),
        }
    }

    /// The field a call descends through, if this path names a call's
    /// traversal target.
    pub fn called_child(&self) -> Option<&IStr> {
        self.steps.last()
    }

    /// The path with its last step removed, i.e. the receiver a call was
    /// made on. `None` if this path is already just the root.
    pub fn parent(&self) -> Option<AccessPath> {
        if self.steps.is_empty() {
            return None;
        }
        let mut steps = self.steps.clone();
        steps.pop();
        Some(Self {
            kind: self.kind,
            root: self.root.clone(),
            steps,
            has_value_part: false,
            annotation_id: None,
        })
    }

    /// Length of the path including the root, used by the candidate finder
    /// to compare two calls' traversal roots for structural equality.
    pub fn len(&self) -> usize {
        self.steps.len() + 1
    }
}
