//! Traversal synthesizer: turns a scheduled dependence graph back into the
//! parallel and serial fused functions it describes, plus any per-derived
//! virtual-dispatch stubs a virtual callee requires.
//!
//! Modeled on `TraversalSynthesizer`: [`names`] replaces its
//! `FunDeclToNameId`/`createName` naming, [`signature`] its forward
//! declarations, [`body`] its `setCallPart` block emission, and [`stubs`]
//! its per-derived-type stub generation — rendered through
//! [`crate::ir::Printer`] instead of string concatenation.

pub mod body;
pub mod names;
pub mod signature;
pub mod stubs;

pub use body::emit_fused_body;
pub use names::NameRegistry;
pub use signature::{build_params, Variant};
pub use stubs::{has_virtual_callee, resolve_overrides_per_derived, stub_suffix};
