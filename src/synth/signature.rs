//! Parameter lists shared by a fused function's parallel and serial
//! variants.

use crate::ir::Param;

/// Which of the two fused functions a signature or body step belongs to.
/// `Parallel` forks into further parallel calls until `depth` reaches
/// `max_depth`, then tail-calls into `Serial`; `Serial` never forks again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Parallel,
    Serial,
}

impl Variant {
    pub fn suffix(self) -> &'static str {
        match self {
            Variant::Parallel => "_parallel",
            Variant::Serial => "_serial",
        }
    }
}

pub const NODE_PARAM: &str = "n";
pub const TRUNCATE_FLAGS_PARAM: &str = "truncate_flags";
pub const DEPTH_PARAM: &str = "depth";
pub const MAX_DEPTH_PARAM: &str = "max_depth";

/// The traversed node, `truncate_flags`, and — parallel only —
/// `depth`/`max_depth`.
pub fn build_params(variant: Variant) -> Vec<Param> {
    let mut params = vec![
        Param::new(NODE_PARAM, "Node*"),
        Param::new(TRUNCATE_FLAGS_PARAM, "unsigned int"),
    ];
    if variant == Variant::Parallel {
        params.push(Param::new(DEPTH_PARAM, "int"));
        params.push(Param::new(MAX_DEPTH_PARAM, "int"));
    }
    params
}
