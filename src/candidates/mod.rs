//! Discovery of fusion candidates: maximal runs of consecutive, compatible
//! calls within a function body.

pub mod compat;
pub mod finder;

pub use compat::are_compatible_calls;
pub use finder::{find_candidates, Candidate};
