//! Turns a dependence graph into an executable plan: [`greedy`] tentatively
//! fuses same-child calls within the configured caps, then [`layered`]
//! topologically orders the (possibly now-merged) graph into serial and
//! parallel layers.

pub mod greedy;
pub mod layered;

pub use greedy::run_greedy_fusion;
pub use layered::parallel_schedule;
