//! Lazily widens per-statement footprints with whatever their callees (and,
//! for virtual calls, every override) might touch.

pub mod extended;

pub use extended::{ExtendedFootprint, StatementInfoCache};
