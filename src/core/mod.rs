pub mod config;
pub mod error;
pub mod text_utils;

pub use config::{FusionConfig, Heuristic};
pub use error::{CliError, InputError, PlannerError, SynthesisError};
