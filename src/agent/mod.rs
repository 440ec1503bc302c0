pub mod instructions;
pub mod runtime;

pub use runtime::{run_turn, GENERIC_FAILURE};
