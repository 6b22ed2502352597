//! Composition and execution of the full RAP-MS analysis.

mod runner;

pub use runner::{run_rap, ConditionCount, RapConfig, RapOutput, RunSummary};
