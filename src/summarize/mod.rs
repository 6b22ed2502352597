//! Summaries of replicate measurements.

pub mod replicates;

pub use replicates::average_replicates;
