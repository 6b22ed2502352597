//! Data structures for RAP-MS analysis.

mod condition_table;
mod intensity_matrix;
mod layout;

pub use condition_table::ConditionTable;
pub use intensity_matrix::IntensityMatrix;
pub(crate) use intensity_matrix::parse_intensity;
pub use layout::{ConditionGroup, SampleLayout, SampleName};
