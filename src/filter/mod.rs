//! Filtering primitives for intensity matrices.

pub mod contaminant;
pub mod intensity;

pub use contaminant::{filter_contaminants, is_contaminant, Species, CONTAMINANT_TAG};
pub use intensity::filter_zero_sum;
