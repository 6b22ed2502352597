//! Intensity-based filtering.

use crate::data::IntensityMatrix;
use crate::error::Result;
use log::info;

/// Remove proteins without any measured signal.
///
/// Keeps proteins whose summed intensity across all sample columns is
/// strictly positive. Missing values are skipped in the sum, so a protein
/// measured in only some samples is kept.
pub fn filter_zero_sum(matrix: &IntensityMatrix) -> Result<IntensityMatrix> {
    let row_sums = matrix.row_sums();

    let keep_indices: Vec<usize> = (0..matrix.n_proteins())
        .filter(|&row| row_sums[row] > 0.0)
        .collect();

    info!(
        "Zero-signal filter: kept {} of {} proteins",
        keep_indices.len(),
        matrix.n_proteins()
    );

    matrix.subset_proteins(&keep_indices)
}
