//! Replicate averaging.

use crate::data::{ConditionTable, IntensityMatrix, SampleLayout};
use crate::error::Result;
use crate::test::P_VALUE_COLUMN;
use log::info;
use nalgebra::DMatrix;

/// Mean of the measured values; NaN when none were measured.
fn mean_present(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Collapse replicate columns into one mean per condition.
///
/// Conditions are derived from the sample column names (feature prefix
/// optional) and each mean is taken over exactly the `condition_1..condition_N`
/// columns, so the result does not depend on column order. Missing values are
/// skipped, so a condition's mean covers the replicates that were measured.
/// An `anova_p_value` column, as written by a screen, is ignored.
///
/// Output columns are bare condition names: the feature prefix and the
/// replicate suffix are both dropped (`LFQ intensity XIST_1` → `XIST`).
///
/// # Arguments
/// * `matrix` - Intensities with `[feature ]condition_replicate` columns
/// * `replicates` - Replicates per condition
///
/// # Returns
/// A ConditionTable of per-condition means, conditions sorted by name.
pub fn average_replicates(matrix: &IntensityMatrix, replicates: usize) -> Result<ConditionTable> {
    let (matrix, _) = matrix.take_column(P_VALUE_COLUMN)?;
    let layout = SampleLayout::infer(matrix.sample_ids(), replicates)?;
    let n = matrix.n_proteins();
    let k = layout.n_conditions();

    let mut values = DMatrix::zeros(n, k);
    for row in 0..n {
        let groups = layout.group_values(&matrix.row(row));
        for (col, group) in groups.iter().enumerate() {
            values[(row, col)] = mean_present(group);
        }
    }

    info!(
        "Averaged {} replicates across {} conditions for {} proteins",
        replicates, k, n
    );

    ConditionTable::new(
        "mean_intensity",
        matrix.gene_names().to_vec(),
        layout.conditions(),
        values,
    )
}
