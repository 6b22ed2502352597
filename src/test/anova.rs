//! One-way ANOVA screening across RNA-bait conditions.

use crate::data::{IntensityMatrix, SampleLayout, SampleName};
use crate::error::{RapError, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header of the p-value column in a written screen.
pub const P_VALUE_COLUMN: &str = "anova_p_value";

/// Significance cutoff for screening.
///
/// In configuration files this is written either as a number (`0.05`) or as
/// the keyword `disabled`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdRepr", into = "ThresholdRepr")]
pub enum Threshold {
    /// Keep rows with p-value <= alpha.
    Alpha(f64),
    /// Keep every row; p-values are still attached.
    Disabled,
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::Alpha(0.05)
    }
}

impl Threshold {
    /// Whether a p-value passes. NaN never passes an active threshold.
    pub fn keeps(&self, p_value: f64) -> bool {
        match self {
            Threshold::Alpha(alpha) => p_value <= *alpha,
            Threshold::Disabled => true,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Alpha(alpha) => write!(f, "p <= {}", alpha),
            Threshold::Disabled => f.write_str("disabled"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ThresholdRepr {
    Alpha(f64),
    Keyword(String),
}

impl TryFrom<ThresholdRepr> for Threshold {
    type Error = String;

    fn try_from(repr: ThresholdRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            ThresholdRepr::Alpha(alpha) if alpha.is_finite() && alpha >= 0.0 => {
                Ok(Threshold::Alpha(alpha))
            }
            ThresholdRepr::Alpha(alpha) => Err(format!("invalid threshold {}", alpha)),
            ThresholdRepr::Keyword(k) if k.eq_ignore_ascii_case("disabled") => {
                Ok(Threshold::Disabled)
            }
            ThresholdRepr::Keyword(k) => Err(format!(
                "invalid threshold '{}' (expected a number or 'disabled')",
                k
            )),
        }
    }
}

impl From<Threshold> for ThresholdRepr {
    fn from(t: Threshold) -> Self {
        match t {
            Threshold::Alpha(alpha) => ThresholdRepr::Alpha(alpha),
            Threshold::Disabled => ThresholdRepr::Keyword("disabled".to_string()),
        }
    }
}

/// Result of a one-way ANOVA.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnovaResult {
    /// F statistic.
    pub f_statistic: f64,
    /// P-value (upper tail of the F distribution).
    pub p_value: f64,
    /// Between-group degrees of freedom.
    pub df_between: f64,
    /// Within-group degrees of freedom.
    pub df_within: f64,
}

/// One-way ANOVA across groups.
///
/// Zero within-group variance with distinct group means gives F = inf and
/// p = 0. When all values are identical (0/0) both F and p are NaN. A
/// within-group df of zero (one replicate per group) also gives NaN.
///
/// # Errors
/// Fewer than two groups or an empty group.
pub fn one_way_anova(groups: &[Vec<f64>]) -> Result<AnovaResult> {
    let k = groups.len();
    if k < 2 {
        return Err(RapError::InvalidParameter(format!(
            "ANOVA requires at least two groups, got {}",
            k
        )));
    }
    if groups.iter().any(|g| g.is_empty()) {
        return Err(RapError::InvalidParameter(
            "ANOVA groups must not be empty".to_string(),
        ));
    }

    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    let grand_mean = groups.iter().flatten().sum::<f64>() / n_total as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in groups {
        let n = group.len() as f64;
        let mean = group.iter().sum::<f64>() / n;
        ss_between += n * (mean - grand_mean).powi(2);
        ss_within += group.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
    }

    let df_between = (k - 1) as f64;
    let df_within = (n_total - k) as f64;

    let f_statistic = if df_within > 0.0 {
        (ss_between / df_between) / (ss_within / df_within)
    } else {
        f64::NAN
    };

    let p_value = if f_statistic.is_nan() {
        f64::NAN
    } else if f_statistic.is_infinite() {
        0.0
    } else {
        FisherSnedecor::new(df_between, df_within)
            .map_err(|e| RapError::Numerical(e.to_string()))?
            .sf(f_statistic)
    };

    Ok(AnovaResult {
        f_statistic,
        p_value,
        df_between,
        df_within,
    })
}

/// Proteins that passed ANOVA screening, with their p-values.
#[derive(Debug, Clone)]
pub struct AnovaScreen {
    /// Intensities keyed by gene name, columns named `condition_replicate`.
    pub matrix: IntensityMatrix,
    /// Condition grouping of the matrix columns.
    pub layout: SampleLayout,
    /// One-way ANOVA p-value per row of `matrix`.
    pub p_values: Vec<f64>,
    /// Threshold that was applied.
    pub threshold: Threshold,
}

impl AnovaScreen {
    /// Number of retained proteins.
    pub fn len(&self) -> usize {
        self.p_values.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.p_values.is_empty()
    }

    /// P-value of a gene (first matching row).
    pub fn p_value(&self, gene: &str) -> Option<f64> {
        let idx = self.matrix.gene_names().iter().position(|g| g == gene)?;
        self.p_values.get(idx).copied()
    }

    /// Read a screen written by [`AnovaScreen::to_tsv`].
    ///
    /// The p-value column is split off the intensities and the layout is
    /// inferred from the remaining columns. The cutoff used when the table was
    /// written is not stored, so the screen reports `Threshold::Disabled`.
    pub fn from_tsv<P: AsRef<Path>>(path: P, replicates: usize) -> Result<Self> {
        let table = IntensityMatrix::from_tsv(path)?;
        let (matrix, p_values) = table.take_column(P_VALUE_COLUMN)?;
        let p_values =
            p_values.ok_or_else(|| RapError::MissingColumn(P_VALUE_COLUMN.to_string()))?;
        let layout = SampleLayout::infer(matrix.sample_ids(), replicates)?;
        require_conditions(&layout)?;

        Ok(Self {
            matrix,
            layout,
            p_values,
            threshold: Threshold::Disabled,
        })
    }

    /// Write intensities plus the p-value column to TSV.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "gene_name")?;
        for sample_id in self.matrix.sample_ids() {
            write!(writer, "\t{}", sample_id)?;
        }
        writeln!(writer, "\t{}", P_VALUE_COLUMN)?;

        for (row, gene) in self.matrix.gene_names().iter().enumerate() {
            write!(writer, "{}", gene)?;
            for col in 0..self.matrix.n_samples() {
                write!(writer, "\t{}", self.matrix.get(row, col))?;
            }
            writeln!(writer, "\t{:.4e}", self.p_values[row])?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn require_conditions(layout: &SampleLayout) -> Result<()> {
    if layout.n_conditions() < 2 {
        return Err(RapError::InvalidParameter(format!(
            "ANOVA screening requires at least two conditions, found {}",
            layout.n_conditions()
        )));
    }
    Ok(())
}

/// Screen proteins with a one-way ANOVA across conditions.
///
/// Conditions are recovered from the sample column names (any feature prefix
/// is stripped), sorted, and each row's values are grouped by exact replicate
/// column name. Rows whose p-value is NaN are excluded by an active threshold.
///
/// # Arguments
/// * `matrix` - Imported intensities (e.g. from `import_rap`)
/// * `replicates` - Replicates per condition
/// * `threshold` - Cutoff on the ANOVA p-value, or `Threshold::Disabled`
pub fn screen_anova(
    matrix: &IntensityMatrix,
    replicates: usize,
    threshold: Threshold,
) -> Result<AnovaScreen> {
    let layout = SampleLayout::infer(matrix.sample_ids(), replicates)?;
    require_conditions(&layout)?;

    let short_names = matrix
        .sample_ids()
        .iter()
        .map(|s| s.parse::<SampleName>().map(|n| n.short()))
        .collect::<Result<Vec<_>>>()?;
    let renamed = matrix.clone().with_sample_ids(short_names)?;

    let mut p_values = Vec::with_capacity(renamed.n_proteins());
    for row in 0..renamed.n_proteins() {
        let groups = layout.group_values(&renamed.row(row));
        p_values.push(one_way_anova(&groups)?.p_value);
    }

    let n_nan = p_values.iter().filter(|p| p.is_nan()).count();
    if n_nan > 0 {
        warn!(
            "{} proteins have undefined ANOVA p-values (constant or missing intensities)",
            n_nan
        );
    }

    let keep_indices: Vec<usize> = (0..renamed.n_proteins())
        .filter(|&row| threshold.keeps(p_values[row]))
        .collect();

    info!(
        "ANOVA screen ({}): kept {} of {} proteins across {} conditions",
        threshold,
        keep_indices.len(),
        renamed.n_proteins(),
        layout.n_conditions()
    );

    Ok(AnovaScreen {
        matrix: renamed.subset_proteins(&keep_indices)?,
        layout,
        p_values: keep_indices.iter().map(|&i| p_values[i]).collect(),
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn create_test_matrix() -> IntensityMatrix {
        // 3 proteins × (3 conditions × 3 replicates), columns deliberately shuffled
        let sample_ids: Vec<String> = [
            "LFQ intensity U2_1",
            "LFQ intensity U1_1",
            "LFQ intensity U6_1",
            "LFQ intensity U2_2",
            "LFQ intensity U1_2",
            "LFQ intensity U6_2",
            "LFQ intensity U2_3",
            "LFQ intensity U1_3",
            "LFQ intensity U6_3",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        #[rustfmt::skip]
        let values = [
            // U2, U1, U6 per replicate
            1.0, 10.0, 1.0,   1.0, 10.0, 1.0,   1.0, 10.0, 1.0,  // U1 specific
            5.0, 5.0, 5.0,    5.0, 5.0, 5.0,    5.0, 5.0, 5.0,   // constant
            4.0, 1.0, 7.0,    5.0, 2.0, 8.0,    6.0, 3.0, 9.0,   // graded
        ];
        let data = DMatrix::from_row_slice(3, 9, &values);
        IntensityMatrix::new(
            data,
            vec!["Snrpa".into(), "Hnrnpc".into(), "Sf3b1".into()],
            sample_ids,
        )
        .unwrap()
    }

    #[test]
    fn test_anova_closed_form() {
        // df_between = 2, so p = (1 + 2F/df_within)^(-df_within/2)
        let groups = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]];
        let result = one_way_anova(&groups).unwrap();

        assert_relative_eq!(result.f_statistic, 27.0, epsilon = 1e-10);
        assert_relative_eq!(result.p_value, 0.001, epsilon = 1e-8);
        assert_eq!(result.df_between, 2.0);
        assert_eq!(result.df_within, 6.0);
    }

    #[test]
    fn test_anova_zero_variance_distinct_means() {
        let groups = vec![vec![10.0; 3], vec![1.0; 3], vec![1.0; 3]];
        let result = one_way_anova(&groups).unwrap();
        assert!(result.f_statistic.is_infinite());
        assert_eq!(result.p_value, 0.0);
    }

    #[test]
    fn test_anova_identical_values() {
        let groups = vec![vec![3.0; 3], vec![3.0; 3], vec![3.0; 3]];
        let result = one_way_anova(&groups).unwrap();
        assert!(result.p_value.is_nan());
    }

    #[test]
    fn test_anova_no_difference() {
        let groups = vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]];
        let result = one_way_anova(&groups).unwrap();
        assert_relative_eq!(result.p_value, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_anova_invalid_groups() {
        assert!(one_way_anova(&[vec![1.0, 2.0]]).is_err());
        assert!(one_way_anova(&[vec![1.0, 2.0], vec![]]).is_err());
    }

    #[test]
    fn test_screen_keeps_significant() {
        let screen = screen_anova(&create_test_matrix(), 3, Threshold::Alpha(0.05)).unwrap();

        assert_eq!(screen.layout.conditions(), vec!["U1", "U2", "U6"]);
        assert_eq!(screen.matrix.gene_names(), &["Snrpa", "Sf3b1"]);
        assert_eq!(screen.matrix.sample_ids()[0], "U2_1");
        assert_eq!(screen.p_value("Snrpa"), Some(0.0));
        assert_relative_eq!(screen.p_value("Sf3b1").unwrap(), 0.001, epsilon = 1e-8);
        assert_eq!(screen.p_value("Hnrnpc"), None);
    }

    #[test]
    fn test_screen_disabled_keeps_all() {
        let screen = screen_anova(&create_test_matrix(), 3, Threshold::Disabled).unwrap();
        assert_eq!(screen.len(), 3);
        assert!(screen.p_value("Hnrnpc").unwrap().is_nan());
    }

    #[test]
    fn test_screen_strict_threshold() {
        let screen = screen_anova(&create_test_matrix(), 3, Threshold::Alpha(1e-4)).unwrap();
        assert_eq!(screen.matrix.gene_names(), &["Snrpa"]);
    }

    #[test]
    fn test_screen_requires_two_conditions() {
        let data = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let mat = IntensityMatrix::new(data, vec!["A".into()], vec!["U1_1".into(), "U1_2".into()])
            .unwrap();
        assert!(matches!(
            screen_anova(&mat, 2, Threshold::default()),
            Err(RapError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_screen_tsv_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("screen.tsv");
        let screen = screen_anova(&create_test_matrix(), 3, Threshold::Alpha(0.05)).unwrap();
        screen.to_tsv(&path).unwrap();

        let loaded = AnovaScreen::from_tsv(&path, 3).unwrap();
        assert_eq!(loaded.matrix.gene_names(), screen.matrix.gene_names());
        assert_eq!(loaded.matrix.sample_ids(), screen.matrix.sample_ids());
        assert_eq!(loaded.matrix.data(), screen.matrix.data());
        assert_eq!(loaded.layout, screen.layout);
        assert_eq!(loaded.p_value("Snrpa"), Some(0.0));
        assert_relative_eq!(loaded.p_value("Sf3b1").unwrap(), 0.001, max_relative = 1e-3);
    }

    #[test]
    fn test_missing_value_gives_nan_p_value() {
        let data = DMatrix::from_row_slice(
            1,
            4,
            &[10.0, f64::NAN, 1.0, 2.0],
        );
        let mat = IntensityMatrix::new(
            data,
            vec!["Snrpa".into()],
            vec!["U1_1".into(), "U1_2".into(), "U2_1".into(), "U2_2".into()],
        )
        .unwrap();

        let all = screen_anova(&mat, 2, Threshold::Disabled).unwrap();
        assert_eq!(all.len(), 1);
        assert!(all.p_value("Snrpa").unwrap().is_nan());

        let screened = screen_anova(&mat, 2, Threshold::Alpha(0.05)).unwrap();
        assert!(screened.is_empty());
    }

    #[test]
    fn test_from_tsv_requires_p_values() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("plain.tsv");
        create_test_matrix().to_tsv(&path).unwrap();
        assert!(matches!(
            AnovaScreen::from_tsv(&path, 3),
            Err(RapError::MissingColumn(c)) if c == P_VALUE_COLUMN
        ));
    }

    #[test]
    fn test_threshold_serde() {
        let t: Threshold = serde_yaml::from_str("0.01").unwrap();
        assert_eq!(t, Threshold::Alpha(0.01));
        let t: Threshold = serde_yaml::from_str("disabled").unwrap();
        assert_eq!(t, Threshold::Disabled);
        assert!(serde_yaml::from_str::<Threshold>("sometimes").is_err());
        assert_eq!(serde_yaml::to_string(&Threshold::Disabled).unwrap().trim(), "disabled");
    }
}
