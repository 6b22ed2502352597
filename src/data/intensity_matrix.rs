//! Dense intensity matrix for RAP-MS protein quantification data.

use crate::error::{RapError, Result};
use nalgebra::DMatrix;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A dense matrix of protein intensities across samples.
///
/// Rows represent proteins (keyed by gene name), columns represent samples
/// named `feature condition_replicate` (feature prefix optional).
#[derive(Debug, Clone)]
pub struct IntensityMatrix {
    /// Dense matrix (proteins × samples)
    data: DMatrix<f64>,
    /// Gene names (row keys)
    gene_names: Vec<String>,
    /// Sample column names
    sample_ids: Vec<String>,
    /// Protein identifiers, present until contaminant filtering has run
    protein_ids: Option<Vec<String>>,
}

impl IntensityMatrix {
    /// Create a new IntensityMatrix from a dense matrix and identifiers.
    pub fn new(
        data: DMatrix<f64>,
        gene_names: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != gene_names.len() {
            return Err(RapError::DimensionMismatch {
                expected: nrows,
                actual: gene_names.len(),
            });
        }
        if ncols != sample_ids.len() {
            return Err(RapError::DimensionMismatch {
                expected: ncols,
                actual: sample_ids.len(),
            });
        }
        Ok(Self {
            data,
            gene_names,
            sample_ids,
            protein_ids: None,
        })
    }

    /// Attach protein identifiers (one per row).
    pub fn with_protein_ids(mut self, protein_ids: Vec<String>) -> Result<Self> {
        if protein_ids.len() != self.n_proteins() {
            return Err(RapError::DimensionMismatch {
                expected: self.n_proteins(),
                actual: protein_ids.len(),
            });
        }
        self.protein_ids = Some(protein_ids);
        Ok(self)
    }

    /// Drop the protein identifier column.
    pub fn without_protein_ids(mut self) -> Self {
        self.protein_ids = None;
        self
    }

    /// Replace the sample column names, keeping values untouched.
    pub fn with_sample_ids(mut self, sample_ids: Vec<String>) -> Result<Self> {
        if sample_ids.len() != self.n_samples() {
            return Err(RapError::DimensionMismatch {
                expected: self.n_samples(),
                actual: sample_ids.len(),
            });
        }
        self.sample_ids = sample_ids;
        Ok(self)
    }

    /// Load an intensity matrix from a TSV file.
    ///
    /// Expected format:
    /// - First row: header with sample IDs (first column is the gene name header)
    /// - Subsequent rows: gene name followed by intensities
    ///
    /// Empty fields are read as NaN.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_path(path)?;

        let header = reader.headers()?.clone();
        if header.len() < 2 {
            return Err(RapError::EmptyData(
                "TSV must have at least one sample".to_string(),
            ));
        }
        let sample_ids: Vec<String> = header.iter().skip(1).map(String::from).collect();
        let n_samples = sample_ids.len();

        let mut gene_names = Vec::new();
        let mut values = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            let record = record?;
            gene_names.push(record.get(0).unwrap_or_default().to_string());
            for (col_idx, sample_id) in sample_ids.iter().enumerate() {
                let field = record.get(col_idx + 1).unwrap_or_default();
                values.push(parse_intensity(field, row_idx, sample_id)?);
            }
        }

        if gene_names.is_empty() {
            return Err(RapError::EmptyData("No proteins in TSV".to_string()));
        }

        let data = DMatrix::from_row_slice(gene_names.len(), n_samples, &values);
        Self::new(data, gene_names, sample_ids)
    }

    /// Write the intensity matrix to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // Write header
        write!(writer, "gene_name")?;
        for sample_id in &self.sample_ids {
            write!(writer, "\t{}", sample_id)?;
        }
        writeln!(writer)?;

        // Write data rows
        for (row_idx, gene) in self.gene_names.iter().enumerate() {
            write!(writer, "{}", gene)?;
            for col_idx in 0..self.n_samples() {
                write!(writer, "\t{}", self.get(row_idx, col_idx))?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Get the value at (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[(row, col)]
    }

    /// Number of proteins (rows).
    #[inline]
    pub fn n_proteins(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples (columns).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// Gene names.
    #[inline]
    pub fn gene_names(&self) -> &[String] {
        &self.gene_names
    }

    /// Sample column names.
    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Protein identifiers, if still attached.
    #[inline]
    pub fn protein_ids(&self) -> Option<&[String]> {
        self.protein_ids.as_deref()
    }

    /// Get the underlying dense matrix.
    #[inline]
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Get a row (protein) as a vector.
    pub fn row(&self, row: usize) -> Vec<f64> {
        self.data.row(row).iter().copied().collect()
    }

    /// Compute row sums (total intensity per protein), skipping missing values.
    ///
    /// A row with no measured values sums to 0.
    pub fn row_sums(&self) -> Vec<f64> {
        self.data
            .row_iter()
            .map(|r| r.iter().filter(|v| !v.is_nan()).sum::<f64>())
            .collect()
    }

    /// Subset the matrix to include only specified proteins (by index).
    ///
    /// Rows keep the order given by `indices`.
    pub fn subset_proteins(&self, indices: &[usize]) -> Result<Self> {
        for &idx in indices {
            if idx >= self.n_proteins() {
                return Err(RapError::InvalidParameter(format!(
                    "Protein index {} out of bounds",
                    idx
                )));
            }
        }

        let data = self.data.select_rows(indices);
        let gene_names = indices.iter().map(|&i| self.gene_names[i].clone()).collect();
        let protein_ids = self
            .protein_ids
            .as_ref()
            .map(|ids| indices.iter().map(|&i| ids[i].clone()).collect());

        Ok(Self {
            data,
            gene_names,
            sample_ids: self.sample_ids.clone(),
            protein_ids,
        })
    }

    /// Split off a named column, returning the remaining matrix and the
    /// column's values. A matrix without that column is returned unchanged
    /// with `None`.
    pub fn take_column(&self, sample_id: &str) -> Result<(Self, Option<Vec<f64>>)> {
        let Some(col) = self.sample_ids.iter().position(|s| s == sample_id) else {
            return Ok((self.clone(), None));
        };
        let values = self.data.column(col).iter().copied().collect();
        let keep: Vec<usize> = (0..self.n_samples()).filter(|&c| c != col).collect();
        Ok((self.subset_samples(&keep)?, Some(values)))
    }

    /// Subset the matrix to include only specified samples (by index).
    pub fn subset_samples(&self, indices: &[usize]) -> Result<Self> {
        for &idx in indices {
            if idx >= self.n_samples() {
                return Err(RapError::InvalidParameter(format!(
                    "Sample index {} out of bounds",
                    idx
                )));
            }
        }

        Ok(Self {
            data: self.data.select_columns(indices),
            gene_names: self.gene_names.clone(),
            sample_ids: indices.iter().map(|&i| self.sample_ids[i].clone()).collect(),
            protein_ids: self.protein_ids.clone(),
        })
    }
}

/// Parse one intensity field; empty fields are missing values.
pub(crate) fn parse_intensity(field: &str, row: usize, column: &str) -> Result<f64> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed.parse().map_err(|_| RapError::InvalidValue {
        value: field.to_string(),
        row,
        column: column.to_string(),
    })
}
